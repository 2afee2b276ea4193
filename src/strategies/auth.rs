//! Authentication error recovery
//!
//! Splits authentication failures into recoverable ones (expired session,
//! rate limiting, transport hiccups during sign-in) and unrecoverable ones
//! (bad credentials, disabled account) that need the user.

use super::{RecoveryStrategy, StrategyPolicy};
use crate::config::AuthStrategyConfig;
use crate::core_types::{ErrorType, ProcessedError, RecoveryData, RecoveryResult, UiAction};
use crate::logging::log_debug;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Read-only view of the client's session, owned by the auth layer.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore: Send + Sync {
    /// Whether a refresh token is available for a silent refresh
    fn has_refresh_token(&self) -> bool;
}

/// Session store for hosts without refresh tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSessionStore;

impl SessionStore for NoSessionStore {
    fn has_refresh_token(&self) -> bool {
        false
    }
}

pub struct AuthErrorStrategy {
    policy: StrategyPolicy,
    config: AuthStrategyConfig,
    session: Arc<dyn SessionStore>,
}

impl fmt::Debug for AuthErrorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthErrorStrategy")
            .field("policy", &self.policy)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for AuthErrorStrategy {
    fn default() -> Self {
        Self::new(AuthStrategyConfig::default())
    }
}

impl AuthErrorStrategy {
    pub fn new(config: AuthStrategyConfig) -> Self {
        Self {
            policy: config.policy(),
            config,
            session: Arc::new(NoSessionStore),
        }
    }

    pub fn with_session_store(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = session;
        self
    }

    fn handle_sdk_code(&self, code: &str) -> RecoveryResult {
        match code {
            "auth/network-request-failed" => self.network_during_auth(Duration::from_millis(
                self.config.sdk_network_retry_delay_ms,
            )),
            "auth/too-many-requests" => self.rate_limited(),
            "auth/user-token-expired" | "auth/id-token-expired" => self.token_expired(),
            "auth/invalid-credential" | "auth/wrong-password" | "auth/user-not-found" => {
                self.invalid_credentials()
            }
            "auth/user-disabled" => RecoveryResult::terminal(
                "User account is disabled",
                RecoveryData::with_action(UiAction::ShowLoginForm).user_message(
                    "Sua conta está desativada. Entre em contato com o administrador.",
                ),
            ),
            other => RecoveryResult::terminal(
                format!("Unhandled auth provider error: {other}"),
                RecoveryData::with_action(UiAction::ShowLoginForm),
            ),
        }
    }

    fn token_expired(&self) -> RecoveryResult {
        if self.session.has_refresh_token() {
            return RecoveryResult {
                success: false,
                message: "Token expired - silent refresh required".to_string(),
                retry_after_ms: None,
                fallback_required: false,
                data: RecoveryData::with_action(UiAction::RefreshToken),
            };
        }

        RecoveryResult::terminal(
            "Session expired - login required",
            RecoveryData::with_action(UiAction::RedirectToLogin)
                .user_message("Sua sessão expirou. Faça login novamente."),
        )
    }

    fn invalid_credentials(&self) -> RecoveryResult {
        RecoveryResult::terminal(
            "Invalid credentials - user intervention required",
            RecoveryData::with_action(UiAction::ShowLoginForm)
                .user_message("Credenciais inválidas. Verifique seu usuário e senha."),
        )
    }

    // Provider-imposed limit: fixed wait, no local backoff.
    fn rate_limited(&self) -> RecoveryResult {
        RecoveryResult::retryable(
            "Too many authentication attempts",
            Duration::from_millis(self.config.rate_limit_delay_ms),
            RecoveryData::with_action(UiAction::RetryAuth)
                .user_message("Muitas tentativas de login. Aguarde um minuto e tente novamente."),
        )
    }

    fn network_during_auth(&self, delay: Duration) -> RecoveryResult {
        RecoveryResult::retryable(
            "Network error during authentication",
            delay,
            RecoveryData::with_action(UiAction::RetryAuth)
                .user_message("Erro de conexão durante autenticação. Tentando novamente..."),
        )
    }
}

impl RecoveryStrategy for AuthErrorStrategy {
    fn name(&self) -> &str {
        "AuthErrorStrategy"
    }

    fn policy(&self) -> &StrategyPolicy {
        &self.policy
    }

    fn can_handle(&self, error: &ProcessedError) -> bool {
        error.error_type == ErrorType::Authentication
    }

    fn execute(&self, error: &ProcessedError) -> RecoveryResult {
        if let Some(code) = error.code() {
            let code = code.to_lowercase();
            if code.starts_with("auth/") {
                log_debug!(error_id = %error.id, code = %code, "Handling auth provider error code");
                return self.handle_sdk_code(&code);
            }
        }

        let message = error.message_lower();
        if message.contains("token expired") || message.contains("session expired") {
            self.token_expired()
        } else if message.contains("invalid credential") || message.contains("unauthorized") {
            self.invalid_credentials()
        } else if message.contains("too many requests") || message.contains("rate limit") {
            self.rate_limited()
        } else if message.contains("network") || message.contains("connection") {
            self.network_during_auth(Duration::from_millis(self.config.network_retry_delay_ms))
        } else {
            RecoveryResult::terminal(
                "Authentication error requires manual intervention",
                RecoveryData::with_action(UiAction::ShowLoginForm),
            )
        }
    }
}
