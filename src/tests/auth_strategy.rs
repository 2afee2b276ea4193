// Unit Tests for AuthErrorStrategy
//
// UNIT UNDER TEST: AuthErrorStrategy
//
// BUSINESS RESPONSIBILITY:
//   - Claims authentication errors only
//   - Asks for a silent token refresh when a refresh token exists
//   - Sends the user back to login for bad credentials or dead sessions
//   - Waits out identity-provider rate limits with a fixed long delay
//   - Retries transport failures during sign-in
//
// TEST COVERAGE:
//   - Auth provider code table
//   - Message-based fallback rules
//   - Session store interaction via mock
//   - Retry policy exposed to the dispatcher

use crate::core_types::{BackoffStrategy, ErrorSeverity, ErrorType, RawError, UiAction};
use crate::strategies::auth::{AuthErrorStrategy, MockSessionStore};
use crate::strategies::RecoveryStrategy;
use crate::tests::helpers::{auth_error, auth_message, processed};
use std::sync::Arc;
use std::time::Duration;

fn strategy_with_refresh_token(available: bool) -> AuthErrorStrategy {
    let mut session = MockSessionStore::new();
    session
        .expect_has_refresh_token()
        .times(1)
        .return_const(available);
    AuthErrorStrategy::default().with_session_store(Arc::new(session))
}

#[cfg(test)]
mod auth_strategy_policy_tests {
    use super::*;

    #[test]
    fn test_policy_matches_production_values() {
        let strategy = AuthErrorStrategy::default();

        assert_eq!(strategy.name(), "AuthErrorStrategy");
        assert_eq!(strategy.max_retries(), 2);
        assert_eq!(strategy.backoff_strategy(), BackoffStrategy::Exponential);
    }

    #[test]
    fn test_claims_only_authentication_errors() {
        let strategy = AuthErrorStrategy::default();

        assert!(strategy.can_handle(&auth_error("auth/wrong-password")));
        assert!(!strategy.can_handle(&processed(
            ErrorType::Authorization,
            ErrorSeverity::High,
            RawError::from_code("permission-denied"),
        )));
    }
}

#[cfg(test)]
mod auth_strategy_code_tests {
    use super::*;

    #[test]
    fn test_bad_credentials_are_terminal_without_retry() {
        // Arrange
        let strategy = AuthErrorStrategy::default();

        // Act & Assert
        for code in ["auth/wrong-password", "auth/invalid-credential", "auth/user-not-found"] {
            let result = strategy.execute(&auth_error(code));
            assert!(!result.success);
            assert!(result.fallback_required, "{code} should need the user");
            assert_eq!(result.retry_after_ms, None, "{code} must not schedule a retry");
            assert_eq!(result.data.action, Some(UiAction::ShowLoginForm));
            assert_eq!(
                result.data.user_message.as_deref(),
                Some("Credenciais inválidas. Verifique seu usuário e senha.")
            );
        }
    }

    #[test]
    fn test_disabled_account_is_terminal() {
        let result = AuthErrorStrategy::default().execute(&auth_error("auth/user-disabled"));

        assert!(result.fallback_required);
        assert_eq!(result.message, "User account is disabled");
        assert_eq!(result.retry_after_ms, None);
    }

    #[test]
    fn test_rate_limit_uses_fixed_long_delay() {
        // Test verifies provider rate limits are waited out, not backed off locally

        // Act
        let result = AuthErrorStrategy::default().execute(&auth_error("auth/too-many-requests"));

        // Assert
        assert!(result.allows_retry());
        assert_eq!(result.retry_after(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_network_failure_during_sign_in_is_retryable() {
        let result =
            AuthErrorStrategy::default().execute(&auth_error("auth/network-request-failed"));

        assert!(result.allows_retry());
        assert_eq!(result.retry_after_ms, Some(2_000));
        assert_eq!(result.data.action, Some(UiAction::RetryAuth));
    }

    #[test]
    fn test_unknown_provider_code_is_terminal() {
        let result = AuthErrorStrategy::default().execute(&auth_error("auth/quota-exceeded"));

        assert!(result.fallback_required);
        assert!(result.message.contains("auth/quota-exceeded"));
    }
}

#[cfg(test)]
mod auth_strategy_session_tests {
    use super::*;

    #[test]
    fn test_expired_token_with_refresh_token_requests_silent_refresh() {
        // Arrange
        let strategy = strategy_with_refresh_token(true);

        // Act
        let result = strategy.execute(&auth_error("auth/id-token-expired"));

        // Assert
        assert!(!result.success);
        assert!(!result.fallback_required, "A silent refresh is still possible");
        assert_eq!(result.retry_after_ms, None);
        assert_eq!(result.data.action, Some(UiAction::RefreshToken));
    }

    #[test]
    fn test_expired_session_without_refresh_token_redirects_to_login() {
        // Arrange
        let strategy = strategy_with_refresh_token(false);

        // Act
        let result = strategy.execute(&auth_message("Session expired, please sign in"));

        // Assert
        assert!(result.fallback_required);
        assert_eq!(result.message, "Session expired - login required");
        assert_eq!(result.data.action, Some(UiAction::RedirectToLogin));
    }

    #[test]
    fn test_default_store_has_no_refresh_token() {
        let result = AuthErrorStrategy::default().execute(&auth_message("Token expired"));

        assert_eq!(result.data.action, Some(UiAction::RedirectToLogin));
    }
}

#[cfg(test)]
mod auth_strategy_message_tests {
    use super::*;

    #[test]
    fn test_message_rules_without_code() {
        // Arrange
        let strategy = AuthErrorStrategy::default();

        // Act
        let unauthorized = strategy.execute(&auth_message("Unauthorized"));
        let rate_limited = strategy.execute(&auth_message("Rate limit reached"));
        let network = strategy.execute(&auth_message("Network unreachable while signing in"));
        let other = strategy.execute(&auth_message("Identity provider said no"));

        // Assert
        assert_eq!(unauthorized.data.action, Some(UiAction::ShowLoginForm));
        assert!(unauthorized.fallback_required);
        assert_eq!(rate_limited.retry_after_ms, Some(60_000));
        assert_eq!(network.retry_after_ms, Some(3_000));
        assert_eq!(
            network.data.user_message.as_deref(),
            Some("Erro de conexão durante autenticação. Tentando novamente...")
        );
        assert!(other.fallback_required);
        assert_eq!(other.message, "Authentication error requires manual intervention");
    }
}
