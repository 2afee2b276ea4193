//! Network error recovery behind a circuit breaker
//!
//! The breaker is consulted before anything else. Timeouts and refused or
//! reset connections are retryable and count against the breaker; DNS
//! failures rarely fix themselves within a session and end in the fallback.

use super::{RecoveryStrategy, StrategyPolicy};
use crate::config::NetworkStrategyConfig;
use crate::core_types::outcome::duration_ms;
use crate::core_types::{
    ErrorType, NetworkFailureKind, ProcessedError, RecoveryData, RecoveryResult, UiAction,
};
use crate::internals::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitDecision, CircuitSnapshot, CircuitState,
};
use crate::internals::lock_recovering;
use crate::logging::{log_debug, log_warn};
use std::sync::Mutex;
use std::time::Duration;

const TIMEOUT_CODES: &[&str] = &["ECONNABORTED", "ETIMEDOUT", "DEADLINE-EXCEEDED"];
const CONNECTION_CODES: &[&str] = &["ECONNREFUSED", "ECONNRESET", "UNAVAILABLE"];
const DNS_CODES: &[&str] = &["ENOTFOUND", "EAI_AGAIN"];

#[derive(Debug)]
pub struct NetworkErrorStrategy {
    policy: StrategyPolicy,
    config: NetworkStrategyConfig,
    breaker: Mutex<CircuitBreaker>,
}

impl Default for NetworkErrorStrategy {
    fn default() -> Self {
        Self::new(NetworkStrategyConfig::default(), CircuitBreakerConfig::default())
    }
}

impl NetworkErrorStrategy {
    pub fn new(config: NetworkStrategyConfig, breaker: CircuitBreakerConfig) -> Self {
        Self {
            policy: config.policy(),
            config,
            breaker: Mutex::new(CircuitBreaker::new("network", breaker)),
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        lock_recovering(&self.breaker).current_state()
    }

    /// Remaining cool-down while the breaker is rejecting calls.
    pub fn open_circuit_wait(&self) -> Option<Duration> {
        lock_recovering(&self.breaker).remaining_cooldown()
    }

    pub fn circuit_snapshot(&self) -> CircuitSnapshot {
        lock_recovering(&self.breaker).snapshot()
    }

    /// Force the breaker back to closed, e.g. after the host saw connectivity return.
    pub fn reset_circuit(&self) {
        lock_recovering(&self.breaker).reset();
    }

    /// Which kind of network failure this is. Codes win over message text.
    pub fn failure_kind(error: &ProcessedError) -> NetworkFailureKind {
        if let Some(code) = error.code() {
            let code = code.to_uppercase();
            if TIMEOUT_CODES.contains(&code.as_str()) {
                return NetworkFailureKind::Timeout;
            }
            if CONNECTION_CODES.contains(&code.as_str()) {
                return NetworkFailureKind::Connection;
            }
            if DNS_CODES.contains(&code.as_str()) {
                return NetworkFailureKind::Dns;
            }
        }

        let message = error.message_lower();
        if message.contains("timeout") || message.contains("timed out") {
            NetworkFailureKind::Timeout
        } else if message.contains("connection") {
            NetworkFailureKind::Connection
        } else if message.contains("dns") {
            NetworkFailureKind::Dns
        } else {
            NetworkFailureKind::Generic
        }
    }

    /// Terminal result for a breaker that is still cooling down.
    pub fn circuit_open(retry_after: Duration) -> RecoveryResult {
        let mut data = RecoveryData::with_action(UiAction::ShowServiceUnavailable).user_message(
            "Serviço temporariamente indisponível. Tente novamente em alguns instantes.",
        );
        data.circuit_breaker_open = true;

        let mut result =
            RecoveryResult::terminal("Circuit breaker is open - service unavailable", data);
        result.retry_after_ms = Some(duration_ms(retry_after));
        result
    }

    fn retryable(&self, kind: NetworkFailureKind) -> RecoveryResult {
        let (message, delay_ms, user_message) = match kind {
            NetworkFailureKind::Timeout => (
                "Request timed out",
                self.config.timeout_retry_delay_ms,
                "Tempo limite excedido. Tentando novamente...",
            ),
            NetworkFailureKind::Connection => (
                "Connection failed",
                self.config.connection_retry_delay_ms,
                "Erro de conexão. Verificando disponibilidade do servidor...",
            ),
            NetworkFailureKind::Generic | NetworkFailureKind::Dns => (
                "Network error",
                self.config.generic_retry_delay_ms,
                "Erro de rede. Tentando reconectar...",
            ),
        };

        let mut data =
            RecoveryData::with_action(UiAction::RetryOperation).user_message(user_message);
        data.network_failure = Some(kind);
        if kind == NetworkFailureKind::Timeout {
            data.suggested_timeout_ms = Some(self.config.suggested_timeout_ms);
        }

        RecoveryResult::retryable(message, Duration::from_millis(delay_ms), data)
    }
}

impl RecoveryStrategy for NetworkErrorStrategy {
    fn name(&self) -> &str {
        "NetworkErrorStrategy"
    }

    fn policy(&self) -> &StrategyPolicy {
        &self.policy
    }

    fn can_handle(&self, error: &ProcessedError) -> bool {
        error.error_type == ErrorType::Network
    }

    fn execute(&self, error: &ProcessedError) -> RecoveryResult {
        let mut breaker = lock_recovering(&self.breaker);

        if let CircuitDecision::Rejected { retry_after } = breaker.try_acquire() {
            log_warn!(
                error_id = %error.id,
                failure_count = breaker.failure_count(),
                retry_after_ms = retry_after.as_millis(),
                "Network recovery short-circuited by open breaker"
            );
            return Self::circuit_open(retry_after);
        }

        let kind = Self::failure_kind(error);
        log_debug!(error_id = %error.id, failure_kind = ?kind, "Handling network failure");

        if kind == NetworkFailureKind::Dns {
            let mut data = RecoveryData::with_action(UiAction::CheckConnection)
                .user_message("Erro de resolução DNS. Verifique sua conexão com a internet.");
            data.network_failure = Some(kind);
            return RecoveryResult::terminal("DNS resolution failed", data);
        }

        breaker.record_failure();
        drop(breaker);
        self.retryable(kind)
    }

    fn on_operation_success(&self) {
        lock_recovering(&self.breaker).record_success();
    }
}
