//! Error classification
//!
//! Maps any raised error to a [`ProcessedError`]. Signals are checked in
//! tiers, first match wins:
//!
//! 1. Platform codes, HTTP status and structured field-error payloads
//! 2. Case-insensitive message keywords
//! 3. Error name and caller component/action (database, configuration,
//!    business logic)
//! 4. Everything else is `SYSTEM`
//!
//! Codes are authoritative when present; message keywords are a fallback.

use crate::core_types::{ErrorContext, ErrorSeverity, ErrorType, ProcessedError, RawError};
use crate::internals::circuit_breaker::CircuitState;
use crate::logging::log_debug;

const NETWORK_CODES: &[&str] = &[
    "ECONNREFUSED",
    "ECONNRESET",
    "ECONNABORTED",
    "ETIMEDOUT",
    "ENOTFOUND",
    "EAI_AGAIN",
    "NETWORK_ERROR",
    "UNAVAILABLE",
    "DEADLINE-EXCEEDED",
];

const DATABASE_CODES: &[&str] = &["aborted", "data-loss", "already-exists"];

const RECOVERABLE_AUTH_CODES: &[&str] = &[
    "auth/network-request-failed",
    "auth/too-many-requests",
    "auth/user-token-expired",
    "auth/id-token-expired",
];

const AUTH_KEYWORDS: &[&str] = &[
    "token expired",
    "session expired",
    "unauthorized",
    "invalid credential",
];
const AUTHORIZATION_KEYWORDS: &[&str] = &["permission", "forbidden", "access denied"];
const VALIDATION_KEYWORDS: &[&str] = &["required", "invalid format", "length"];
const NETWORK_KEYWORDS: &[&str] = &["timeout", "timed out", "connection", "network", "dns"];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Stateless classifier; cheap to construct and share.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorClassifier;

impl ErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify assuming the network dependency is healthy.
    pub fn classify(&self, raw: RawError, context: &ErrorContext) -> ProcessedError {
        self.classify_with_circuit(raw, context, CircuitState::Closed)
    }

    /// Classify, escalating network severity while the network circuit is open.
    pub fn classify_with_circuit(
        &self,
        raw: RawError,
        context: &ErrorContext,
        network_circuit: CircuitState,
    ) -> ProcessedError {
        let error_type = self.error_type(&raw, context);
        let severity = self.severity(error_type, &raw, context, network_circuit);
        let processed = ProcessedError::new(error_type, severity, raw, context);

        log_debug!(
            error_id = %processed.id,
            error_type = %error_type,
            severity = %severity,
            context = %processed.context,
            code = processed.code().unwrap_or_default(),
            "Error classified"
        );

        processed
    }

    /// Determine the error type alone.
    pub fn error_type(&self, raw: &RawError, context: &ErrorContext) -> ErrorType {
        Self::type_from_signals(raw)
            .or_else(|| Self::type_from_message(&raw.message_text().to_lowercase()))
            .or_else(|| Self::type_from_origin(raw, context))
            .unwrap_or(ErrorType::System)
    }

    fn type_from_signals(raw: &RawError) -> Option<ErrorType> {
        if let Some(code) = raw.code.as_deref() {
            let lower = code.to_lowercase();
            if lower.starts_with("auth/") || lower == "unauthenticated" {
                return Some(ErrorType::Authentication);
            }
            if lower == "permission-denied" {
                return Some(ErrorType::Authorization);
            }
            if lower == "invalid-argument" {
                return Some(ErrorType::Validation);
            }
            if NETWORK_CODES.contains(&code.to_uppercase().as_str()) {
                return Some(ErrorType::Network);
            }
        }

        if !raw.validation_errors.is_empty() {
            return Some(ErrorType::Validation);
        }

        match raw.status? {
            401 => Some(ErrorType::Authentication),
            403 => Some(ErrorType::Authorization),
            400 | 422 => Some(ErrorType::Validation),
            408 | 502 | 503 | 504 => Some(ErrorType::Network),
            _ => None,
        }
    }

    fn type_from_message(message: &str) -> Option<ErrorType> {
        if message.is_empty() {
            return None;
        }
        if contains_any(message, AUTH_KEYWORDS) {
            Some(ErrorType::Authentication)
        } else if contains_any(message, AUTHORIZATION_KEYWORDS) {
            Some(ErrorType::Authorization)
        } else if contains_any(message, VALIDATION_KEYWORDS) {
            Some(ErrorType::Validation)
        } else if contains_any(message, NETWORK_KEYWORDS) {
            Some(ErrorType::Network)
        } else {
            None
        }
    }

    fn type_from_origin(raw: &RawError, context: &ErrorContext) -> Option<ErrorType> {
        let code = raw.code.as_deref().unwrap_or_default().to_lowercase();
        let name = raw.name.as_deref().unwrap_or_default().to_lowercase();
        if DATABASE_CODES.contains(&code.as_str())
            || contains_any(&name, &["firestore", "sequelize", "mongo"])
        {
            return Some(ErrorType::Database);
        }

        let component = context.component.as_deref().unwrap_or_default().to_lowercase();
        if component.contains("config") {
            return Some(ErrorType::Configuration);
        }

        let action = context.action.to_lowercase();
        if contains_any(&component, &["service", "business"])
            || contains_any(&action, &["process", "calculate"])
        {
            return Some(ErrorType::BusinessLogic);
        }

        None
    }

    fn severity(
        &self,
        error_type: ErrorType,
        raw: &RawError,
        context: &ErrorContext,
        network_circuit: CircuitState,
    ) -> ErrorSeverity {
        match error_type {
            ErrorType::Authentication if Self::is_recoverable_auth(raw) => ErrorSeverity::Low,
            ErrorType::Authentication => ErrorSeverity::Medium,
            ErrorType::Authorization => ErrorSeverity::High,
            ErrorType::Validation => ErrorSeverity::Low,
            ErrorType::Network if network_circuit == CircuitState::Open => ErrorSeverity::High,
            ErrorType::Network => ErrorSeverity::Medium,
            ErrorType::BusinessLogic => ErrorSeverity::Medium,
            ErrorType::Configuration => ErrorSeverity::High,
            ErrorType::Database | ErrorType::System if context.data_integrity => {
                ErrorSeverity::Critical
            }
            ErrorType::Database | ErrorType::System => ErrorSeverity::High,
        }
    }

    /// Expired sessions, rate limits and transport hiccups during sign-in.
    fn is_recoverable_auth(raw: &RawError) -> bool {
        if let Some(code) = raw.code.as_deref() {
            return RECOVERABLE_AUTH_CODES.contains(&code.to_lowercase().as_str());
        }
        let message = raw.message_text().to_lowercase();
        contains_any(
            &message,
            &["token expired", "session expired", "network", "connection"],
        )
    }
}
