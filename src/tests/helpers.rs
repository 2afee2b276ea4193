//! Test helper utilities shared by the unit test modules.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

#![allow(dead_code)]

use crate::core_types::{ErrorContext, ErrorSeverity, ErrorType, ProcessedError, RawError};
use crate::internals::circuit_breaker::CircuitBreakerConfig;

/// Build a processed error directly, bypassing classification.
pub fn processed(error_type: ErrorType, severity: ErrorSeverity, raw: RawError) -> ProcessedError {
    ProcessedError::new(error_type, severity, raw, &ErrorContext::new("test action"))
}

/// Build a processed error with a specific caller action.
pub fn processed_in(
    error_type: ErrorType,
    severity: ErrorSeverity,
    raw: RawError,
    action: &str,
) -> ProcessedError {
    ProcessedError::new(error_type, severity, raw, &ErrorContext::new(action))
}

pub fn auth_error(code: &str) -> ProcessedError {
    processed(
        ErrorType::Authentication,
        ErrorSeverity::Medium,
        RawError::from_code(code),
    )
}

pub fn auth_message(message: &str) -> ProcessedError {
    processed(
        ErrorType::Authentication,
        ErrorSeverity::Medium,
        RawError::new(message),
    )
}

pub fn network_error(code: &str) -> ProcessedError {
    processed(
        ErrorType::Network,
        ErrorSeverity::Medium,
        RawError::new("request failed").with_code(code),
    )
}

pub fn validation_message(message: &str) -> ProcessedError {
    processed(
        ErrorType::Validation,
        ErrorSeverity::Low,
        RawError::new(message),
    )
}

/// Breaker config with a short cool-down for paused-clock tests.
pub fn fast_breaker_config() -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        failure_threshold: 3,
        timeout_ms: 1_000,
        half_open_max_calls: 2,
    }
}
