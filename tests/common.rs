//! Test helper utilities for clinic-recovery integration tests
//!
//! Reusable fixtures shared by the integration test files.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use clinic_recovery::{
    CircuitBreakerConfig, ErrorContext, RawError, RecoveryConfig, RecoveryDispatcher,
    RecoveryOutcome,
};
use serde_json::Value;

/// Dispatcher with production defaults.
pub fn default_dispatcher() -> RecoveryDispatcher {
    RecoveryDispatcher::new()
}

/// Dispatcher whose breaker opens after `threshold` failures and cools down in `timeout_ms`.
pub fn dispatcher_with_breaker(threshold: u32, timeout_ms: u64) -> RecoveryDispatcher {
    let config = RecoveryConfig {
        circuit_breaker: CircuitBreakerConfig {
            failure_threshold: threshold,
            timeout_ms,
            half_open_max_calls: 3,
        },
        ..RecoveryConfig::default()
    };
    RecoveryDispatcher::from_config(config).expect("test breaker config should be valid")
}

/// Context for a named action with an explicit correlation key.
pub fn context(action: &str, correlation_key: &str) -> ErrorContext {
    ErrorContext::new(action).with_correlation_key(correlation_key)
}

/// Classify and recover a JSON-shaped error the way the UI layer would hand it over.
pub fn handle_json(
    dispatcher: &RecoveryDispatcher,
    payload: &Value,
    ctx: &ErrorContext,
) -> RecoveryOutcome {
    dispatcher.handle(RawError::from_json(payload), ctx)
}

/// Deterministic junk payloads for fuzz-style coverage checks.
pub fn junk_payloads(seed: u64, count: usize) -> Vec<Value> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let codes = [
        "auth/wrong-password",
        "auth/too-many-requests",
        "ECONNREFUSED",
        "ENOTFOUND",
        "permission-denied",
        "data-loss",
        "",
        "???",
    ];
    let words = ["timeout", "required", "forbidden", "expired token", "ok", "", "null"];

    (0..count)
        .map(|_| match rng.u8(0..6) {
            0 => Value::Null,
            1 => Value::from(rng.i64(..)),
            2 => Value::from(words[rng.usize(..words.len())]),
            3 => serde_json::json!({
                "code": codes[rng.usize(..codes.len())],
                "status": rng.u32(0..1_000),
            }),
            4 => serde_json::json!({
                "message": words[rng.usize(..words.len())],
                "validationErrors": [{"field": rng.u16(..).to_string()}, 7, null],
            }),
            _ => serde_json::json!({
                "message": rng.bool(),
                "code": rng.u32(..),
                "technicalDetails": "not an object",
            }),
        })
        .collect()
}
