//! # clinic-recovery
//!
//! Error classification and recovery orchestration for the clinic client
//! application.
//!
//! ## Key Features
//!
//! - **Classification**: Any raised error becomes a typed, severity-rated [`ProcessedError`]
//! - **Strategies**: Authentication, network, validation and a catch-all fallback
//! - **Circuit Breaker**: Network recovery short-circuits while the backend is failing
//! - **Retry Ceilings**: Per-operation attempt counters with fixed or exponential backoff
//! - **UI Directives**: Results carry localized copy and an action for the UI layer
//!
//! ## Example
//!
//! ```rust
//! use clinic_recovery::{ErrorContext, RawError, RecoveryDispatcher, UiAction};
//!
//! let dispatcher = RecoveryDispatcher::new();
//! let context = ErrorContext::new("load patients").with_correlation_key("patients-page");
//!
//! let raw = RawError::new("Request timeout").with_code("ETIMEDOUT");
//! let outcome = dispatcher.handle(raw, &context);
//! assert!(!outcome.result.success);
//! assert_eq!(outcome.result.retry_after_ms, Some(5_000));
//! assert_eq!(outcome.result.data.action, Some(UiAction::RetryOperation));
//! ```

#![allow(clippy::missing_errors_doc)]

// Core types for error classification and recovery results
pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod classifier;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod internals;
pub mod strategies;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use classifier::ErrorClassifier;
pub use config::{
    AuthStrategyConfig, DispatcherConfig, FallbackStrategyConfig, NetworkStrategyConfig,
    RecoveryConfig, ValidationStrategyConfig,
};
pub use dispatcher::{DispatcherBuilder, RecoveryDispatcher, RecoveryOutcome, RecoveryStats};
pub use error::{EngineError, EngineResult};
pub use internals::{attempts, circuit_breaker, retry};
pub use logging::init_tracing;
pub use strategies::{
    AuthErrorStrategy, FallbackStrategy, NetworkErrorStrategy, NoSessionStore, RecoveryStrategy,
    SessionStore, StrategyPolicy, ValidationErrorStrategy,
};

pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitCallError, CircuitDecision, CircuitSnapshot,
    CircuitState,
};
pub use retry::{BackoffPolicy, RetryHandle, RetryScheduler};

// Re-export core types
pub use core_types::{
    sanitize_message,
    BackoffStrategy,
    ErrorContext,
    ErrorSeverity,
    ErrorType,
    FallbackOption,
    FieldError,
    NetworkFailureKind,
    ProcessedError,
    RawError,
    RecoveryData,
    RecoveryResult,
    TechnicalDetails,
    UiAction,
    ValidationKind,
};
