//! Error types for the recovery engine itself.
//!
//! The engine's job is to absorb application errors, so [`recover`] never
//! fails. The errors here cover the few places where the *engine* can be
//! misused: invalid configuration, duplicate strategy registration and retry
//! scheduling.
//!
//! [`recover`]: crate::dispatcher::RecoveryDispatcher::recover
//!
//! # Result Type
//!
//! Use [`EngineResult<T>`] as a convenient alias for `Result<T, EngineError>`:
//!
//! ```rust
//! use clinic_recovery::EngineResult;
//!
//! fn my_function() -> EngineResult<u32> {
//!     Ok(5)
//! }
//! ```

use crate::logging::{log_error, log_warn};
use thiserror::Error;

/// Convenient result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors raised by the recovery engine.
///
/// Use the constructor methods, which log the error at creation:
///
/// ```rust
/// use clinic_recovery::EngineError;
///
/// let err = EngineError::configuration_error("failure_threshold must be positive");
/// let err = EngineError::retry_in_flight("save-product-42");
/// ```
#[derive(Error, Debug)]
pub enum EngineError {
    /// Recovery configuration is invalid.
    #[error("Recovery configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A strategy with the same name is already registered.
    #[error("Recovery strategy already registered: {name}")]
    DuplicateStrategy {
        /// The strategy name that was registered twice.
        name: String,
    },

    /// A retry for this correlation key is still pending.
    ///
    /// Retries for one logical operation are strictly sequential.
    #[error("Retry already scheduled for correlation key {correlation_key}")]
    RetryInFlight {
        /// The correlation key with a pending retry.
        correlation_key: String,
    },

    /// The caller cancelled the scheduled retry before it completed.
    #[error("Scheduled retry for {correlation_key} was cancelled")]
    RetryCancelled {
        /// The correlation key whose retry was cancelled.
        correlation_key: String,
    },

    /// The retried operation panicked inside the retry task.
    #[error("Scheduled retry for {correlation_key} failed: {message}")]
    RetryFailed {
        /// The correlation key whose retry failed.
        correlation_key: String,
        /// Details from the task failure.
        message: String,
    },
}

impl EngineError {
    /// Whether the caller can simply try the same call again later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RetryInFlight { .. })
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Recovery configuration validation failed"
        );
        Self::Configuration { message }
    }

    pub fn duplicate_strategy(name: impl Into<String>) -> Self {
        let name = name.into();
        log_warn!(
            error_type = "duplicate_strategy",
            strategy = %name,
            "Recovery strategy already registered"
        );
        Self::DuplicateStrategy { name }
    }

    pub fn retry_in_flight(correlation_key: impl Into<String>) -> Self {
        let correlation_key = correlation_key.into();
        log_warn!(
            error_type = "retry_in_flight",
            correlation_key = %correlation_key,
            "Refusing to schedule overlapping retry"
        );
        Self::RetryInFlight { correlation_key }
    }

    pub fn retry_cancelled(correlation_key: impl Into<String>) -> Self {
        let correlation_key = correlation_key.into();
        log_warn!(
            error_type = "retry_cancelled",
            correlation_key = %correlation_key,
            "Scheduled retry cancelled by caller"
        );
        Self::RetryCancelled { correlation_key }
    }

    pub fn retry_failed(correlation_key: impl Into<String>, message: impl Into<String>) -> Self {
        let correlation_key = correlation_key.into();
        let message = message.into();
        log_error!(
            error_type = "retry_failed",
            correlation_key = %correlation_key,
            message = %message,
            "Scheduled retry task failed"
        );
        Self::RetryFailed {
            correlation_key,
            message,
        }
    }
}
