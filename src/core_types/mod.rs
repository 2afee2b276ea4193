//! Core types shared across the recovery engine
//!
//! ## Organization
//! - `errors` - Error taxonomy (type, severity, backoff kind)
//! - `processed` - Inbound raw errors, caller context and the normalized `ProcessedError`
//! - `outcome` - `RecoveryResult` and the UI payload vocabulary

pub mod errors;
pub mod outcome;
pub mod processed;

// Re-export commonly used types
pub use errors::{BackoffStrategy, ErrorSeverity, ErrorType};
pub use outcome::{
    FallbackOption, NetworkFailureKind, RecoveryData, RecoveryResult, UiAction, ValidationKind,
};
pub use processed::{
    sanitize_message, ErrorContext, FieldError, ProcessedError, RawError, TechnicalDetails,
};
