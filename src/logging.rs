//! Logging utilities for clinic-recovery
//!
//! Re-exports tracing macros with log_* naming convention for consistency,
//! plus a helper for hosts that want a ready-made subscriber.

use crate::error::{EngineError, EngineResult};
use tracing_subscriber::EnvFilter;

// Re-export tracing macros with log_* naming
pub use tracing::{
    debug as log_debug,
    error as log_error,
    info as log_info,
    trace as log_trace,
    warn as log_warn,
};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter` (e.g. `"clinic_recovery=debug"`) when the variable is unset.
///
/// Fails if the filter does not parse or a global subscriber is already set.
pub fn init_tracing(default_filter: &str) -> EngineResult<()> {
    let filter = log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), default_filter)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| EngineError::configuration_error(format!("Tracing already initialized: {e}")))
}

/// Pick the filter: a parseable `rust_log` wins, otherwise `default_filter`.
pub(crate) fn log_filter(
    rust_log: Option<String>,
    default_filter: &str,
) -> EngineResult<EnvFilter> {
    if let Some(filter) = rust_log.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }

    EnvFilter::try_new(default_filter).map_err(|e| {
        EngineError::configuration_error(format!("Invalid log filter '{default_filter}': {e}"))
    })
}
