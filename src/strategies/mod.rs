//! Recovery strategies
//!
//! One strategy per error family plus a catch-all fallback. A strategy only
//! *describes* what the caller should do next (retry, refresh, redirect,
//! show guidance); it never performs the original operation itself.
//!
//! Strategies are held by the dispatcher in an ordered list, most specific
//! first. Custom strategies implement [`RecoveryStrategy`] and are registered
//! ahead of the fallback.

use crate::core_types::{BackoffStrategy, ProcessedError, RecoveryResult};
use crate::internals::retry::BackoffPolicy;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod auth;
pub mod fallback;
pub mod network;
pub mod validation;

pub use auth::{AuthErrorStrategy, NoSessionStore, SessionStore};
pub use fallback::FallbackStrategy;
pub use network::NetworkErrorStrategy;
pub use validation::ValidationErrorStrategy;

/// Retry ceiling and backoff for one strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPolicy {
    /// Attempts allowed per correlation key before forcing a fallback
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
}

impl StrategyPolicy {
    pub fn new(max_retries: u32, backoff: BackoffPolicy) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }
}

/// A named recovery policy
pub trait RecoveryStrategy: Send + Sync + Debug {
    /// Unique name, used for registration and logging
    fn name(&self) -> &str;

    /// Retry ceiling and backoff
    fn policy(&self) -> &StrategyPolicy;

    /// Whether this strategy claims the error
    fn can_handle(&self, error: &ProcessedError) -> bool;

    /// Describe how to recover from an error this strategy claimed
    fn execute(&self, error: &ProcessedError) -> RecoveryResult;

    /// The caller reported that a guarded operation succeeded
    fn on_operation_success(&self) {}

    fn max_retries(&self) -> u32 {
        self.policy().max_retries
    }

    fn backoff_strategy(&self) -> BackoffStrategy {
        self.policy().backoff.strategy
    }
}
