//! Backoff computation and retry scheduling
//!
//! This module provides the timing half of recovery:
//! - Backoff policies: fixed, or exponential `base * 2^(attempt-1)` with a cap
//! - Optional jitter (up to 10%) to spread retries of many clients
//! - A scheduler that fires the caller's retry after a delay and hands back a
//!   cancellable handle, refusing overlapping retries for one correlation key

use super::lock_recovering;
use crate::core_types::BackoffStrategy;
use crate::error::{EngineError, EngineResult};
use crate::logging::log_debug;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Backoff policy for caller-visible retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    pub strategy: BackoffStrategy,
    /// Delay for the first retry, in milliseconds
    pub base_delay_ms: u64,
    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,
    /// Add up to 10% random jitter before capping
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::exponential(2_000, 30_000)
    }
}

impl BackoffPolicy {
    pub fn fixed(delay_ms: u64) -> Self {
        Self {
            strategy: BackoffStrategy::Fixed,
            base_delay_ms: delay_ms,
            max_delay_ms: delay_ms,
            jitter: false,
        }
    }

    pub fn exponential(base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            base_delay_ms,
            max_delay_ms,
            jitter: false,
        }
    }

    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Calculate the delay before retry number `attempt` (1-based; 0 is treated as 1)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let raw_ms = match self.strategy {
            BackoffStrategy::Fixed => self.base_delay_ms,
            BackoffStrategy::Exponential => 2u64
                .checked_pow(exponent)
                .map_or(u64::MAX, |factor| self.base_delay_ms.saturating_mul(factor)),
        };

        // Cap applies after jitter
        let jittered_ms = if self.jitter {
            let jitter = (raw_ms as f64 * fastrand::f64() * 0.1) as u64;
            raw_ms.saturating_add(jitter)
        } else {
            raw_ms
        };

        Duration::from_millis(jittered_ms.min(self.max_delay_ms))
    }
}

/// Removes a correlation key from the pending set when the retry task ends,
/// whether it completed, panicked or was aborted.
struct PendingGuard {
    pending: Arc<Mutex<HashSet<String>>>,
    correlation_key: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock_recovering(&self.pending).remove(&self.correlation_key);
    }
}

/// Fires retries of the caller's original operation after a delay
#[derive(Debug, Clone, Default)]
pub struct RetryScheduler {
    pending: Arc<Mutex<HashSet<String>>>,
}

impl RetryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a retry for `correlation_key` is waiting or running
    pub fn is_pending(&self, correlation_key: &str) -> bool {
        lock_recovering(&self.pending).contains(correlation_key)
    }

    pub fn pending_count(&self) -> usize {
        lock_recovering(&self.pending).len()
    }

    /// Run `operation` after `delay` on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RetryInFlight`] if a retry for this key is still pending
    /// - [`EngineError::RetryFailed`] if called outside a Tokio runtime
    pub fn schedule<F, Fut, T>(
        &self,
        correlation_key: &str,
        delay: Duration,
        operation: F,
    ) -> EngineResult<RetryHandle<T>>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            EngineError::retry_failed(correlation_key, format!("no async runtime available: {e}"))
        })?;

        if !lock_recovering(&self.pending).insert(correlation_key.to_string()) {
            return Err(EngineError::retry_in_flight(correlation_key));
        }

        let guard = PendingGuard {
            pending: Arc::clone(&self.pending),
            correlation_key: correlation_key.to_string(),
        };

        log_debug!(
            correlation_key = %correlation_key,
            delay_ms = delay.as_millis(),
            "Retry scheduled"
        );

        let task = runtime.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(delay).await;
            operation().await
        });

        Ok(RetryHandle {
            correlation_key: correlation_key.to_string(),
            delay,
            task,
        })
    }
}

/// Caller-owned handle to a scheduled retry
#[derive(Debug)]
pub struct RetryHandle<T> {
    correlation_key: String,
    delay: Duration,
    task: JoinHandle<T>,
}

impl<T> RetryHandle<T> {
    pub fn correlation_key(&self) -> &str {
        &self.correlation_key
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the retry (e.g. the view was closed). Breaker and attempt
    /// counters are left untouched.
    pub fn cancel(&self) {
        log_debug!(correlation_key = %self.correlation_key, "Cancelling scheduled retry");
        self.task.abort();
    }

    /// Wait for the retried operation's output.
    pub async fn outcome(self) -> EngineResult<T> {
        match self.task.await {
            Ok(output) => Ok(output),
            Err(e) if e.is_cancelled() => Err(EngineError::retry_cancelled(self.correlation_key)),
            Err(e) => Err(EngineError::retry_failed(self.correlation_key, e.to_string())),
        }
    }
}
