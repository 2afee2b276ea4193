//! Circuit breaker guarding a failure-prone dependency
//!
//! - 5 consecutive failures open the circuit
//! - while open, calls are rejected with the remaining cool-down (60s)
//! - the first call or reported success after the cool-down moves the circuit
//!   to half-open
//! - 3 consecutive half-open successes close it; one half-open failure reopens it
//!
//! Time is measured with `tokio::time::Instant` so paused test clocks apply.

use crate::logging::{log_debug, log_info, log_trace, log_warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Breaker thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures that open a closed circuit.
    pub failure_threshold: u32,
    /// Cool-down after the last failure before a probe is allowed, in milliseconds.
    pub timeout_ms: u64,
    /// Consecutive half-open successes that close the circuit.
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout_ms: 60_000,
            half_open_max_calls: 3,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,   // Normal operation
    Open,     // Failing, blocking requests
    HalfOpen, // Testing if the dependency recovered
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Whether a call may go through right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitDecision {
    Allowed,
    Rejected {
        /// Remaining cool-down before a probe is allowed.
        retry_after: Duration,
    },
}

/// Point-in-time view of a breaker, for stats and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub half_open_successes: u32,
    /// Time since the last recorded failure.
    pub since_last_failure: Option<Duration>,
}

/// Error from [`CircuitBreaker::call`].
#[derive(Error, Debug)]
pub enum CircuitCallError<E> {
    /// The circuit is open; the operation was not invoked.
    #[error("Circuit breaker '{name}' is open, retry after {retry_after:?}")]
    Open { name: String, retry_after: Duration },

    /// The operation ran and failed.
    #[error("Guarded operation failed: {0}")]
    Operation(E),
}

/// Circuit breaker for one guarded dependency
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: CircuitState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    half_open_successes: u32,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new("network", CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_time: None,
            half_open_successes: 0,
        }
    }

    /// Decide whether a call may proceed, moving Open to HalfOpen once the
    /// cool-down has elapsed.
    pub fn try_acquire(&mut self) -> CircuitDecision {
        match self.state {
            CircuitState::Closed | CircuitState::HalfOpen => CircuitDecision::Allowed,
            CircuitState::Open => self.check_recovery_timeout(),
        }
    }

    fn check_recovery_timeout(&mut self) -> CircuitDecision {
        match self.remaining_cooldown() {
            Some(retry_after) => CircuitDecision::Rejected { retry_after },
            None => {
                self.enter_half_open();
                CircuitDecision::Allowed
            }
        }
    }

    fn enter_half_open(&mut self) {
        log_debug!(
            circuit_breaker = %self.name,
            transition = "open_to_half_open",
            timeout_ms = self.config.timeout_ms,
            "Circuit breaker attempting recovery"
        );
        self.state = CircuitState::HalfOpen;
        self.half_open_successes = 0;
    }

    /// Time left before an open circuit lets a probe through; `None` unless
    /// the circuit is open and still cooling down.
    pub fn remaining_cooldown(&self) -> Option<Duration> {
        if self.state != CircuitState::Open {
            return None;
        }
        let timeout = self.config.timeout();
        let elapsed = self
            .last_failure_time
            .map_or(timeout, |last_failure| last_failure.elapsed());
        (elapsed < timeout).then(|| timeout - elapsed)
    }

    /// Record a successful call against the dependency.
    pub fn record_success(&mut self) {
        match self.state {
            CircuitState::HalfOpen => {
                self.half_open_successes = self.half_open_successes.saturating_add(1);
                if self.half_open_successes >= self.config.half_open_max_calls {
                    log_info!(
                        circuit_breaker = %self.name,
                        transition = "half_open_to_closed",
                        probes = self.half_open_successes,
                        "Circuit breaker recovered, returning to closed state"
                    );
                    self.reset();
                }
            }
            CircuitState::Closed => {
                self.failure_count = 0;
            }
            CircuitState::Open if self.remaining_cooldown().is_none() => {
                self.enter_half_open();
                self.record_success();
            }
            CircuitState::Open => {
                log_trace!(
                    circuit_breaker = %self.name,
                    "Ignoring success reported while circuit is open"
                );
            }
        }
    }

    /// Record a failed call. Every failure counts, whatever the state.
    pub fn record_failure(&mut self) {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure_time = Some(Instant::now());

        match self.state {
            CircuitState::HalfOpen => {
                log_warn!(
                    circuit_breaker = %self.name,
                    transition = "half_open_to_open",
                    failure_count = self.failure_count,
                    "Half-open probe failed, reopening circuit"
                );
                self.state = CircuitState::Open;
                self.half_open_successes = 0;
            }
            CircuitState::Closed if self.failure_count >= self.config.failure_threshold => {
                log_warn!(
                    circuit_breaker = %self.name,
                    transition = "closed_to_open",
                    failure_count = self.failure_count,
                    failure_threshold = self.config.failure_threshold,
                    timeout_ms = self.config.timeout_ms,
                    "Circuit breaker opened due to repeated failures"
                );
                self.state = CircuitState::Open;
            }
            CircuitState::Closed | CircuitState::Open => {}
        }
    }

    /// Return to a pristine closed state.
    pub fn reset(&mut self) {
        self.state = CircuitState::Closed;
        self.failure_count = 0;
        self.last_failure_time = None;
        self.half_open_successes = 0;
    }

    /// Run `operation` through the breaker.
    ///
    /// While open, the operation is not invoked and [`CircuitCallError::Open`]
    /// carries the remaining cool-down.
    pub async fn call<F, Fut, T, E>(&mut self, operation: F) -> Result<T, CircuitCallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let CircuitDecision::Rejected { retry_after } = self.try_acquire() {
            log_debug!(
                circuit_breaker = %self.name,
                retry_after_ms = retry_after.as_millis(),
                "Call rejected by open circuit"
            );
            return Err(CircuitCallError::Open {
                name: self.name.clone(),
                retry_after,
            });
        }

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure();
                Err(CircuitCallError::Operation(error))
            }
        }
    }

    /// Get current circuit breaker state
    pub fn state(&self) -> CircuitState {
        self.state
    }

    /// State as callers should see it: an open circuit whose cool-down has
    /// elapsed already admits a probe, so it reads as half-open.
    pub fn current_state(&self) -> CircuitState {
        if self.state == CircuitState::Open && self.remaining_cooldown().is_none() {
            CircuitState::HalfOpen
        } else {
            self.state
        }
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn last_failure_time(&self) -> Option<Instant> {
        self.last_failure_time
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    pub fn is_healthy(&self) -> bool {
        self.state == CircuitState::Closed
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        CircuitSnapshot {
            name: self.name.clone(),
            state: self.current_state(),
            failure_count: self.failure_count,
            half_open_successes: self.half_open_successes,
            since_last_failure: self.last_failure_time.map(|at| at.elapsed()),
        }
    }
}
