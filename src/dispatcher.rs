//! Recovery dispatcher
//!
//! Owns the strategy list, the attempt counters and the retry scheduler. For
//! each processed error it picks the first strategy that claims it, enforces
//! that strategy's retry ceiling per correlation key, and returns the
//! strategy's decision.
//!
//! ```rust
//! use clinic_recovery::{ErrorContext, RawError, RecoveryDispatcher};
//!
//! let dispatcher = RecoveryDispatcher::new();
//! let outcome = dispatcher.handle(
//!     RawError::from_code("auth/wrong-password"),
//!     &ErrorContext::new("login"),
//! );
//! assert!(outcome.result.fallback_required);
//! assert_eq!(outcome.result.retry_after_ms, None);
//! ```

use crate::classifier::ErrorClassifier;
use crate::config::RecoveryConfig;
use crate::core_types::outcome::duration_ms;
use crate::core_types::{ErrorContext, ErrorType, ProcessedError, RawError, RecoveryResult};
use crate::error::{EngineError, EngineResult};
use crate::internals::attempts::{AttemptDecision, AttemptTracker};
use crate::internals::circuit_breaker::{CircuitSnapshot, CircuitState};
use crate::internals::retry::{RetryHandle, RetryScheduler};
use crate::logging::{log_debug, log_error, log_info, log_warn};
use crate::strategies::{
    AuthErrorStrategy, FallbackStrategy, NetworkErrorStrategy, NoSessionStore, RecoveryStrategy,
    SessionStore, ValidationErrorStrategy,
};
use serde::Serialize;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

/// A classified error together with the recovery decision for it.
#[derive(Debug, Clone)]
pub struct RecoveryOutcome {
    pub error: ProcessedError,
    pub result: RecoveryResult,
}

/// Counters for health endpoints and logging.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryStats {
    pub total_attempts: u64,
    pub active_keys: usize,
    pub pending_retries: usize,
    pub registered_strategies: usize,
    pub network_circuit: CircuitSnapshot,
}

/// Builder for a [`RecoveryDispatcher`] with custom configuration,
/// session store or extra strategies.
pub struct DispatcherBuilder {
    config: RecoveryConfig,
    session: Arc<dyn SessionStore>,
    custom: Vec<Arc<dyn RecoveryStrategy>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            config: RecoveryConfig::default(),
            session: Arc::new(NoSessionStore),
            custom: Vec::new(),
        }
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: RecoveryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session_store(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = session;
        self
    }

    /// Add a strategy between the built-in ones and the fallback.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateStrategy`] if the name is already taken,
    /// including by a built-in strategy.
    pub fn register_strategy(mut self, strategy: Arc<dyn RecoveryStrategy>) -> EngineResult<Self> {
        let name = strategy.name();
        let taken = BUILT_IN_STRATEGIES.contains(&name)
            || self.custom.iter().any(|existing| existing.name() == name);
        if taken {
            return Err(EngineError::duplicate_strategy(name));
        }

        log_debug!(strategy = %name, "Custom recovery strategy registered");
        self.custom.push(strategy);
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if the configuration is invalid.
    pub fn build(self) -> EngineResult<RecoveryDispatcher> {
        self.config.validate()?;
        Ok(RecoveryDispatcher::assemble(self.config, self.session, self.custom))
    }
}

const BUILT_IN_STRATEGIES: &[&str] = &[
    "AuthErrorStrategy",
    "NetworkErrorStrategy",
    "ValidationErrorStrategy",
    "FallbackStrategy",
];

/// Routes processed errors to recovery strategies.
///
/// Shareable across tasks; all interior state is synchronized.
#[derive(Debug)]
pub struct RecoveryDispatcher {
    config: RecoveryConfig,
    classifier: ErrorClassifier,
    strategies: Vec<Arc<dyn RecoveryStrategy>>,
    network: Arc<NetworkErrorStrategy>,
    fallback: Arc<FallbackStrategy>,
    attempts: AttemptTracker,
    scheduler: RetryScheduler,
}

impl Default for RecoveryDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryDispatcher {
    /// Dispatcher with default configuration and no session store.
    pub fn new() -> Self {
        Self::assemble(RecoveryConfig::default(), Arc::new(NoSessionStore), Vec::new())
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if the configuration is invalid.
    pub fn from_config(config: RecoveryConfig) -> EngineResult<Self> {
        DispatcherBuilder::new().config(config).build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    fn assemble(
        config: RecoveryConfig,
        session: Arc<dyn SessionStore>,
        custom: Vec<Arc<dyn RecoveryStrategy>>,
    ) -> Self {
        let network = Arc::new(NetworkErrorStrategy::new(
            config.network.clone(),
            config.circuit_breaker.clone(),
        ));
        let fallback = Arc::new(FallbackStrategy::new(config.fallback.clone()));

        let mut strategies: Vec<Arc<dyn RecoveryStrategy>> = vec![
            Arc::new(AuthErrorStrategy::new(config.auth.clone()).with_session_store(session)),
            Arc::clone(&network) as Arc<dyn RecoveryStrategy>,
            Arc::new(ValidationErrorStrategy::new(config.validation.clone())),
        ];
        strategies.extend(custom);
        strategies.push(Arc::clone(&fallback) as Arc<dyn RecoveryStrategy>);

        log_info!(
            strategies = strategies.len(),
            failure_threshold = config.circuit_breaker.failure_threshold,
            "Recovery dispatcher initialized"
        );

        Self {
            config,
            classifier: ErrorClassifier::new(),
            strategies,
            network,
            fallback,
            attempts: AttemptTracker::new(),
            scheduler: RetryScheduler::new(),
        }
    }

    /// Classify a raw error, taking the network circuit into account.
    pub fn classify(&self, raw: RawError, context: &ErrorContext) -> ProcessedError {
        self.classifier
            .classify_with_circuit(raw, context, self.network.circuit_state())
    }

    /// Classify and recover in one step.
    pub fn handle(&self, raw: RawError, context: &ErrorContext) -> RecoveryOutcome {
        let error = self.classify(raw, context);
        let result = self.recover(&error, context.effective_correlation_key());
        RecoveryOutcome { error, result }
    }

    /// Pick a strategy and run it, within the strategy's retry ceiling.
    ///
    /// Never fails: a panicking strategy or an exhausted ceiling both end in
    /// the fallback with `fallback_required` set.
    pub fn recover(&self, error: &ProcessedError, correlation_key: &str) -> RecoveryResult {
        let strategy = self.select(error);

        let attempt = match self
            .attempts
            .begin(correlation_key, error.error_type, strategy.max_retries())
        {
            AttemptDecision::Proceed { attempt } => attempt,
            AttemptDecision::Exhausted { attempts } => {
                log_warn!(
                    error_id = %error.id,
                    correlation_key = %correlation_key,
                    strategy = %strategy.name(),
                    attempts = attempts,
                    "Retry ceiling reached, forcing fallback"
                );
                let reason = format!("Retry limit reached after {attempts} attempts");
                return self.forced_fallback(error, reason);
            }
        };

        log_debug!(
            error_id = %error.id,
            correlation_key = %correlation_key,
            strategy = %strategy.name(),
            attempt = attempt,
            "Recovery strategy selected"
        );

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.execute(error)));
        let mut result = match outcome {
            Ok(result) => result,
            Err(_) => {
                log_error!(
                    error_id = %error.id,
                    strategy = %strategy.name(),
                    "Recovery strategy panicked"
                );
                return self.forced_fallback(error, format!("Strategy {} failed", strategy.name()));
            }
        };

        if result.success {
            self.attempts.clear(correlation_key, error.error_type);
        }
        if result.data.user_message.is_none() {
            result.data.user_message = Some(FallbackStrategy::user_message(error));
        }
        result
    }

    fn select(&self, error: &ProcessedError) -> &dyn RecoveryStrategy {
        self.strategies
            .iter()
            .find(|strategy| strategy.can_handle(error))
            .map_or(self.fallback.as_ref() as &dyn RecoveryStrategy, |strategy| {
                strategy.as_ref()
            })
    }

    fn forced_fallback(&self, error: &ProcessedError, reason: String) -> RecoveryResult {
        let mut result = self.fallback.execute(error);
        result.success = false;
        result.fallback_required = true;
        result.retry_after_ms = None;
        result.message = reason;
        result.data.fallback_options = FallbackStrategy::fallback_options(error.error_type);
        result.data.user_message = Some(FallbackStrategy::user_message(error));

        // An exhausted network budget still reports the breaker's cool-down.
        if error.error_type == ErrorType::Network {
            if let Some(wait) = self.network.open_circuit_wait() {
                result.retry_after_ms = Some(duration_ms(wait));
                result.data.circuit_breaker_open = true;
            }
        }
        result
    }

    /// Delay before retrying the original operation, or `None` when the
    /// result does not allow a retry.
    ///
    /// The larger of the strategy's hint and the policy backoff for the
    /// current attempt wins, so externally imposed waits are never shortened.
    pub fn retry_delay(
        &self,
        correlation_key: &str,
        error: &ProcessedError,
        result: &RecoveryResult,
    ) -> Option<Duration> {
        if !result.allows_retry() {
            return None;
        }

        let attempt = self.attempts.attempts(correlation_key, error.error_type);
        let backoff = self.select(error).policy().backoff.delay_for_attempt(attempt);
        Some(result.retry_after().map_or(backoff, |hint| hint.max(backoff)))
    }

    /// Re-run the caller's operation after `delay`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::RetryInFlight`] if a retry for this key is pending
    /// - [`EngineError::RetryFailed`] if called outside a Tokio runtime
    pub fn schedule_retry<F, Fut, T>(
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
        self.scheduler.schedule(correlation_key, delay, operation)
    }

    /// The guarded operation succeeded: clear its counters and let
    /// strategies update their health state.
    pub fn record_success(&self, correlation_key: &str) {
        let cleared = self.attempts.reset_key(correlation_key);
        for strategy in &self.strategies {
            strategy.on_operation_success();
        }
        log_debug!(
            correlation_key = %correlation_key,
            cleared_counters = cleared,
            "Operation success recorded"
        );
    }

    /// Drop all attempt counters for a key; returns how many were removed.
    pub fn reset_attempts(&self, correlation_key: &str) -> usize {
        self.attempts.reset_key(correlation_key)
    }

    /// Drop counters idle for longer than the configured TTL.
    pub fn prune_stale_attempts(&self) -> usize {
        let pruned = self
            .attempts
            .prune_older_than(self.config.dispatcher.stale_attempt_ttl());
        if pruned > 0 {
            log_debug!(pruned = pruned, "Stale attempt counters pruned");
        }
        pruned
    }

    pub fn attempts(&self, correlation_key: &str, error_type: ErrorType) -> u32 {
        self.attempts.attempts(correlation_key, error_type)
    }

    pub fn stats(&self) -> RecoveryStats {
        RecoveryStats {
            total_attempts: self.attempts.total_attempts(),
            active_keys: self.attempts.active_keys(),
            pending_retries: self.scheduler.pending_count(),
            registered_strategies: self.strategies.len(),
            network_circuit: self.network.circuit_snapshot(),
        }
    }

    /// Strategy names in dispatch order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|strategy| strategy.name()).collect()
    }

    pub fn network_circuit_state(&self) -> CircuitState {
        self.network.circuit_state()
    }

    pub fn network_strategy(&self) -> &NetworkErrorStrategy {
        &self.network
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }
}
