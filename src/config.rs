//! Tunable constants of the recovery engine.
//!
//! Every value has a production default; hosts may override any subset from
//! TOML:
//!
//! ```rust
//! use clinic_recovery::RecoveryConfig;
//!
//! let config = RecoveryConfig::from_toml_str(
//!     r#"
//!     [circuit_breaker]
//!     failure_threshold = 3
//!
//!     [network]
//!     max_retries = 4
//!     "#,
//! )?;
//! assert_eq!(config.circuit_breaker.failure_threshold, 3);
//! assert_eq!(config.circuit_breaker.timeout_ms, 60_000);
//! # Ok::<(), clinic_recovery::EngineError>(())
//! ```

use crate::error::{EngineError, EngineResult};
use crate::internals::circuit_breaker::CircuitBreakerConfig;
use crate::internals::retry::BackoffPolicy;
use crate::logging::log_debug;
use crate::strategies::StrategyPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authentication strategy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthStrategyConfig {
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    /// Wait imposed by the identity provider's rate limiting
    pub rate_limit_delay_ms: u64,
    /// Retry delay for `auth/network-request-failed`
    pub sdk_network_retry_delay_ms: u64,
    /// Retry delay for other network failures during sign-in
    pub network_retry_delay_ms: u64,
}

impl Default for AuthStrategyConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: BackoffPolicy::exponential(2_000, 30_000),
            rate_limit_delay_ms: 60_000,
            sdk_network_retry_delay_ms: 2_000,
            network_retry_delay_ms: 3_000,
        }
    }
}

impl AuthStrategyConfig {
    pub fn policy(&self) -> StrategyPolicy {
        StrategyPolicy::new(self.max_retries, self.backoff.clone())
    }
}

/// Network strategy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkStrategyConfig {
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
    pub timeout_retry_delay_ms: u64,
    pub connection_retry_delay_ms: u64,
    pub generic_retry_delay_ms: u64,
    /// Request timeout suggested to the caller after a timeout failure
    pub suggested_timeout_ms: u64,
}

impl Default for NetworkStrategyConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: BackoffPolicy::exponential(2_000, 60_000),
            timeout_retry_delay_ms: 5_000,
            connection_retry_delay_ms: 10_000,
            generic_retry_delay_ms: 3_000,
            suggested_timeout_ms: 30_000,
        }
    }
}

impl NetworkStrategyConfig {
    pub fn policy(&self) -> StrategyPolicy {
        StrategyPolicy::new(self.max_retries, self.backoff.clone())
    }
}

/// Validation strategy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationStrategyConfig {
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
}

impl Default for ValidationStrategyConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: BackoffPolicy::fixed(2_000),
        }
    }
}

impl ValidationStrategyConfig {
    pub fn policy(&self) -> StrategyPolicy {
        StrategyPolicy::new(self.max_retries, self.backoff.clone())
    }
}

/// Fallback strategy settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackStrategyConfig {
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
}

impl Default for FallbackStrategyConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: BackoffPolicy::fixed(5_000),
        }
    }
}

impl FallbackStrategyConfig {
    pub fn policy(&self) -> StrategyPolicy {
        StrategyPolicy::new(self.max_retries, self.backoff.clone())
    }
}

/// Dispatcher housekeeping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Attempt counters idle for longer than this are pruned
    pub stale_attempt_ttl_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            stale_attempt_ttl_ms: 300_000, // 5 minutes
        }
    }
}

impl DispatcherConfig {
    pub fn stale_attempt_ttl(&self) -> Duration {
        Duration::from_millis(self.stale_attempt_ttl_ms)
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub circuit_breaker: CircuitBreakerConfig,
    pub auth: AuthStrategyConfig,
    pub network: NetworkStrategyConfig,
    pub validation: ValidationStrategyConfig,
    pub fallback: FallbackStrategyConfig,
    pub dispatcher: DispatcherConfig,
}

impl RecoveryConfig {
    /// Parse TOML, filling missing sections and keys with defaults, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if the TOML is malformed or a
    /// value fails [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| {
            EngineError::configuration_error(format!("Failed to parse recovery config: {e}"))
        })?;
        config.validate()?;
        log_debug!(
            failure_threshold = config.circuit_breaker.failure_threshold,
            breaker_timeout_ms = config.circuit_breaker.timeout_ms,
            "Recovery configuration loaded"
        );
        Ok(config)
    }

    /// Validate thresholds and backoff bounds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Configuration`] if:
    /// - the breaker threshold, timeout or half-open count is zero
    /// - any backoff has `max_delay_ms < base_delay_ms`
    pub fn validate(&self) -> EngineResult<()> {
        let breaker = &self.circuit_breaker;
        if breaker.failure_threshold == 0 {
            return Err(EngineError::configuration_error(
                "circuit_breaker.failure_threshold must be at least 1",
            ));
        }
        if breaker.timeout_ms == 0 {
            return Err(EngineError::configuration_error(
                "circuit_breaker.timeout_ms must be positive",
            ));
        }
        if breaker.half_open_max_calls == 0 {
            return Err(EngineError::configuration_error(
                "circuit_breaker.half_open_max_calls must be at least 1",
            ));
        }

        let backoffs = [
            ("auth", &self.auth.backoff),
            ("network", &self.network.backoff),
            ("validation", &self.validation.backoff),
            ("fallback", &self.fallback.backoff),
        ];
        for (section, backoff) in backoffs {
            if backoff.max_delay_ms < backoff.base_delay_ms {
                return Err(EngineError::configuration_error(format!(
                    "{section}.backoff.max_delay_ms ({}) is below base_delay_ms ({})",
                    backoff.max_delay_ms, backoff.base_delay_ms
                )));
            }
        }

        Ok(())
    }
}
