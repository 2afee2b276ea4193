//! Per-operation attempt counters.
//!
//! Counters are keyed by the caller's correlation key and the error type, so
//! an operation that first times out and then fails validation gets a fresh
//! budget for the second failure mode.

use super::lock_recovering;
use crate::core_types::ErrorType;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AttemptKey {
    correlation_key: String,
    error_type: ErrorType,
}

#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    attempts: u32,
    last_attempt: Instant,
}

/// Outcome of asking for another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptDecision {
    /// Go ahead; this is attempt number `attempt` (1-based).
    Proceed { attempt: u32 },
    /// The strategy's ceiling was reached after `attempts` attempts.
    Exhausted { attempts: u32 },
}

/// Attempt counters shared by every caller of one dispatcher.
#[derive(Debug, Default)]
pub struct AttemptTracker {
    records: Mutex<HashMap<AttemptKey, AttemptRecord>>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the ceiling and count the attempt in one step.
    pub fn begin(
        &self,
        correlation_key: &str,
        error_type: ErrorType,
        max_retries: u32,
    ) -> AttemptDecision {
        let mut records = lock_recovering(&self.records);
        let record = records
            .entry(AttemptKey {
                correlation_key: correlation_key.to_string(),
                error_type,
            })
            .or_insert(AttemptRecord {
                attempts: 0,
                last_attempt: Instant::now(),
            });

        record.last_attempt = Instant::now();
        if record.attempts >= max_retries {
            return AttemptDecision::Exhausted {
                attempts: record.attempts,
            };
        }

        record.attempts += 1;
        AttemptDecision::Proceed {
            attempt: record.attempts,
        }
    }

    /// Attempts counted so far for this key and type.
    pub fn attempts(&self, correlation_key: &str, error_type: ErrorType) -> u32 {
        lock_recovering(&self.records)
            .get(&AttemptKey {
                correlation_key: correlation_key.to_string(),
                error_type,
            })
            .map_or(0, |record| record.attempts)
    }

    pub fn clear(&self, correlation_key: &str, error_type: ErrorType) {
        lock_recovering(&self.records).remove(&AttemptKey {
            correlation_key: correlation_key.to_string(),
            error_type,
        });
    }

    /// Drop every counter for `correlation_key`; returns how many were removed.
    pub fn reset_key(&self, correlation_key: &str) -> usize {
        let mut records = lock_recovering(&self.records);
        let before = records.len();
        records.retain(|key, _| key.correlation_key != correlation_key);
        before - records.len()
    }

    /// Drop counters idle for longer than `max_age`; returns how many were removed.
    pub fn prune_older_than(&self, max_age: Duration) -> usize {
        let mut records = lock_recovering(&self.records);
        let before = records.len();
        records.retain(|_, record| record.last_attempt.elapsed() <= max_age);
        before - records.len()
    }

    pub fn total_attempts(&self) -> u64 {
        lock_recovering(&self.records)
            .values()
            .map(|record| u64::from(record.attempts))
            .sum()
    }

    /// Distinct correlation keys with live counters.
    pub fn active_keys(&self) -> usize {
        lock_recovering(&self.records)
            .keys()
            .map(|key| key.correlation_key.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
