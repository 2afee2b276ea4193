//! Internal building blocks for the recovery engine
//!
//! Stateful pieces that the strategies and dispatcher compose: the circuit
//! breaker, attempt counters and retry timing. Re-exported through `lib.rs`.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod attempts;
pub mod circuit_breaker;
pub mod retry;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
