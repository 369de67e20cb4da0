pub mod memory;
pub mod rate_limiter;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// A panic while holding one of these locks cannot leave the guarded
/// bookkeeping half-updated, so poisoning is ignored.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
