use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Acquires the mutex, taking the inner state back from a poisoned guard
/// if another thread panicked while holding it.
pub(crate) fn mutex_lock<'a, T>(lock: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!(op, "recovered a poisoned cache queue lock");
        poisoned.into_inner()
    })
}
