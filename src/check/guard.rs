// src/check/guard.rs

use std::sync::atomic::{AtomicBool, Ordering};

/// Marks a before-run check as in progress.
///
/// The flag is cleared when the guard drops, on every exit path of the
/// check.
#[derive(Debug)]
pub struct ActiveGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ActiveGuard<'a> {
    /// Set the flag. `None` if it was already set, i.e. a check is running.
    pub fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
