//! Incrementing and decrementing counter.

use std::sync::atomic::{AtomicI64, Ordering};

/// Signed counter.
#[derive(Debug, Default)]
pub struct Counter {
    count: AtomicI64,
}

impl Counter {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment by `n`.
    pub fn inc_by(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    /// Decrement by one.
    pub fn dec(&self) {
        self.dec_by(1);
    }

    /// Decrement by `n`.
    pub fn dec_by(&self, n: i64) {
        self.count.fetch_sub(n, Ordering::Relaxed);
    }

    /// Current value.
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Reset to zero.
    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}
