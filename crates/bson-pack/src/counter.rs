//! Process-wide lock-free counter.

use std::sync::atomic::{AtomicU32, Ordering};

/// A wrapping `u32` counter backed by a single atomic.
///
/// Every operation is sequentially consistent, so `get`/`set` are
/// linearizable with respect to the read-modify-write operations.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU32,
}

impl AtomicCounter {
    pub const fn new(initial: u32) -> Self {
        Self {
            value: AtomicU32::new(initial),
        }
    }

    pub fn get(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }

    pub fn set(&self, value: u32) {
        self.value.store(value, Ordering::SeqCst);
    }

    pub fn get_and_increment(&self) -> u32 {
        self.value.fetch_add(1, Ordering::SeqCst)
    }

    pub fn increment_and_get(&self) -> u32 {
        self.value.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }

    pub fn decrement_and_get(&self) -> u32 {
        self.value.fetch_sub(1, Ordering::SeqCst).wrapping_sub(1)
    }

    /// Stores `new` only if the current value is `expected`.
    pub fn compare_and_set(&self, expected: u32, new: u32) -> bool {
        self.value
            .compare_exchange(expected, new, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
