//! Work distribution over an ordered batch of tasks

use std::sync::atomic::{AtomicUsize, Ordering};

/// Hands out task indices to workers, each index exactly once
///
/// The cursor starts at zero and only moves forward. A claim is a single
/// atomic read-and-increment, so interleaved or truly parallel callers can
/// neither observe the same index twice nor skip one. The only terminal
/// signal is exhaustion; claiming never fails otherwise.
#[derive(Debug)]
pub struct Dispatcher {
    next: AtomicUsize,
    len: usize,
}

impl Dispatcher {
    /// Create a dispatcher over the indices `0..len`
    pub fn new(len: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            len,
        }
    }

    /// Claim the next unclaimed index, or `None` once the batch is exhausted
    pub fn claim(&self) -> Option<usize> {
        // Relaxed suffices: the counter carries no data dependency, and
        // outcome publication is synchronized by the result slots and the
        // worker join.
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.len).then_some(index)
    }

    /// Total number of indices this dispatcher hands out
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every index has been claimed
    pub fn is_exhausted(&self) -> bool {
        self.next.load(Ordering::Relaxed) >= self.len
    }
}
