//! Lock-free distribution of page indices across fetch workers

use std::sync::atomic::{AtomicUsize, Ordering};

/// Claim-once cursor over the page range `0..total`.
///
/// Fetch workers call [`next()`](PageCursor::next) to atomically claim the
/// next unfetched page; every index is handed out exactly once, to exactly
/// one worker.
pub struct PageCursor {
    cursor: AtomicUsize,
    total: usize,
}

impl PageCursor {
    pub fn new(total: usize) -> Self {
        Self {
            cursor: AtomicUsize::new(0),
            total,
        }
    }

    /// Claim the next page index (lock-free)
    pub fn next(&self) -> Option<usize> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        (i < self.total).then_some(i)
    }

    /// Total pages in the range
    pub fn total(&self) -> usize {
        self.total
    }
}
