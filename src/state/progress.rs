//! Live progress of a running dispatch
//!
//! Workers advance the counter as they complete; an observer (the CLI
//! progress bar) polls [`Progress::snapshot`] on its own schedule.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A point-in-time view of a [`Progress`] counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Whether a dispatch is currently running
    pub enabled: bool,
    pub current: usize,
    pub total: usize,
}

/// Shared completion counter handed to one dispatch at a time
///
/// Cloning is cheap and every clone observes the same counter.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    inner: Arc<ProgressInner>,
}

#[derive(Debug, Default)]
struct ProgressInner {
    enabled: AtomicBool,
    current: AtomicUsize,
    total: AtomicUsize,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the counter and fixes `total` for the dispatch about to start
    pub fn begin(&self, total: usize) {
        self.inner.current.store(0, Ordering::SeqCst);
        self.inner.total.store(total, Ordering::SeqCst);
        self.inner.enabled.store(true, Ordering::SeqCst);
    }

    /// Records one completed task and returns the new `current`
    pub fn advance(&self) -> usize {
        self.inner.current.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Marks the dispatch as finished; counts are kept for the final report
    pub fn finish(&self) {
        self.inner.enabled.store(false, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            enabled: self.inner.enabled.load(Ordering::SeqCst),
            current: self.inner.current.load(Ordering::SeqCst),
            total: self.inner.total.load(Ordering::SeqCst),
        }
    }
}
