//! One-shot measurement of process startup time.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Measures the time from aggregator construction to the first process
/// start, exactly once.
pub(crate) struct StartupClock {
    origin: Instant,
    loading: Cell<Option<Duration>>,
}

impl StartupClock {
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            loading: Cell::new(None),
        }
    }

    /// Latches the loading time on first call and returns it; every later
    /// call returns `None`.
    pub(crate) fn mark_loaded(&self) -> Option<Duration> {
        if self.loading.get().is_some() {
            return None;
        }
        let elapsed = self.origin.elapsed();
        self.loading.set(Some(elapsed));
        Some(elapsed)
    }

    /// The latched loading time, if the process has started.
    pub(crate) fn loading_time(&self) -> Option<Duration> {
        self.loading.get()
    }
}
