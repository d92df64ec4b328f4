//! # Aggregator configuration.
//!
//! Provides [`AggregatorConfig`], the settings for a
//! [`ProcessAggregator`](super::ProcessAggregator).
//!
//! ## Field semantics
//! - `debounce`: delay inserted before committing `Pause`/`Stop` after the
//!   last child leaves the foreground. Must exceed the platform's own
//!   teardown→recreate latency so that destroying and immediately recreating
//!   the last visible child (a rotation) does not falsely signal a
//!   backgrounded process.
//! - `owner_name`: display name of the process owner, used in logs.

use std::sync::Arc;
use std::time::Duration;

/// Default debounce window before committing `Pause`/`Stop`.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(700);

/// Configuration for the process-wide lifecycle aggregator.
#[derive(Clone, Debug)]
pub struct AggregatorConfig {
    /// Delay before a zero resumed-count commits `Pause` (and possibly
    /// `Stop`). See [`DEFAULT_DEBOUNCE`].
    pub debounce: Duration,

    /// Display name of the aggregated process owner.
    pub owner_name: Arc<str>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            owner_name: Arc::from("process"),
        }
    }
}

impl AggregatorConfig {
    /// Overrides the debounce window.
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Overrides the process owner's display name.
    #[must_use]
    pub fn with_owner_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.owner_name = name.into();
        self
    }
}
