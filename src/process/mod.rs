//! # Process-wide lifecycle aggregation.
//!
//! Many short-lived child owners in, one debounced process lifecycle out.
//! [`ProcessAggregator`] keeps live counters over child activity, drives a
//! single [`LifecycleRegistry`](crate::LifecycleRegistry) for the whole
//! process, and inserts a bounded delay before committing `Pause`/`Stop` so
//! a teardown-then-recreate of the last visible child is absorbed.

mod aggregator;
mod bridge;
mod config;
mod feed;
mod startup;

pub use aggregator::ProcessAggregator;
pub use config::{AggregatorConfig, DEFAULT_DEBOUNCE};
pub use feed::ChildSignal;
