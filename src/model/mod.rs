//! # Lifecycle vocabulary: states, events, and dispatch arguments.
//!
//! This module is pure data. [`State`] is the totally ordered set of phases an
//! owner can be in, [`Event`] is the closed set of transitions and broadcasts
//! that move owners between phases or notify observers, and [`EventArgs`] is
//! the small payload a broadcast can carry.
//!
//! The transition tables (`up_from`, `down_from`, `target_state`, ...) live on
//! [`Event`]; everything that interprets them lives in
//! [`LifecycleRegistry`](crate::LifecycleRegistry) and
//! [`ProcessAggregator`](crate::ProcessAggregator).

mod event;
mod state;

pub use event::{Event, EventArgs};
pub use state::State;
