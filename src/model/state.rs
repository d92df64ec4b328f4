//! # Owner lifecycle states.
//!
//! States form a total order and can be compared directly; an owner only ever
//! moves between adjacent states, one transition event at a time.

/// Lifecycle phase of an owner.
///
/// You can consider the states as nodes in a graph and [`Event`](super::Event)s
/// as the edges between them. The declaration order is the comparison order:
///
/// ```text
/// Destroyed < Initialized < Created < Started < Resumed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// Terminal state. A registry in this state will not dispatch any further
    /// transition events.
    Destroyed,

    /// The owner has been constructed but has not received `Create` yet.
    Initialized,

    /// Reached after `Create`, and again right before `Stop` on the way down.
    Created,

    /// Reached after `Start`, and again right before `Pause` on the way down.
    Started,

    /// Reached after `Resume`. The owner is fully active.
    Resumed,
}

impl State {
    /// Compares if this state is greater or equal to the given `state`.
    ///
    /// # Example
    /// ```
    /// use lifevisor::State;
    ///
    /// assert!(State::Resumed.is_at_least(State::Started));
    /// assert!(!State::Created.is_at_least(State::Started));
    /// ```
    #[inline]
    #[must_use]
    pub fn is_at_least(self, state: State) -> bool {
        self >= state
    }
}
