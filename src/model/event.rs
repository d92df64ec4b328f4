//! # Lifecycle transition events and broadcast payloads.
//!
//! The [`Event`] enum covers three families that never mix within one owner:
//!
//! - **Component events** (`Create` .. `Destroy`, plus the `Any` wildcard):
//!   move an owner's [`State`] one step and are the only events accepted by
//!   [`LifecycleRegistry::handle_lifecycle_event`](crate::LifecycleRegistry::handle_lifecycle_event).
//! - **Application events** (`App*`): process-wide broadcasts mirrored from
//!   the aggregated process lifecycle; they never change a state.
//! - **Child events** (`Child*`): broadcasts sourced from one of many
//!   short-lived child owners feeding the process aggregator.
//!
//! ## Rules
//! - Each component event except `Any` maps to exactly one target [`State`].
//! - `Any` is a wildcard *subscription* key only: handlers bound to it match
//!   every dispatched event, but `Any` itself is never dispatched.
//! - Broadcast events may carry [`EventArgs`]; transition events never do.

use std::time::Duration;

use super::state::State;

/// A lifecycle transition or broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    // === Component events ===
    /// The owner was created. Target state: [`State::Created`].
    Create,
    /// The owner became visible. Target state: [`State::Started`].
    Start,
    /// The owner became active. Target state: [`State::Resumed`].
    Resume,
    /// The owner is losing focus. Target state: [`State::Started`].
    Pause,
    /// The owner is no longer visible. Target state: [`State::Created`].
    Stop,
    /// The owner is going away. Target state: [`State::Destroyed`].
    Destroy,
    /// Wildcard subscription key matching every event.
    ///
    /// Handlers bound to `Any` fire after the event-specific handlers for the
    /// same dispatch. `Any` has no target state and is never itself
    /// dispatched.
    Any,

    // === Application events ===
    /// One-time broadcast on the first ever process start, carrying the
    /// elapsed startup duration in [`EventArgs::elapsed`].
    AppLaunched,
    /// The process lifecycle passed `Create`.
    AppCreated,
    /// The process lifecycle passed `Start`.
    AppStarted,
    /// The process lifecycle passed `Resume`.
    AppResumed,
    /// The process lifecycle passed `Pause` (after the debounce window).
    AppPaused,
    /// The process lifecycle passed `Stop` (after the debounce window).
    AppStopped,
    /// The process lifecycle would be destroyed. Never emitted by the
    /// aggregator; kept for completeness of the vocabulary.
    AppDestroyed,

    // === Child events ===
    /// A child owner was created. May carry its load time in
    /// [`EventArgs::elapsed`].
    ChildCreated,
    /// A child owner started.
    ChildStarted,
    /// A child owner finished its first setup and is ready for interaction.
    ChildReady,
    /// A child owner resumed.
    ChildResumed,
    /// A child owner paused.
    ChildPaused,
    /// A child owner stopped.
    ChildStopped,
    /// A child owner was destroyed.
    ChildDestroyed,
}

impl Event {
    /// Returns the event reported by an owner leaving `state` downward, or
    /// `None` if no event moves down from it.
    #[must_use]
    pub fn down_from(state: State) -> Option<Event> {
        match state {
            State::Created => Some(Event::Destroy),
            State::Started => Some(Event::Stop),
            State::Resumed => Some(Event::Pause),
            _ => None,
        }
    }

    /// Returns the event reported by an owner entering `state` from a higher
    /// state, or `None` if no event moves down to it.
    #[must_use]
    pub fn down_to(state: State) -> Option<Event> {
        match state {
            State::Destroyed => Some(Event::Destroy),
            State::Created => Some(Event::Stop),
            State::Started => Some(Event::Pause),
            _ => None,
        }
    }

    /// Returns the event reported by an owner leaving `state` upward, or
    /// `None` if no event moves up from it.
    #[must_use]
    pub fn up_from(state: State) -> Option<Event> {
        match state {
            State::Initialized => Some(Event::Create),
            State::Created => Some(Event::Start),
            State::Started => Some(Event::Resume),
            _ => None,
        }
    }

    /// Returns the event reported by an owner entering `state` from a lower
    /// state, or `None` if no event moves up to it.
    #[must_use]
    pub fn up_to(state: State) -> Option<Event> {
        match state {
            State::Created => Some(Event::Create),
            State::Started => Some(Event::Start),
            State::Resumed => Some(Event::Resume),
            _ => None,
        }
    }

    /// Returns the new [`State`] of an owner that just reported this event,
    /// or `None` for `Any` and for broadcast events, which have no target.
    ///
    /// # Example
    /// ```
    /// use lifevisor::{Event, State};
    ///
    /// assert_eq!(Event::Start.target_state(), Some(State::Started));
    /// assert_eq!(Event::Any.target_state(), None);
    /// assert_eq!(Event::ChildStarted.target_state(), None);
    /// ```
    #[must_use]
    pub fn target_state(self) -> Option<State> {
        match self {
            Event::Create | Event::Stop => Some(State::Created),
            Event::Start | Event::Pause => Some(State::Started),
            Event::Resume => Some(State::Resumed),
            Event::Destroy => Some(State::Destroyed),
            _ => None,
        }
    }

    /// Whether this is a component transition event (including `Any`).
    #[inline]
    #[must_use]
    pub fn is_component(self) -> bool {
        matches!(
            self,
            Event::Create
                | Event::Start
                | Event::Resume
                | Event::Pause
                | Event::Stop
                | Event::Destroy
                | Event::Any
        )
    }

    /// Whether this is a process-wide application broadcast.
    #[inline]
    #[must_use]
    pub fn is_application(self) -> bool {
        matches!(
            self,
            Event::AppLaunched
                | Event::AppCreated
                | Event::AppStarted
                | Event::AppResumed
                | Event::AppPaused
                | Event::AppStopped
                | Event::AppDestroyed
        )
    }

    /// Whether this is a child-owner broadcast.
    #[inline]
    #[must_use]
    pub fn is_child(self) -> bool {
        matches!(
            self,
            Event::ChildCreated
                | Event::ChildStarted
                | Event::ChildReady
                | Event::ChildResumed
                | Event::ChildPaused
                | Event::ChildStopped
                | Event::ChildDestroyed
        )
    }
}

/// Extra arguments attached to a broadcast dispatch.
///
/// Transition events carry no arguments; broadcasts may. Today the only
/// payload is the elapsed duration used by [`Event::AppLaunched`] and timed
/// [`Event::ChildCreated`] dispatches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventArgs {
    /// Elapsed duration payload (startup time, child load time).
    pub elapsed: Option<Duration>,
}

impl EventArgs {
    /// An empty argument set.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Attaches an elapsed duration.
    #[inline]
    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }
}
