//! # LogObserver — simple event printer.
//!
//! A minimal observer that prints every dispatched event to stdout.
//! Use it for tests or demos.
//!
//! ## Example output
//! ```text
//! [create] owner="main"
//! [start] owner="main"
//! [app-launched] owner="main" elapsed=12ms
//! [child-paused] owner="main"
//! ```

use crate::model::{Event, EventArgs};
use crate::registry::OwnerRef;

use super::observer::{EventObserver, LifecycleObserver};

/// Event printer observer.
///
/// Enabled via the `logging` feature. Prints human-readable event lines to
/// stdout for debugging and demonstration purposes. Not intended for
/// production use — implement a custom [`EventObserver`] for structured
/// logging or metrics collection.
#[derive(Default)]
pub struct LogObserver;

impl LogObserver {
    /// Construct a new [`LogObserver`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn tag(event: Event) -> &'static str {
        match event {
            Event::Create => "create",
            Event::Start => "start",
            Event::Resume => "resume",
            Event::Pause => "pause",
            Event::Stop => "stop",
            Event::Destroy => "destroy",
            Event::Any => "any",
            Event::AppLaunched => "app-launched",
            Event::AppCreated => "app-created",
            Event::AppStarted => "app-started",
            Event::AppResumed => "app-resumed",
            Event::AppPaused => "app-paused",
            Event::AppStopped => "app-stopped",
            Event::AppDestroyed => "app-destroyed",
            Event::ChildCreated => "child-created",
            Event::ChildStarted => "child-started",
            Event::ChildReady => "child-ready",
            Event::ChildResumed => "child-resumed",
            Event::ChildPaused => "child-paused",
            Event::ChildStopped => "child-stopped",
            Event::ChildDestroyed => "child-destroyed",
        }
    }
}

impl EventObserver for LogObserver {
    fn on_event(&self, owner: &OwnerRef, event: Event, args: &EventArgs) {
        match args.elapsed {
            Some(elapsed) => println!(
                "[{}] owner={:?} elapsed={elapsed:?}",
                Self::tag(event),
                owner.name()
            ),
            None => println!("[{}] owner={:?}", Self::tag(event), owner.name()),
        }
    }
}

impl LifecycleObserver for LogObserver {
    fn as_event(&self) -> Option<&dyn EventObserver> {
        Some(self)
    }
}
