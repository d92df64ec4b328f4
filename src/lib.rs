//! # lifevisor
//!
//! **Lifevisor** is a component-lifecycle runtime for Rust.
//!
//! It tracks long-lived "owner" objects (screens, the application process)
//! through a fixed state machine, dispatches transition events to registered
//! observers in a well-defined order, and folds many short-lived child
//! lifecycles into one debounced process-wide lifecycle signal. The crate is
//! designed as a building block for application frameworks and shells.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   platform hook (external)            owner (e.g. a screen)
//!        │ child activity                    │ transition events
//!        ▼                                   ▼
//! ┌──────────────────────────┐   ┌──────────────────────────────────────┐
//! │  ProcessAggregator       │   │  LifecycleRegistry (per owner)       │
//! │  - started/resumed       │   │  - current State                     │
//! │    counters              │   │  - add/remove observer (re-entrant)  │
//! │  - pause/stop debounce   │──►│  - handle_lifecycle_event            │
//! │    (700 ms timer)        │   │  - dispatch_event (broadcasts)       │
//! │  - AppLaunched latch     │   └──────────────┬───────────────────────┘
//! └──────────────────────────┘                  │ per-observer delivery
//!                                               ▼
//!                        ┌─────────────────────────────────────────────┐
//!                        │  strategy resolution (cached per type)      │
//!                        │  - declared capabilities (full / raw)       │
//!                        │  - pre-built adapters (+ CallTracker)       │
//!                        │  - DispatchTable from explicit bindings     │
//!                        └─────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! State:  Destroyed < Initialized < Created < Started < Resumed
//!
//!             Create         Start          Resume
//! Initialized ──────► Created ─────► Started ─────► Resumed
//!                        ▲              ▲              │
//!                        │     Stop     │    Pause     │
//!    Destroyed ◄──────── └───────────── └──────────────┘
//!              Destroy
//! ```
//!
//! ## Features
//! | Area            | Description                                                       | Key types                                    |
//! |-----------------|-------------------------------------------------------------------|----------------------------------------------|
//! | **Observers**   | Register any value; capability decides what it receives.         | [`LifecycleObserver`], [`FullObserver`], [`EventObserver`] |
//! | **Bindings**    | Explicit event→handler tables, merged with conflict detection.   | [`Binding`], [`BindingSpec`], [`DispatchTable`] |
//! | **Adapters**    | Pre-built dispatch with per-event call de-duplication.           | [`PrebuiltAdapter`], [`CallTracker`]         |
//! | **Registries**  | Per-owner state machine with catch-up replay and LIFO fan-out.   | [`LifecycleRegistry`], [`OwnerRef`]          |
//! | **Aggregation** | Debounced process lifecycle over N children.                     | [`ProcessAggregator`], [`ChildSignal`]       |
//! | **Errors**      | Fail-fast configuration errors at registration time.             | [`ConfigError`]                              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogObserver`] _(demo/reference only)_.
//!
//! ## Threading model
//! One registry belongs to one owner thread; registries never lock. The
//! per-type dispatch caches are process-wide and safe under concurrent first
//! access. The only suspending operation is the aggregator's debounce timer,
//! which runs on the same single-threaded queue — drive a
//! [`ProcessAggregator`] inside a `tokio::task::LocalSet` on a
//! current-thread runtime.
//!
//! ## Example
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use lifevisor::{
//!     Event, FullObserver, LifecycleObserver, LifecycleRegistry, OwnerRef, State,
//! };
//!
//! #[derive(Default)]
//! struct Visibility {
//!     visible: Cell<bool>,
//! }
//!
//! impl FullObserver for Visibility {
//!     fn on_start(&self, _owner: &OwnerRef) {
//!         self.visible.set(true);
//!     }
//!     fn on_stop(&self, _owner: &OwnerRef) {
//!         self.visible.set(false);
//!     }
//! }
//!
//! impl LifecycleObserver for Visibility {
//!     fn as_full(&self) -> Option<&dyn FullObserver> {
//!         Some(self)
//!     }
//! }
//!
//! let screen = LifecycleRegistry::new("screen");
//! let visibility = Rc::new(Visibility::default());
//! screen.add_observer(visibility.clone()).unwrap();
//!
//! screen.handle_lifecycle_event(Event::Create);
//! screen.handle_lifecycle_event(Event::Start);
//! assert!(visibility.visible.get());
//! assert_eq!(screen.state(), State::Started);
//!
//! screen.handle_lifecycle_event(Event::Stop);
//! assert!(!visibility.visible.get());
//! ```

mod error;
mod model;
mod observers;
mod process;
mod registry;

// ---- Public re-exports ----

pub use error::ConfigError;
pub use model::{Event, EventArgs, State};
pub use observers::{
    Binding, BindingSpec, CallKind, CallPass, CallTracker, DispatchTable, EventObserver,
    FullObserver, LifecycleObserver, PrebuiltAdapter,
};
pub use process::{AggregatorConfig, ChildSignal, ProcessAggregator, DEFAULT_DEBOUNCE};
pub use registry::{LifecycleRegistry, OwnerId, OwnerRef};

// Optional: expose a simple built-in stdout observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogObserver;
