//! # Debounced many-to-one lifecycle aggregation.
//!
//! [`ProcessAggregator`] folds the activity of N short-lived child owners
//! (think: N open screens) into one process-wide [`LifecycleRegistry`].
//!
//! ## Architecture
//! ```text
//! platform hook ──► child_started()/child_resumed()/... (per child instance)
//!                        │
//!                        ▼
//!               started/resumed counters + pause_sent/stop_sent flags
//!                        │
//!        first start ───►│◄─── last pause starts the debounce timer
//!                        ▼
//!              process LifecycleRegistry (Create/Start/Resume/Pause/Stop)
//!                        │
//!                        └─► App*/Child* broadcasts to process observers
//! ```
//!
//! ## Rules
//! - `Create` is driven once at construction; `Destroy` is never driven —
//!   the process lifecycle outlives every child.
//! - `Start`/`Resume` are driven as the **first** child passes them.
//! - `Pause`/`Stop` are driven with a delay ([`AggregatorConfig::debounce`])
//!   after the **last** child passes them, so a destroy-then-recreate of the
//!   last visible child (a rotation) is absorbed: the recreated child's
//!   resume cancels the pending timer and nothing is emitted.
//! - `pause_sent`/`stop_sent` are the single source of truth, checked both
//!   when the timer is scheduled and again when it fires.
//! - The counters are signed and may transiently go negative under malformed
//!   input; any non-positive count is treated as "no owners active". The
//!   aggregator assumes, but does not enforce, the documented per-child call
//!   order `created → started → resumed → (paused → stopped)* → destroyed`.
//!
//! ## Runtime requirements
//! The aggregator is single-threaded and schedules its debounce timer with
//! [`tokio::task::spawn_local`]: construct and drive it inside a
//! [`tokio::task::LocalSet`] running on a current-thread runtime.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tokio_util::sync::CancellationToken;

use crate::error::ConfigError;
use crate::model::{Event, EventArgs, State};
use crate::observers::LifecycleObserver;
use crate::registry::{LifecycleRegistry, OwnerRef};

use super::bridge::AppEventBridge;
use super::config::AggregatorConfig;
use super::startup::StartupClock;

/// Shared state behind a [`ProcessAggregator`] and its timer callbacks.
pub(crate) struct AggregatorInner {
    cfg: AggregatorConfig,
    registry: LifecycleRegistry,
    /// Ground-truth counters of children currently started/resumed.
    started: Cell<i32>,
    resumed: Cell<i32>,
    pause_sent: Cell<bool>,
    stop_sent: Cell<bool>,
    clock: StartupClock,
    /// Cancellation handle of the pending debounce timer, if any.
    pause_timer: RefCell<Option<CancellationToken>>,
}

impl AggregatorInner {
    pub(crate) fn broadcast(&self, event: Event) {
        self.registry.dispatch_event(event, &EventArgs::none());
    }

    /// Emits the one-time `AppLaunched` broadcast with the elapsed startup
    /// duration; a no-op after the first call.
    pub(crate) fn announce_launch(&self) {
        if let Some(elapsed) = self.clock.mark_loaded() {
            self.registry
                .dispatch_event(Event::AppLaunched, &EventArgs::none().with_elapsed(elapsed));
        }
    }

    fn child_started(&self) {
        self.started.set(self.started.get() + 1);
        if self.started.get() == 1 && self.stop_sent.get() {
            self.registry.handle_lifecycle_event(Event::Start);
            self.stop_sent.set(false);
            self.broadcast(Event::ChildStarted);
        }
    }

    fn child_resumed(&self) {
        self.resumed.set(self.resumed.get() + 1);
        if self.resumed.get() == 1 {
            if self.pause_sent.get() {
                self.registry.handle_lifecycle_event(Event::Resume);
                self.pause_sent.set(false);
                self.broadcast(Event::ChildResumed);
            } else {
                // A recreate landed inside the debounce window.
                self.cancel_pause_timer();
            }
        }
    }

    fn child_paused(this: &Rc<Self>) {
        this.resumed.set(this.resumed.get() - 1);
        if this.resumed.get() == 0 {
            Self::schedule_delayed_pause(this);
        }
        this.broadcast(Event::ChildPaused);
    }

    fn child_stopped(&self) {
        self.started.set(self.started.get() - 1);
        self.dispatch_stop_if_needed();
        self.broadcast(Event::ChildStopped);
    }

    fn dispatch_pause_if_needed(&self) {
        if self.resumed.get() <= 0 {
            self.pause_sent.set(true);
            self.registry.handle_lifecycle_event(Event::Pause);
        }
    }

    fn dispatch_stop_if_needed(&self) {
        if self.started.get() <= 0 && self.pause_sent.get() {
            self.registry.handle_lifecycle_event(Event::Stop);
            self.stop_sent.set(true);
        }
    }

    fn schedule_delayed_pause(this: &Rc<Self>) {
        this.cancel_pause_timer();
        let token = CancellationToken::new();
        *this.pause_timer.borrow_mut() = Some(token.clone());

        let weak = Rc::downgrade(this);
        let debounce = this.cfg.debounce;
        tokio::task::spawn_local(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(debounce) => {
                    if let Some(inner) = weak.upgrade() {
                        inner.dispatch_pause_if_needed();
                        inner.dispatch_stop_if_needed();
                    }
                }
            }
        });
    }

    fn cancel_pause_timer(&self) {
        if let Some(token) = self.pause_timer.borrow_mut().take() {
            token.cancel();
        }
    }
}

/// Lifecycle owner for the whole process.
///
/// You can consider this owner the composite of all child owners, except
/// that `Create` is dispatched once and `Destroy` is never dispatched.
/// `Start`/`Resume` fire as the first child moves through them; `Pause`/
/// `Stop` fire with a debounce delay after the last child passed them.
///
/// Useful when you want to react to the process coming to the foreground or
/// going to the background without millisecond accuracy.
///
/// Construct one instance at the process entry point and inject clones
/// (cloning is cheap) into whatever needs to observe or feed it; there is no
/// global singleton.
#[derive(Clone)]
pub struct ProcessAggregator {
    inner: Rc<AggregatorInner>,
}

impl ProcessAggregator {
    /// Creates the aggregator and drives the process registry to
    /// [`State::Created`].
    #[must_use]
    pub fn new(cfg: AggregatorConfig) -> Self {
        let registry = LifecycleRegistry::new(cfg.owner_name.clone());
        let inner = Rc::new(AggregatorInner {
            cfg,
            registry,
            started: Cell::new(0),
            resumed: Cell::new(0),
            pause_sent: Cell::new(true),
            stop_sent: Cell::new(true),
            clock: StartupClock::new(),
            pause_timer: RefCell::new(None),
        });

        let bridge = Rc::new(AppEventBridge::new(Rc::downgrade(&inner)));
        inner
            .registry
            .add_observer(bridge)
            .expect("bridge bindings are statically conflict-free");
        inner.registry.handle_lifecycle_event(Event::Create);
        Self { inner }
    }

    /// The process registry driven by this aggregator.
    #[must_use]
    pub fn registry(&self) -> &LifecycleRegistry {
        &self.inner.registry
    }

    /// The process owner's handle.
    #[must_use]
    pub fn owner(&self) -> &OwnerRef {
        self.inner.registry.owner()
    }

    /// Current state of the process lifecycle.
    #[must_use]
    pub fn state(&self) -> State {
        self.inner.registry.state()
    }

    /// Time from aggregator construction to the first process start, or
    /// `None` while the process has never started.
    #[must_use]
    pub fn launch_time(&self) -> Option<std::time::Duration> {
        self.inner.clock.loading_time()
    }

    /// Registers an observer on the process registry.
    ///
    /// The observer is brought up to the current process state before this
    /// returns, like any registry registration.
    ///
    /// # Errors
    /// Propagates the registry's fail-fast configuration errors.
    pub fn add_observer(&self, observer: Rc<dyn LifecycleObserver>) -> Result<(), ConfigError> {
        self.inner.registry.add_observer(observer)
    }

    /// Unregisters an observer from the process registry.
    pub fn remove_observer(&self, observer: &Rc<dyn LifecycleObserver>) {
        self.inner.registry.remove_observer(observer)
    }

    /// A child owner was created. Broadcasts `ChildCreated`; no state change.
    pub fn child_created(&self) {
        self.inner.broadcast(Event::ChildCreated);
    }

    /// A child owner was created, reporting how long its setup took.
    /// Broadcasts `ChildCreated` with the elapsed payload; no state change.
    pub fn child_created_timed(&self, load_time: std::time::Duration) {
        self.inner
            .registry
            .dispatch_event(Event::ChildCreated, &EventArgs::none().with_elapsed(load_time));
    }

    /// A child owner started. The first started child drives the process
    /// `Start` (and, once per process lifetime, the `AppLaunched` broadcast).
    pub fn child_started(&self) {
        self.inner.child_started();
    }

    /// A child owner finished its first setup. Broadcasts `ChildReady`; no
    /// state change.
    pub fn child_ready(&self) {
        self.inner.broadcast(Event::ChildReady);
    }

    /// A child owner resumed. The first resumed child drives the process
    /// `Resume`, or cancels a pending debounce timer when the pause was not
    /// committed yet.
    pub fn child_resumed(&self) {
        self.inner.child_resumed();
    }

    /// A child owner paused. When the last resumed child pauses, the
    /// debounce timer is scheduled; `ChildPaused` is broadcast immediately
    /// regardless of the timer.
    ///
    /// Requires a [`tokio::task::LocalSet`] context (see module docs).
    pub fn child_paused(&self) {
        AggregatorInner::child_paused(&self.inner);
    }

    /// A child owner stopped. Immediately re-checks the stop condition: when
    /// no child is started and the pause was already committed, the process
    /// `Stop` is driven without waiting for a timer.
    pub fn child_stopped(&self) {
        self.inner.child_stopped();
    }

    /// A child owner was destroyed. Broadcasts `ChildDestroyed`; the process
    /// lifecycle itself is never destroyed.
    pub fn child_destroyed(&self) {
        self.inner.broadcast(Event::ChildDestroyed);
    }

    #[cfg(test)]
    pub(crate) fn counters(&self) -> (i32, i32) {
        (self.inner.started.get(), self.inner.resumed.get())
    }
}

impl std::fmt::Debug for ProcessAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessAggregator")
            .field("state", &self.state())
            .field("started", &self.inner.started.get())
            .field("resumed", &self.inner.resumed.get())
            .finish()
    }
}
