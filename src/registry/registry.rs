//! # Lifecycle state machine and event fan-out.
//!
//! [`LifecycleRegistry`] owns one owner's current [`State`], accepts
//! transition events from that owner, and notifies registered observers.
//!
//! ## Architecture
//! ```text
//! owner ──► handle_lifecycle_event(ev) ──► state := ev.target_state()
//!                                             │
//!                                             ▼
//!                              sync(): per-observer replay toward state
//!                                 │ (most-recently-added first)
//!                                 ▼
//!                          strategy.deliver(observer, owner, ev)
//!
//! owner ──► dispatch_event(ev, args) ──► broadcast fan-out, no state change
//! ```
//!
//! ## Rules
//! - **One owner thread**: all mutating calls on one registry must originate
//!   from the owner's designated thread; the registry does not lock.
//! - **LIFO fan-out**: observers are notified most-recently-added-first for
//!   every event.
//! - **Adjacent steps**: the state only ever moves between adjacent states;
//!   each observer receives the exact event chain for its own position, so a
//!   late observer is caught up one event at a time.
//! - **Mid-dispatch mutation**: adding or removing observers from inside a
//!   handler is safe. A just-added observer receives only its catch-up
//!   sequence; a just-removed observer receives nothing further, except that
//!   an in-progress delivery to it completes all of its handlers.
//! - **Isolation**: a panicking handler is logged and swallowed; remaining
//!   observers still receive the event.
//!
//! ## Example
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use lifevisor::{
//!     Event, EventArgs, EventObserver, LifecycleObserver, LifecycleRegistry, OwnerRef, State,
//! };
//!
//! #[derive(Default)]
//! struct Recorder {
//!     seen: RefCell<Vec<Event>>,
//! }
//!
//! impl EventObserver for Recorder {
//!     fn on_event(&self, _owner: &OwnerRef, event: Event, _args: &EventArgs) {
//!         self.seen.borrow_mut().push(event);
//!     }
//! }
//!
//! impl LifecycleObserver for Recorder {
//!     fn as_event(&self) -> Option<&dyn EventObserver> {
//!         Some(self)
//!     }
//! }
//!
//! let registry = LifecycleRegistry::new("screen");
//! registry.handle_lifecycle_event(Event::Create);
//! registry.handle_lifecycle_event(Event::Start);
//!
//! // Late registration catches up: Create then Start.
//! let recorder = Rc::new(Recorder::default());
//! registry.add_observer(recorder.clone()).unwrap();
//! assert_eq!(registry.state(), State::Started);
//! assert_eq!(recorder.seen.borrow().as_slice(), [Event::Create, Event::Start]);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::model::{Event, EventArgs, State};
use crate::observers::{resolve, LifecycleObserver, Strategy};

use super::owner::OwnerRef;

/// Observer identity: the pointer of the registered `Rc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ObserverKey(*const ());

fn key_of(observer: &Rc<dyn LifecycleObserver>) -> ObserverKey {
    ObserverKey(Rc::as_ptr(observer).cast::<()>())
}

/// One registered observer with its resolved strategy and replay position.
struct Entry {
    key: ObserverKey,
    observer: Rc<dyn LifecycleObserver>,
    strategy: Strategy,
    /// The state this observer has been brought to so far. Trails the
    /// registry state during a sync pass and during catch-up.
    state: Cell<State>,
}

/// Authoritative lifecycle state machine for one owner.
///
/// Starts in [`State::Initialized`]. See the module docs for the ordering and
/// re-entrancy contract.
pub struct LifecycleRegistry {
    owner: OwnerRef,
    state: Rc<Cell<State>>,
    entries: RefCell<Vec<Rc<Entry>>>,
    /// True while a sync pass is dispatching; nested transitions then only
    /// flip `new_event` instead of starting a second pass.
    handling: Cell<bool>,
    /// Depth of in-flight `add_observer` catch-ups.
    adding_depth: Cell<usize>,
    /// A transition arrived while dispatching; the active pass restarts.
    new_event: Cell<bool>,
}

impl LifecycleRegistry {
    /// Creates a registry for a new owner with the given display name.
    #[must_use]
    pub fn new(owner_name: impl Into<Arc<str>>) -> Self {
        let state = Rc::new(Cell::new(State::Initialized));
        let owner = OwnerRef::new(owner_name, Rc::clone(&state));
        Self {
            owner,
            state,
            entries: RefCell::new(Vec::new()),
            handling: Cell::new(false),
            adding_depth: Cell::new(0),
            new_event: Cell::new(false),
        }
    }

    /// The owner's current lifecycle state. Read-only, never blocks.
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.state.get()
    }

    /// The non-owning handle observers receive for this owner.
    #[inline]
    #[must_use]
    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    /// Number of currently registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Registers an observer, keyed by the identity of the given `Rc`.
    ///
    /// If the current state is above [`State::Initialized`], the observer is
    /// synthetically brought up to it before this call returns: `Create`,
    /// then `Start`, then `Resume`, as applicable, each delivered to this
    /// observer alone. Registering the same `Rc` twice is a no-op. Safe to
    /// call from inside a handler.
    ///
    /// # Errors
    /// Fails fast with a [`ConfigError`] when the observer type falls back to
    /// its binding table and the declaration is invalid. The observer is not
    /// registered in that case.
    pub fn add_observer(&self, observer: Rc<dyn LifecycleObserver>) -> Result<(), ConfigError> {
        let key = key_of(&observer);
        if self.contains(key) {
            return Ok(());
        }
        let strategy = resolve(&*observer)?;

        let initial = if self.state() == State::Destroyed {
            State::Destroyed
        } else {
            State::Initialized
        };
        let entry = Rc::new(Entry {
            key,
            observer,
            strategy,
            state: Cell::new(initial),
        });
        self.entries.borrow_mut().push(Rc::clone(&entry));

        // Catch-up replay toward the current state, recomputed every step so
        // that a handler-triggered transition redirects the remainder.
        self.adding_depth.set(self.adding_depth.get() + 1);
        while self.contains(key) && entry.state.get() < self.state() {
            match Event::up_from(entry.state.get()) {
                Some(event) => self.deliver(&entry, event, &EventArgs::none()),
                None => break,
            }
        }
        self.adding_depth.set(self.adding_depth.get() - 1);

        if !self.handling.get() && self.adding_depth.get() == 0 {
            self.sync();
        }
        Ok(())
    }

    /// Unregisters an observer.
    ///
    /// If called during an in-flight dispatch of event `E`: when this
    /// observer has not yet received `E` it will not receive it; when its own
    /// delivery of `E` already started, all of its handlers for `E` still
    /// fire before the removal takes effect.
    pub fn remove_observer(&self, observer: &Rc<dyn LifecycleObserver>) {
        let key = key_of(observer);
        self.entries.borrow_mut().retain(|e| e.key != key);
    }

    /// Moves the owner one lifecycle step and notifies all observers.
    ///
    /// Only component transition events are accepted; `Any` and broadcast
    /// events have no target state and are logged and ignored.
    pub fn handle_lifecycle_event(&self, event: Event) {
        let Some(next) = event.target_state() else {
            tracing::error!(
                owner = self.owner.name(),
                ?event,
                "event has no target state; ignoring"
            );
            return;
        };
        self.move_to_state(next);
    }

    /// Broadcasts a non-transition event to all observers.
    ///
    /// The current state does not change. Fan-out order and `Any`-handler
    /// inclusion match [`handle_lifecycle_event`](Self::handle_lifecycle_event).
    pub fn dispatch_event(&self, event: Event, args: &EventArgs) {
        if event.is_component() {
            tracing::error!(
                owner = self.owner.name(),
                ?event,
                "component events must go through handle_lifecycle_event; ignoring"
            );
            return;
        }
        for entry in self.snapshot() {
            if self.contains(entry.key) {
                self.deliver(&entry, event, args);
            }
        }
    }

    fn move_to_state(&self, next: State) {
        if self.state() == next {
            return;
        }
        self.state.set(next);
        if self.handling.get() || self.adding_depth.get() > 0 {
            self.new_event.set(true);
            return;
        }
        self.handling.set(true);
        self.sync();
        self.handling.set(false);
    }

    /// Replays adjacent events per observer until everyone has reached the
    /// registry state. Restarts when a nested transition arrives mid-pass.
    fn sync(&self) {
        while !self.is_synced() {
            self.new_event.set(false);
            'observers: for entry in self.snapshot() {
                while self.contains(entry.key) && entry.state.get() != self.state() {
                    let position = entry.state.get();
                    let event = if position < self.state() {
                        Event::up_from(position)
                    } else {
                        Event::down_from(position)
                    };
                    let Some(event) = event else {
                        // No event chain exists (Initialized straight down);
                        // snap the entry without dispatching.
                        entry.state.set(self.state());
                        continue;
                    };
                    self.deliver(&entry, event, &EventArgs::none());
                    if self.new_event.get() {
                        break 'observers;
                    }
                }
            }
        }
        self.new_event.set(false);
    }

    fn is_synced(&self) -> bool {
        let state = self.state();
        self.entries.borrow().iter().all(|e| e.state.get() == state)
    }

    /// Most-recently-added-first view of the current observers.
    fn snapshot(&self) -> Vec<Rc<Entry>> {
        self.entries.borrow().iter().rev().cloned().collect()
    }

    fn contains(&self, key: ObserverKey) -> bool {
        self.entries.borrow().iter().any(|e| e.key == key)
    }

    fn deliver(&self, entry: &Entry, event: Event, args: &EventArgs) {
        if let Some(target) = event.target_state() {
            entry.state.set(target);
        }
        tracing::trace!(owner = self.owner.name(), ?event, "dispatch");
        entry
            .strategy
            .deliver(&*entry.observer, &self.owner, event, args);
    }
}

impl std::fmt::Debug for LifecycleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleRegistry")
            .field("owner", &self.owner)
            .field("observers", &self.observer_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::observers::{Binding, BindingSpec, EventObserver};

    /// Records every received event, optionally under a tag into a shared log.
    struct Recorder {
        tag: &'static str,
        log: Rc<RefCell<Vec<(&'static str, Event)>>>,
    }

    impl Recorder {
        fn shared(tag: &'static str, log: &Rc<RefCell<Vec<(&'static str, Event)>>>) -> Rc<Self> {
            Rc::new(Self {
                tag,
                log: Rc::clone(log),
            })
        }

        fn events_for(
            log: &Rc<RefCell<Vec<(&'static str, Event)>>>,
            tag: &'static str,
        ) -> Vec<Event> {
            log.borrow()
                .iter()
                .filter(|(t, _)| *t == tag)
                .map(|(_, e)| *e)
                .collect()
        }
    }

    impl EventObserver for Recorder {
        fn on_event(&self, _owner: &OwnerRef, event: Event, _args: &EventArgs) {
            self.log.borrow_mut().push((self.tag, event));
        }
    }

    impl LifecycleObserver for Recorder {
        fn as_event(&self) -> Option<&dyn EventObserver> {
            Some(self)
        }
    }

    fn new_log() -> Rc<RefCell<Vec<(&'static str, Event)>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn test_late_observer_catches_up_to_every_reachable_state() {
        let cases: [(&[Event], &[Event]); 3] = [
            (&[Event::Create], &[Event::Create]),
            (&[Event::Create, Event::Start], &[Event::Create, Event::Start]),
            (
                &[Event::Create, Event::Start, Event::Resume],
                &[Event::Create, Event::Start, Event::Resume],
            ),
        ];
        for (drive, expected) in cases {
            let registry = LifecycleRegistry::new("main");
            for ev in drive {
                registry.handle_lifecycle_event(*ev);
            }
            let log = new_log();
            let obs = Recorder::shared("late", &log);
            registry.add_observer(obs).unwrap();
            assert_eq!(Recorder::events_for(&log, "late"), expected);
        }
    }

    #[test]
    fn test_catch_up_is_not_delivered_to_existing_observers() {
        let registry = LifecycleRegistry::new("main");
        registry.handle_lifecycle_event(Event::Create);

        let log = new_log();
        let first = Recorder::shared("first", &log);
        registry.add_observer(first).unwrap();
        log.borrow_mut().clear();

        let second = Recorder::shared("second", &log);
        registry.add_observer(second).unwrap();
        assert_eq!(Recorder::events_for(&log, "first"), Vec::<Event>::new());
        assert_eq!(Recorder::events_for(&log, "second"), [Event::Create]);
    }

    #[test]
    fn test_observers_are_notified_most_recently_added_first() {
        let registry = LifecycleRegistry::new("main");
        let log = new_log();
        registry.add_observer(Recorder::shared("outer", &log)).unwrap();
        registry.add_observer(Recorder::shared("inner", &log)).unwrap();

        registry.handle_lifecycle_event(Event::Create);
        assert_eq!(
            log.borrow().as_slice(),
            [("inner", Event::Create), ("outer", Event::Create)]
        );
    }

    #[test]
    fn test_full_cycle_reaches_destroyed() {
        let registry = LifecycleRegistry::new("main");
        let log = new_log();
        registry.add_observer(Recorder::shared("obs", &log)).unwrap();

        for ev in [
            Event::Create,
            Event::Start,
            Event::Resume,
            Event::Pause,
            Event::Stop,
            Event::Destroy,
        ] {
            registry.handle_lifecycle_event(ev);
        }
        assert_eq!(registry.state(), State::Destroyed);
        assert_eq!(
            Recorder::events_for(&log, "obs"),
            [
                Event::Create,
                Event::Start,
                Event::Resume,
                Event::Pause,
                Event::Stop,
                Event::Destroy,
            ]
        );
    }

    #[test]
    fn test_duplicate_add_is_a_no_op() {
        let registry = LifecycleRegistry::new("main");
        registry.handle_lifecycle_event(Event::Create);

        let log = new_log();
        let obs = Recorder::shared("obs", &log);
        registry.add_observer(obs.clone()).unwrap();
        registry.add_observer(obs.clone()).unwrap();
        assert_eq!(registry.observer_count(), 1);
        // Catch-up ran once, not twice.
        assert_eq!(Recorder::events_for(&log, "obs"), [Event::Create]);
    }

    #[test]
    fn test_observer_added_to_destroyed_registry_receives_nothing() {
        let registry = LifecycleRegistry::new("main");
        registry.handle_lifecycle_event(Event::Create);
        registry.handle_lifecycle_event(Event::Destroy);

        let log = new_log();
        registry.add_observer(Recorder::shared("obs", &log)).unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_dispatch_event_does_not_change_state() {
        let registry = LifecycleRegistry::new("main");
        registry.handle_lifecycle_event(Event::Create);
        let log = new_log();
        registry.add_observer(Recorder::shared("obs", &log)).unwrap();
        log.borrow_mut().clear();

        registry.dispatch_event(Event::ChildStarted, &EventArgs::none());
        assert_eq!(registry.state(), State::Created);
        assert_eq!(Recorder::events_for(&log, "obs"), [Event::ChildStarted]);
    }

    #[test]
    fn test_component_event_through_dispatch_event_is_ignored() {
        let registry = LifecycleRegistry::new("main");
        let log = new_log();
        registry.add_observer(Recorder::shared("obs", &log)).unwrap();

        registry.dispatch_event(Event::Create, &EventArgs::none());
        assert_eq!(registry.state(), State::Initialized);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_wildcard_through_handle_lifecycle_event_is_ignored() {
        let registry = LifecycleRegistry::new("main");
        registry.handle_lifecycle_event(Event::Any);
        assert_eq!(registry.state(), State::Initialized);
    }

    /// Removes a victim observer from inside its own handler's sibling.
    struct Remover {
        registry: Rc<LifecycleRegistry>,
        victim: RefCell<Option<Rc<dyn LifecycleObserver>>>,
        log: Rc<RefCell<Vec<(&'static str, Event)>>>,
    }

    impl EventObserver for Remover {
        fn on_event(&self, _owner: &OwnerRef, event: Event, _args: &EventArgs) {
            self.log.borrow_mut().push(("remover", event));
            if let Some(victim) = self.victim.borrow_mut().take() {
                self.registry.remove_observer(&victim);
            }
        }
    }

    impl LifecycleObserver for Remover {
        fn as_event(&self) -> Option<&dyn EventObserver> {
            Some(self)
        }
    }

    #[test]
    fn test_observer_removed_mid_dispatch_does_not_receive_the_event() {
        let registry = Rc::new(LifecycleRegistry::new("main"));
        let log = new_log();

        // "victim" is added first, so the later-added remover fires first.
        let victim: Rc<dyn LifecycleObserver> = Recorder::shared("victim", &log);
        registry.add_observer(victim.clone()).unwrap();

        let remover = Rc::new(Remover {
            registry: Rc::clone(&registry),
            victim: RefCell::new(Some(victim)),
            log: Rc::clone(&log),
        });
        registry.add_observer(remover).unwrap();

        registry.handle_lifecycle_event(Event::Create);
        assert_eq!(Recorder::events_for(&log, "victim"), Vec::<Event>::new());
        assert_eq!(Recorder::events_for(&log, "remover"), [Event::Create]);
        assert_eq!(registry.observer_count(), 1);
    }

    /// Table observer whose first-invoked handler removes itself.
    struct SelfRemover {
        registry: Rc<LifecycleRegistry>,
        me: RefCell<Option<Rc<dyn LifecycleObserver>>>,
        log: Rc<RefCell<Vec<(&'static str, Event)>>>,
    }

    impl SelfRemover {
        fn keeps_firing(&self) {
            self.log.borrow_mut().push(("keeps_firing", Event::Start));
        }

        fn removes_self(&self) {
            self.log.borrow_mut().push(("removes_self", Event::Start));
            if let Some(me) = self.me.borrow_mut().take() {
                self.registry.remove_observer(&me);
            }
        }
    }

    impl LifecycleObserver for SelfRemover {
        fn bindings(&self) -> BindingSpec {
            // Reverse invocation order: `removes_self` (declared last) fires
            // first, then `keeps_firing` must still fire.
            BindingSpec::new()
                .bind(Binding::no_args::<SelfRemover>(
                    "keeps_firing",
                    Event::Start,
                    SelfRemover::keeps_firing,
                ))
                .bind(Binding::no_args::<SelfRemover>(
                    "removes_self",
                    Event::Start,
                    SelfRemover::removes_self,
                ))
        }
    }

    #[test]
    fn test_started_delivery_completes_all_handlers_despite_removal() {
        let registry = Rc::new(LifecycleRegistry::new("main"));
        registry.handle_lifecycle_event(Event::Create);

        let log = new_log();
        let obs = Rc::new(SelfRemover {
            registry: Rc::clone(&registry),
            me: RefCell::new(None),
            log: Rc::clone(&log),
        });
        *obs.me.borrow_mut() = Some(obs.clone() as Rc<dyn LifecycleObserver>);
        registry.add_observer(obs.clone()).unwrap();

        registry.handle_lifecycle_event(Event::Start);
        assert_eq!(
            log.borrow().as_slice(),
            [("removes_self", Event::Start), ("keeps_firing", Event::Start)]
        );
        assert_eq!(registry.observer_count(), 0);

        // Fully removed: later transitions are not delivered.
        log.borrow_mut().clear();
        registry.handle_lifecycle_event(Event::Resume);
        assert!(log.borrow().is_empty());
    }

    /// Adds another observer from inside a handler.
    struct Adder {
        registry: Rc<LifecycleRegistry>,
        to_add: RefCell<Option<Rc<dyn LifecycleObserver>>>,
        log: Rc<RefCell<Vec<(&'static str, Event)>>>,
    }

    impl EventObserver for Adder {
        fn on_event(&self, _owner: &OwnerRef, event: Event, _args: &EventArgs) {
            self.log.borrow_mut().push(("adder", event));
            if event == Event::Start {
                if let Some(obs) = self.to_add.borrow_mut().take() {
                    self.registry.add_observer(obs).unwrap();
                }
            }
        }
    }

    impl LifecycleObserver for Adder {
        fn as_event(&self) -> Option<&dyn EventObserver> {
            Some(self)
        }
    }

    #[test]
    fn test_observer_added_mid_dispatch_receives_exactly_the_catch_up() {
        let registry = Rc::new(LifecycleRegistry::new("main"));
        registry.handle_lifecycle_event(Event::Create);

        let log = new_log();
        let newcomer: Rc<dyn LifecycleObserver> = Recorder::shared("newcomer", &log);
        let adder = Rc::new(Adder {
            registry: Rc::clone(&registry),
            to_add: RefCell::new(Some(newcomer)),
            log: Rc::clone(&log),
        });
        registry.add_observer(adder).unwrap();
        log.borrow_mut().clear();

        registry.handle_lifecycle_event(Event::Start);
        // The newcomer is caught up to Started during the in-flight dispatch
        // and receives each event exactly once.
        assert_eq!(
            Recorder::events_for(&log, "newcomer"),
            [Event::Create, Event::Start]
        );
        registry.handle_lifecycle_event(Event::Resume);
        assert_eq!(
            Recorder::events_for(&log, "newcomer"),
            [Event::Create, Event::Start, Event::Resume]
        );
    }

    struct Panicker;

    impl EventObserver for Panicker {
        fn on_event(&self, _owner: &OwnerRef, _event: Event, _args: &EventArgs) {
            panic!("observer failure");
        }
    }

    impl LifecycleObserver for Panicker {
        fn as_event(&self) -> Option<&dyn EventObserver> {
            Some(self)
        }
    }

    #[test]
    fn test_panicking_observer_does_not_stop_the_fan_out() {
        let registry = LifecycleRegistry::new("main");
        let log = new_log();
        registry.add_observer(Recorder::shared("survivor", &log)).unwrap();
        // Added last, so the panicker fires before the survivor.
        registry.add_observer(Rc::new(Panicker)).unwrap();

        registry.handle_lifecycle_event(Event::Create);
        assert_eq!(Recorder::events_for(&log, "survivor"), [Event::Create]);
    }

    /// Escalates `Start` to `Resume` from inside the handler.
    struct Escalator {
        registry: RefCell<Option<Rc<LifecycleRegistry>>>,
        log: Rc<RefCell<Vec<(&'static str, Event)>>>,
    }

    impl EventObserver for Escalator {
        fn on_event(&self, _owner: &OwnerRef, event: Event, _args: &EventArgs) {
            self.log.borrow_mut().push(("escalator", event));
            if event == Event::Start {
                if let Some(registry) = self.registry.borrow().as_ref() {
                    registry.handle_lifecycle_event(Event::Resume);
                }
            }
        }
    }

    impl LifecycleObserver for Escalator {
        fn as_event(&self) -> Option<&dyn EventObserver> {
            Some(self)
        }
    }

    #[test]
    fn test_nested_transition_from_handler_completes_the_sync() {
        let registry = Rc::new(LifecycleRegistry::new("main"));
        registry.handle_lifecycle_event(Event::Create);

        let log = new_log();
        let escalator = Rc::new(Escalator {
            registry: RefCell::new(Some(Rc::clone(&registry))),
            log: Rc::clone(&log),
        });
        registry.add_observer(escalator).unwrap();

        registry.handle_lifecycle_event(Event::Start);
        assert_eq!(registry.state(), State::Resumed);
        assert_eq!(
            Recorder::events_for(&log, "escalator"),
            [Event::Create, Event::Start, Event::Resume]
        );
    }
}
