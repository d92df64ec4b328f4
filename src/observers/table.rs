//! # Built dispatch tables: event → ordered handler list.
//!
//! A [`DispatchTable`] is the immutable, per-type result of merging a
//! [`BindingSpec`](super::binding::BindingSpec): included sets first
//! (recursively), then the type's own bindings, with conflict detection on
//! handler identity. Tables are built at most once per concrete type and
//! cached process-wide (see [`cache`](super::cache)).
//!
//! ## Invocation
//! ```text
//! invoke(target, owner, event, args)
//!     ├─► handlers bound to `event`   (reverse declaration order)
//!     └─► handlers bound to `Any`     (reverse declaration order)
//! ```
//!
//! ## Rules
//! - Absent entries are a no-op, never an error.
//! - Every handler call is panic-guarded: a panicking handler is logged and
//!   the remaining handlers still fire.
//! - Tables are never invalidated; types are immutable within a process
//!   lifetime.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use crate::error::ConfigError;
use crate::model::{Event, EventArgs};
use crate::registry::OwnerRef;

use super::binding::{Binding, BindingSpec, CallKind, ErasedHandler};

/// Runs one observer handler, swallowing a panic so the fan-out continues.
///
/// This is the isolation boundary of the runtime: one failing observer must
/// never prevent the remaining observers from receiving the same event.
pub(crate) fn guarded(owner: &OwnerRef, event: Event, handler: &str, f: impl FnOnce()) {
    if std::panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        tracing::warn!(
            owner = owner.name(),
            ?event,
            handler,
            "observer handler panicked; continuing fan-out"
        );
    }
}

/// Handler identity within a table: declared name plus calling convention.
type HandlerId = (&'static str, CallKind);

struct HandlerEntry {
    name: &'static str,
    kind: CallKind,
    invoke: ErasedHandler,
}

/// Immutable per-type mapping from event to ordered handler list.
pub struct DispatchTable {
    by_event: HashMap<Event, Vec<HandlerEntry>>,
    handler_count: usize,
}

impl DispatchTable {
    /// Builds a table from a merged binding declaration.
    ///
    /// Registration does this on demand (once per concrete type); building a
    /// table directly is only useful to validate a declaration eagerly.
    ///
    /// # Errors
    /// Fails fast with [`ConfigError::ConflictingBinding`] when one handler
    /// identity is bound to two different events anywhere in the merged set;
    /// re-declaring an identical `(identity, event)` pair is ignored.
    pub fn build(spec: &BindingSpec, type_name: &'static str) -> Result<Self, ConfigError> {
        let mut handler_to_event: HashMap<HandlerId, Event> = HashMap::new();
        let mut ordered: Vec<Binding> = Vec::new();
        Self::merge(spec, type_name, &mut handler_to_event, &mut ordered)?;

        let mut by_event: HashMap<Event, Vec<HandlerEntry>> = HashMap::new();
        let handler_count = ordered.len();
        for binding in ordered {
            by_event.entry(binding.event).or_default().push(HandlerEntry {
                name: binding.name,
                kind: binding.kind,
                invoke: binding.invoke,
            });
        }
        Ok(Self {
            by_event,
            handler_count,
        })
    }

    fn merge(
        spec: &BindingSpec,
        type_name: &'static str,
        handler_to_event: &mut HashMap<HandlerId, Event>,
        ordered: &mut Vec<Binding>,
    ) -> Result<(), ConfigError> {
        for included in &spec.includes {
            Self::merge(included, type_name, handler_to_event, ordered)?;
        }
        for binding in &spec.bindings {
            Self::verify_and_put(binding, type_name, handler_to_event, ordered)?;
        }
        Ok(())
    }

    fn verify_and_put(
        binding: &Binding,
        type_name: &'static str,
        handler_to_event: &mut HashMap<HandlerId, Event>,
        ordered: &mut Vec<Binding>,
    ) -> Result<(), ConfigError> {
        let id: HandlerId = (binding.name, binding.kind);
        match handler_to_event.get(&id) {
            Some(&previous) if previous != binding.event => Err(ConfigError::ConflictingBinding {
                type_name,
                handler: binding.name,
                previous,
                requested: binding.event,
            }),
            Some(_) => Ok(()), // identical re-declaration, first wins
            None => {
                handler_to_event.insert(id, binding.event);
                ordered.push(binding.clone());
                Ok(())
            }
        }
    }

    /// Invokes the handlers for `event`, then the `Any` handlers, each list
    /// in reverse declaration order. Unknown events are a no-op.
    pub(crate) fn invoke(
        &self,
        target: &dyn Any,
        owner: &OwnerRef,
        event: Event,
        args: &EventArgs,
    ) {
        self.invoke_list(self.by_event.get(&event), target, owner, event, args);
        self.invoke_list(self.by_event.get(&Event::Any), target, owner, event, args);
    }

    fn invoke_list(
        &self,
        handlers: Option<&Vec<HandlerEntry>>,
        target: &dyn Any,
        owner: &OwnerRef,
        event: Event,
        args: &EventArgs,
    ) {
        let Some(handlers) = handlers else { return };
        for entry in handlers.iter().rev() {
            guarded(owner, event, entry.name, || {
                (entry.invoke)(target, owner, event, args);
            });
        }
    }

    /// Total number of distinct handlers in the table.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.handler_count
    }

    /// Whether the table holds no handlers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handler_count == 0
    }
}

impl std::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("handlers", &self.handler_count)
            .field("events", &self.by_event.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::super::binding::{Binding, BindingSpec};
    use super::*;
    use crate::model::State;
    use crate::LifecycleRegistry;

    thread_local! {
        static CALLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    }

    fn record(tag: &'static str) {
        CALLS.with(|c| c.borrow_mut().push(tag));
    }

    fn drain() -> Vec<&'static str> {
        CALLS.with(|c| c.borrow_mut().drain(..).collect())
    }

    struct Widget;

    impl Widget {
        fn first(&self) {
            record("first");
        }
        fn second(&self) {
            record("second");
        }
        fn any(&self) {
            record("any");
        }
        fn boom(&self) {
            panic!("boom");
        }
    }

    fn probe_owner() -> OwnerRef {
        LifecycleRegistry::new("probe").owner().clone()
    }

    #[test]
    fn test_specific_handlers_run_in_reverse_order_then_any() {
        let spec = BindingSpec::new()
            .bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first))
            .bind(Binding::no_args::<Widget>("second", Event::Start, Widget::second))
            .bind(Binding::no_args::<Widget>("any", Event::Any, Widget::any));
        let table = DispatchTable::build(&spec, "Widget").unwrap();

        drain();
        table.invoke(&Widget, &probe_owner(), Event::Start, &EventArgs::none());
        assert_eq!(drain(), ["second", "first", "any"]);
    }

    #[test]
    fn test_unbound_event_is_a_no_op() {
        let spec =
            BindingSpec::new().bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first));
        let table = DispatchTable::build(&spec, "Widget").unwrap();

        drain();
        table.invoke(&Widget, &probe_owner(), Event::Stop, &EventArgs::none());
        assert_eq!(drain(), Vec::<&str>::new());
    }

    #[test]
    fn test_conflicting_binding_fails_fast() {
        let spec = BindingSpec::new()
            .bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first))
            .bind(Binding::no_args::<Widget>("first", Event::Stop, Widget::first));
        let err = DispatchTable::build(&spec, "Widget").unwrap_err();
        assert_eq!(err.as_label(), "conflicting_binding");
    }

    #[test]
    fn test_conflict_across_included_set_is_detected() {
        let base =
            BindingSpec::new().bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first));
        let spec = BindingSpec::new()
            .include(base)
            .bind(Binding::no_args::<Widget>("first", Event::Resume, Widget::first));
        assert!(DispatchTable::build(&spec, "Widget").is_err());
    }

    #[test]
    fn test_identical_redeclaration_is_deduplicated() {
        let base =
            BindingSpec::new().bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first));
        let spec = BindingSpec::new()
            .include(base)
            .bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first));
        let table = DispatchTable::build(&spec, "Widget").unwrap();
        assert_eq!(table.handler_count(), 1);

        drain();
        table.invoke(&Widget, &probe_owner(), Event::Start, &EventArgs::none());
        assert_eq!(drain(), ["first"]);
    }

    #[test]
    fn test_panicking_handler_does_not_abort_remaining_handlers() {
        let spec = BindingSpec::new()
            .bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first))
            .bind(Binding::no_args::<Widget>("boom", Event::Start, Widget::boom));
        let table = DispatchTable::build(&spec, "Widget").unwrap();

        drain();
        // "boom" runs first (reverse order) and panics; "first" must still run.
        table.invoke(&Widget, &probe_owner(), Event::Start, &EventArgs::none());
        assert_eq!(drain(), ["first"]);
    }

    #[test]
    fn test_owner_and_event_reach_typed_handlers() {
        struct Aware;
        impl Aware {
            fn seen(&self, owner: &OwnerRef, event: Event) {
                assert_eq!(owner.state(), State::Initialized);
                assert_eq!(event, Event::ChildStarted);
                record("seen");
            }
        }
        let spec = BindingSpec::new().bind(Binding::with_owner_and_event::<Aware>(
            "seen",
            Event::ChildStarted,
            Aware::seen,
        ));
        let table = DispatchTable::build(&spec, "Aware").unwrap();

        drain();
        table.invoke(&Aware, &probe_owner(), Event::ChildStarted, &EventArgs::none());
        assert_eq!(drain(), ["seen"]);
    }

    #[test]
    fn test_mismatched_target_type_is_skipped() {
        let spec =
            BindingSpec::new().bind(Binding::no_args::<Widget>("first", Event::Start, Widget::first));
        let table = DispatchTable::build(&spec, "Widget").unwrap();

        struct Other;
        drain();
        table.invoke(&Other, &probe_owner(), Event::Start, &EventArgs::none());
        assert_eq!(drain(), Vec::<&str>::new());
    }

    #[test]
    fn test_payload_passthrough_binding() {
        struct Timed;
        impl Timed {
            fn launched(&self, args: &EventArgs) {
                record("launched");
                assert!(args.elapsed.is_some());
            }
        }
        let spec = BindingSpec::new().bind(Binding::with_args::<Timed>(
            "launched",
            Event::AppLaunched,
            Timed::launched,
        ));
        let table = DispatchTable::build(&spec, "Timed").unwrap();

        drain();
        let args = EventArgs::none().with_elapsed(std::time::Duration::from_millis(42));
        table.invoke(&Timed, &probe_owner(), Event::AppLaunched, &args);
        assert_eq!(drain(), ["launched"]);
    }
}
