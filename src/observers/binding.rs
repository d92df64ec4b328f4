//! # Explicit event-to-handler bindings.
//!
//! A [`Binding`] associates one named handler of a concrete observer type
//! with exactly one [`Event`], under one of a closed set of calling
//! conventions ([`CallKind`]), decided once at declaration time.
//!
//! A [`BindingSpec`] is the full declaration of a type: its own bindings plus
//! any reused binding sets pulled in with [`BindingSpec::include`]. Included
//! sets are merged first when the dispatch table is built, and a handler
//! identity bound to two different events anywhere in the merged set is a
//! configuration error raised eagerly at build time.
//!
//! ## Rules
//! - Handler identity is the `(name, kind)` pair; re-declaring the same
//!   identity with the same event is a harmless duplicate (first wins),
//!   with a *different* event it is [`ConfigError::ConflictingBinding`].
//! - Handlers are plain `fn` pointers over `&Self`: binding declarations
//!   carry no state of their own, observer state lives behind `&self`.
//! - Binding a handler to [`Event::Any`] subscribes it to every event.
//!
//! [`ConfigError::ConflictingBinding`]: crate::ConfigError::ConflictingBinding
//!
//! ## Example
//! ```
//! use lifevisor::{Binding, BindingSpec, Event};
//!
//! struct Tracker;
//!
//! impl Tracker {
//!     fn shown(&self) {}
//!     fn hidden(&self) {}
//! }
//!
//! let spec = BindingSpec::new()
//!     .bind(Binding::no_args::<Tracker>("shown", Event::Start, Tracker::shown))
//!     .bind(Binding::no_args::<Tracker>("hidden", Event::Stop, Tracker::hidden));
//! assert!(!spec.is_empty());
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::model::{Event, EventArgs};
use crate::registry::OwnerRef;

/// Calling convention of a bound handler, decided at declaration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    /// `fn(&T)` — no arguments beyond the receiver.
    NoArgs,
    /// `fn(&T, &OwnerRef)` — receives the dispatching owner.
    WithOwner,
    /// `fn(&T, &OwnerRef, Event)` — receives the owner and the concrete
    /// event; the usual shape for [`Event::Any`] subscriptions.
    WithOwnerAndEvent,
    /// `fn(&T, &EventArgs)` — payload passthrough, used by broadcasts that
    /// carry arguments (e.g. [`Event::AppLaunched`]).
    WithArgs,
}

/// Type-erased invoker stored in a dispatch table.
///
/// Receives the observer as `&dyn Any` and downcasts to the concrete type the
/// binding was declared for; a mismatch (a spec included into a foreign type)
/// is logged and skipped, never propagated.
pub(crate) type ErasedHandler = Arc<dyn Fn(&dyn Any, &OwnerRef, Event, &EventArgs) + Send + Sync>;

/// One declared handler: identity, bound event, convention, and invoker.
#[derive(Clone)]
pub struct Binding {
    pub(crate) name: &'static str,
    pub(crate) event: Event,
    pub(crate) kind: CallKind,
    pub(crate) invoke: ErasedHandler,
}

impl Binding {
    fn erased<T: 'static>(
        name: &'static str,
        event: Event,
        kind: CallKind,
        call: impl Fn(&T, &OwnerRef, Event, &EventArgs) + Send + Sync + 'static,
    ) -> Self {
        let invoke: ErasedHandler = Arc::new(move |any, owner, ev, args| match any.downcast_ref::<T>() {
            Some(target) => call(target, owner, ev, args),
            None => tracing::warn!(
                handler = name,
                expected = std::any::type_name::<T>(),
                "binding target type mismatch; handler skipped"
            ),
        });
        Self {
            name,
            event,
            kind,
            invoke,
        }
    }

    /// Binds a no-argument handler.
    #[must_use]
    pub fn no_args<T: 'static>(name: &'static str, event: Event, f: fn(&T)) -> Self {
        Self::erased::<T>(name, event, CallKind::NoArgs, move |t, _, _, _| f(t))
    }

    /// Binds a handler receiving the dispatching owner.
    #[must_use]
    pub fn with_owner<T: 'static>(name: &'static str, event: Event, f: fn(&T, &OwnerRef)) -> Self {
        Self::erased::<T>(name, event, CallKind::WithOwner, move |t, o, _, _| f(t, o))
    }

    /// Binds a handler receiving the owner and the concrete event.
    #[must_use]
    pub fn with_owner_and_event<T: 'static>(
        name: &'static str,
        event: Event,
        f: fn(&T, &OwnerRef, Event),
    ) -> Self {
        Self::erased::<T>(name, event, CallKind::WithOwnerAndEvent, move |t, o, e, _| {
            f(t, o, e)
        })
    }

    /// Binds a payload-passthrough handler.
    #[must_use]
    pub fn with_args<T: 'static>(
        name: &'static str,
        event: Event,
        f: fn(&T, &EventArgs),
    ) -> Self {
        Self::erased::<T>(name, event, CallKind::WithArgs, move |t, _, _, a| f(t, a))
    }

    /// The handler's declared name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The event this handler is bound to.
    #[inline]
    #[must_use]
    pub fn event(&self) -> Event {
        self.event
    }

    /// The handler's calling convention.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> CallKind {
        self.kind
    }
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.name)
            .field("event", &self.event)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A type's full binding declaration: reused sets plus its own bindings.
///
/// Merge order mirrors declaration order: included specs first (recursively),
/// then the type's own bindings. Within one event, handlers keep their
/// declaration order in the built table and are invoked in reverse of it.
#[derive(Debug, Clone, Default)]
pub struct BindingSpec {
    pub(crate) includes: Vec<BindingSpec>,
    pub(crate) bindings: Vec<Binding>,
}

impl BindingSpec {
    /// An empty declaration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one binding.
    #[must_use]
    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Merges in a reusable binding set (a "mixin").
    #[must_use]
    pub fn include(mut self, spec: BindingSpec) -> Self {
        self.includes.push(spec);
        self
    }

    /// Whether the declaration, including everything it pulls in, is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty() && self.includes.iter().all(BindingSpec::is_empty)
    }
}
