//! # Observer registration surface and declared capabilities.
//!
//! Any value can be registered against a registry; what it receives is
//! decided by the capabilities its type *declares*, not by a required base
//! type. A type opts into a capability by overriding the matching default on
//! [`LifecycleObserver`]:
//!
//! | Capability | Override | Receives |
//! |------------|----------|----------|
//! | Structured | [`as_full`](LifecycleObserver::as_full) | one typed method per transition (`on_create`, `on_start`, ...) |
//! | Raw events | [`as_event`](LifecycleObserver::as_event) | every dispatch as `(owner, event, args)` |
//! | Pre-built adapters | [`adapters`](LifecycleObserver::adapters) | adapter-mediated calls with cross-adapter de-duplication |
//! | Binding table | [`bindings`](LifecycleObserver::bindings) | the handlers it explicitly bound per event |
//!
//! ## Rules
//! - A type may declare several capabilities at once; the resolver picks the
//!   dispatch strategy and guarantees each handler fires exactly once per
//!   event per dispatch.
//! - When both the structured and the raw capability are declared, the
//!   structured methods are invoked first, then the raw callback, for every
//!   event.
//! - Declaring no capability at all is valid; such an observer is a no-op.
//!
//! ## Example
//! ```
//! use lifevisor::{EventObserver, Event, EventArgs, LifecycleObserver, OwnerRef};
//!
//! struct Audit;
//!
//! impl EventObserver for Audit {
//!     fn on_event(&self, owner: &OwnerRef, event: Event, _args: &EventArgs) {
//!         println!("{}: {event:?}", owner.name());
//!     }
//! }
//!
//! impl LifecycleObserver for Audit {
//!     fn as_event(&self) -> Option<&dyn EventObserver> {
//!         Some(self)
//!     }
//! }
//! ```

use std::any::Any;
use std::rc::Rc;

use crate::model::{Event, EventArgs};
use crate::registry::OwnerRef;

use super::adapter::PrebuiltAdapter;
use super::binding::BindingSpec;

/// Structured lifecycle capability: one method per transition event.
///
/// All methods default to no-ops, so an implementor only overrides the
/// transitions it cares about.
pub trait FullObserver {
    /// Notifies that `Create` occurred.
    fn on_create(&self, owner: &OwnerRef) {
        let _ = owner;
    }

    /// Notifies that `Start` occurred.
    fn on_start(&self, owner: &OwnerRef) {
        let _ = owner;
    }

    /// Notifies that `Resume` occurred.
    fn on_resume(&self, owner: &OwnerRef) {
        let _ = owner;
    }

    /// Notifies that `Pause` occurred.
    fn on_pause(&self, owner: &OwnerRef) {
        let _ = owner;
    }

    /// Notifies that `Stop` occurred.
    fn on_stop(&self, owner: &OwnerRef) {
        let _ = owner;
    }

    /// Notifies that `Destroy` occurred.
    fn on_destroy(&self, owner: &OwnerRef) {
        let _ = owner;
    }
}

/// Raw event capability: receives every dispatch, transitions and broadcasts
/// alike, without changing shape per event.
pub trait EventObserver {
    /// Called for every event dispatched to this observer.
    ///
    /// `args` is empty for transition events and may carry a payload for
    /// broadcasts (see [`EventArgs`]).
    fn on_event(&self, owner: &OwnerRef, event: Event, args: &EventArgs);
}

/// Registration surface for lifecycle observers.
///
/// Every default is a "not declared" answer; override the ones that apply.
/// The dispatch strategy for a type is resolved once per concrete type and
/// memoized process-wide, so the expensive part (building a
/// [`DispatchTable`](crate::DispatchTable) out of [`bindings`]) runs at most
/// once per type no matter how many instances are observed.
///
/// [`bindings`]: LifecycleObserver::bindings
pub trait LifecycleObserver: Any {
    /// Declares the structured capability by returning `Some(self)`.
    fn as_full(&self) -> Option<&dyn FullObserver> {
        None
    }

    /// Declares the raw event capability by returning `Some(self)`.
    fn as_event(&self) -> Option<&dyn EventObserver> {
        None
    }

    /// Declares pre-built adapters for this instance.
    ///
    /// Adapters are the no-introspection fast path: each one knows statically
    /// which handlers respond to which event. When several adapters apply,
    /// they are composed and de-duplicated per dispatch via
    /// [`CallTracker`](crate::CallTracker).
    fn adapters(&self) -> Vec<Rc<dyn PrebuiltAdapter>> {
        Vec::new()
    }

    /// Declares the explicit binding table for this type.
    ///
    /// Consulted only when no other capability applies; evaluated at most
    /// once per concrete type, after which the built table is cached
    /// process-wide.
    fn bindings(&self) -> BindingSpec {
        BindingSpec::new()
    }

    /// Display name of the concrete type, used in logs and build errors.
    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
