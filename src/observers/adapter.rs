//! Pre-built dispatch adapters.
//!
//! An adapter is the no-introspection fast path: it knows statically which of
//! its observer's handlers respond to which event, so dispatch needs neither
//! a capability probe nor a binding table. A type declares its adapters via
//! [`LifecycleObserver::adapters`](super::observer::LifecycleObserver::adapters);
//! when several apply they are composed, and a shared [`CallTracker`] keeps a
//! handler reachable through two adapters from firing twice for one event.

use crate::model::{Event, EventArgs};
use crate::registry::OwnerRef;

use super::tracker::CallTracker;

/// A statically known event-to-handler mapping for one observer instance.
///
/// Dispatch calls [`call_handlers`](Self::call_handlers) twice per event:
/// first with `on_any = false` for the event-specific handlers, then with
/// `on_any = true` for the wildcard handlers. With multiple composed
/// adapters, the plain pass runs over *all* adapters before the `Any` pass
/// starts, and every call must be approved through the shared tracker when
/// one is supplied.
pub trait PrebuiltAdapter {
    /// Invokes the handlers matching `event` for the requested pass.
    ///
    /// Implementations should ask `tracker.approve(name, pass)` before each
    /// handler call when a tracker is present, and skip the call when the
    /// answer is `false`.
    fn call_handlers(
        &self,
        owner: &OwnerRef,
        event: Event,
        on_any: bool,
        tracker: Option<&mut CallTracker>,
        args: &EventArgs,
    );
}
