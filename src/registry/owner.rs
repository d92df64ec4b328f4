//! # Non-owning owner handles.
//!
//! The runtime never allocates or destroys the owners it tracks (screens, the
//! process, ...). Observers are handed an [`OwnerRef`] instead: a cheap handle
//! carrying a stable [`OwnerId`], a display name for logs, and a shared view
//! of the owner's current [`State`].
//!
//! ## Rules
//! - An `OwnerRef` never keeps an owner alive; it is an index, not a pointer.
//! - The state view is shared with the owner's registry, so
//!   [`OwnerRef::state`] always reflects the authoritative current state,
//!   including mid-dispatch.
//! - Cloning is cheap; handlers may stash a clone to observe multiple owners.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use crate::model::State;

/// Global counter for owner identities.
static OWNER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Stable identity of one tracked owner, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerId(u64);

impl OwnerId {
    /// Allocates the next identity.
    pub(crate) fn next() -> Self {
        OwnerId(OWNER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value, for logs and diagnostics.
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Non-owning handle to an owner and a live view of its lifecycle state.
///
/// Handlers receive a reference to the dispatching owner's handle with every
/// invocation; the handle can also be cloned out of the registry via
/// [`LifecycleRegistry::owner`](crate::LifecycleRegistry::owner).
#[derive(Clone)]
pub struct OwnerRef {
    id: OwnerId,
    name: Arc<str>,
    state: Rc<Cell<State>>,
}

impl OwnerRef {
    /// Creates a handle with a fresh identity. The returned state cell is
    /// shared with the registry that drives this owner.
    pub(crate) fn new(name: impl Into<Arc<str>>, state: Rc<Cell<State>>) -> Self {
        Self {
            id: OwnerId::next(),
            name: name.into(),
            state,
        }
    }

    /// The owner's stable identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// The owner's display name, used in logs.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owner's current lifecycle state. Read-only, never blocks.
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.state.get()
    }
}

impl std::fmt::Debug for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnerRef")
            .field("id", &self.id.value())
            .field("name", &self.name)
            .field("state", &self.state.get())
            .finish()
    }
}
