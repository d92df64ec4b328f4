//! # Dispatch strategy resolution.
//!
//! Given a registered observer, pick the cheapest way to deliver events to
//! it. The decision is made once per concrete type and memoized in the
//! process-wide [`DispatchCache`]; per instance, only the cheap capability
//! probes run again.
//!
//! ## Decision order
//! ```text
//! as_full() + as_event()  ─► structured calls first, then the raw callback
//! as_full() only          ─► structured calls
//! as_event() only         ─► raw callback
//! adapters() non-empty    ─► single adapter, or composite + CallTracker
//! otherwise               ─► cached binding table (possibly empty ⇒ no-op)
//! ```
//!
//! ## Rules
//! - Resolution is idempotent: two resolutions of the same type return
//!   behaviorally identical strategies backed by the same cached table.
//! - Every handler call is panic-guarded; a failing observer never stops the
//!   fan-out (see [`guarded`]).

use std::any::Any;
use std::rc::Rc;

use crate::error::ConfigError;
use crate::model::{Event, EventArgs};
use crate::registry::OwnerRef;

use super::adapter::PrebuiltAdapter;
use super::cache::DispatchCache;
use super::observer::{FullObserver, LifecycleObserver};
use super::table::{guarded, DispatchTable};
use super::tracker::CallTracker;

/// Memoized classification of a concrete observer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StrategyKind {
    /// Both capabilities declared: structured calls first, then raw.
    FullAndEvent,
    /// Only the structured capability.
    FullOnly,
    /// Only the raw event capability.
    EventOnly,
    /// Pre-built adapters declared.
    Prebuilt,
    /// Fall back to the explicit binding table.
    Table,
}

/// Resolved dispatch strategy for one registered observer instance.
pub(crate) enum Strategy {
    Capability { full: bool, raw: bool },
    Prebuilt(Vec<Rc<dyn PrebuiltAdapter>>),
    Table(std::sync::Arc<DispatchTable>),
}

/// Resolves the strategy for `observer`, classifying its type on first use.
///
/// Fails fast with a [`ConfigError`] when the type falls back to the binding
/// table and its declaration is invalid.
pub(crate) fn resolve(observer: &dyn LifecycleObserver) -> Result<Strategy, ConfigError> {
    let any: &dyn Any = observer;
    let type_id = any.type_id();
    let kind = DispatchCache::strategy_kind(type_id, || classify(observer));

    match kind {
        StrategyKind::FullAndEvent => Ok(Strategy::Capability {
            full: true,
            raw: true,
        }),
        StrategyKind::FullOnly => Ok(Strategy::Capability {
            full: true,
            raw: false,
        }),
        StrategyKind::EventOnly => Ok(Strategy::Capability {
            full: false,
            raw: true,
        }),
        StrategyKind::Prebuilt => Ok(Strategy::Prebuilt(observer.adapters())),
        StrategyKind::Table => {
            let table =
                DispatchCache::table_for(type_id, observer.type_label(), || observer.bindings())?;
            Ok(Strategy::Table(table))
        }
    }
}

fn classify(observer: &dyn LifecycleObserver) -> StrategyKind {
    let full = observer.as_full().is_some();
    let raw = observer.as_event().is_some();
    match (full, raw) {
        (true, true) => StrategyKind::FullAndEvent,
        (true, false) => StrategyKind::FullOnly,
        (false, true) => StrategyKind::EventOnly,
        (false, false) if !observer.adapters().is_empty() => StrategyKind::Prebuilt,
        (false, false) => StrategyKind::Table,
    }
}

impl Strategy {
    /// Delivers one event to `observer` under this strategy.
    pub(crate) fn deliver(
        &self,
        observer: &dyn LifecycleObserver,
        owner: &OwnerRef,
        event: Event,
        args: &EventArgs,
    ) {
        match self {
            Strategy::Capability { full, raw } => {
                if *full {
                    if let Some(structured) = observer.as_full() {
                        deliver_structured(structured, owner, event);
                    }
                }
                if *raw {
                    if let Some(observer) = observer.as_event() {
                        guarded(owner, event, "on_event", || {
                            observer.on_event(owner, event, args);
                        });
                    }
                }
            }
            Strategy::Prebuilt(adapters) => {
                if let [adapter] = adapters.as_slice() {
                    guarded(owner, event, "adapter", || {
                        adapter.call_handlers(owner, event, false, None, args);
                    });
                    guarded(owner, event, "adapter", || {
                        adapter.call_handlers(owner, event, true, None, args);
                    });
                } else {
                    let mut tracker = CallTracker::new();
                    for adapter in adapters {
                        guarded(owner, event, "adapter", || {
                            adapter.call_handlers(owner, event, false, Some(&mut tracker), args);
                        });
                    }
                    for adapter in adapters {
                        guarded(owner, event, "adapter", || {
                            adapter.call_handlers(owner, event, true, Some(&mut tracker), args);
                        });
                    }
                }
            }
            Strategy::Table(table) => {
                let any: &dyn Any = observer;
                table.invoke(any, owner, event, args);
            }
        }
    }
}

fn deliver_structured(observer: &dyn FullObserver, owner: &OwnerRef, event: Event) {
    match event {
        Event::Create => guarded(owner, event, "on_create", || observer.on_create(owner)),
        Event::Start => guarded(owner, event, "on_start", || observer.on_start(owner)),
        Event::Resume => guarded(owner, event, "on_resume", || observer.on_resume(owner)),
        Event::Pause => guarded(owner, event, "on_pause", || observer.on_pause(owner)),
        Event::Stop => guarded(owner, event, "on_stop", || observer.on_stop(owner)),
        Event::Destroy => guarded(owner, event, "on_destroy", || observer.on_destroy(owner)),
        // Broadcasts have no structured shape; only the raw capability or a
        // binding table can observe them.
        _ => {}
    }
}
