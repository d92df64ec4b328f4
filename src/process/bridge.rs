//! # Application event mirror.
//!
//! [`AppEventBridge`] is an internal observer the aggregator installs on its
//! own registry. It mirrors every process transition as the matching `App*`
//! broadcast, so observers interested in "the application went X" subscribe
//! to broadcasts instead of transitions:
//!
//! ```text
//! Create  ─► AppCreated
//! Start   ─► AppLaunched (first time only) + AppStarted
//! Resume  ─► AppResumed
//! Pause   ─► AppPaused
//! Stop    ─► AppStopped
//! Destroy ─► AppDestroyed
//! ```
//!
//! The bridge declares its handlers through the binding-table path, so the
//! table machinery is exercised by the crate's own plumbing.

use std::rc::Weak;

use crate::model::Event;
use crate::observers::{Binding, BindingSpec, LifecycleObserver};

use super::aggregator::AggregatorInner;

/// Mirrors process transitions as application broadcasts.
pub(crate) struct AppEventBridge {
    inner: Weak<AggregatorInner>,
}

impl AppEventBridge {
    pub(crate) fn new(inner: Weak<AggregatorInner>) -> Self {
        Self { inner }
    }

    fn with_inner(&self, f: impl FnOnce(&AggregatorInner)) {
        if let Some(inner) = self.inner.upgrade() {
            f(&inner);
        }
    }

    fn created(&self) {
        self.with_inner(|inner| inner.broadcast(Event::AppCreated));
    }

    fn started(&self) {
        self.with_inner(|inner| {
            inner.announce_launch();
            inner.broadcast(Event::AppStarted);
        });
    }

    fn resumed(&self) {
        self.with_inner(|inner| inner.broadcast(Event::AppResumed));
    }

    fn paused(&self) {
        self.with_inner(|inner| inner.broadcast(Event::AppPaused));
    }

    fn stopped(&self) {
        self.with_inner(|inner| inner.broadcast(Event::AppStopped));
    }

    fn destroyed(&self) {
        self.with_inner(|inner| inner.broadcast(Event::AppDestroyed));
    }
}

impl LifecycleObserver for AppEventBridge {
    fn bindings(&self) -> BindingSpec {
        BindingSpec::new()
            .bind(Binding::no_args::<Self>(
                "app_created",
                Event::Create,
                Self::created,
            ))
            .bind(Binding::no_args::<Self>(
                "app_started",
                Event::Start,
                Self::started,
            ))
            .bind(Binding::no_args::<Self>(
                "app_resumed",
                Event::Resume,
                Self::resumed,
            ))
            .bind(Binding::no_args::<Self>(
                "app_paused",
                Event::Pause,
                Self::paused,
            ))
            .bind(Binding::no_args::<Self>(
                "app_stopped",
                Event::Stop,
                Self::stopped,
            ))
            .bind(Binding::no_args::<Self>(
                "app_destroyed",
                Event::Destroy,
                Self::destroyed,
            ))
    }
}
