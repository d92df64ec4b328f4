//! # Process-wide memoization of per-type dispatch decisions.
//!
//! Classifying an observer type and building its [`DispatchTable`] is the one
//! avoidable cost in the dispatch path, so both are computed at most once per
//! concrete type for the lifetime of the process, keyed by [`TypeId`].
//!
//! ## Concurrency
//! Registries are single-threaded, but this cache is shared by every
//! owner-thread in the process. First access races are resolved with a
//! double-checked insert under an `RwLock`: the losing racer observes the
//! winner's entry and never builds a second table, so at most one table per
//! type is ever visible.
//!
//! ## Rules
//! - Entries are never invalidated; types are immutable within a process.
//! - A failed table build is *not* cached: the same configuration error is
//!   surfaced again on the next registration attempt of the offending type.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::ConfigError;

use super::binding::BindingSpec;
use super::resolve::StrategyKind;
use super::table::DispatchTable;

#[derive(Default)]
struct CacheInner {
    tables: HashMap<TypeId, Arc<DispatchTable>>,
    kinds: HashMap<TypeId, StrategyKind>,
    has_bindings: HashMap<TypeId, bool>,
}

static CACHE: OnceLock<RwLock<CacheInner>> = OnceLock::new();

fn cache() -> &'static RwLock<CacheInner> {
    CACHE.get_or_init(RwLock::default)
}

/// Namespace for the global per-type caches.
pub(crate) struct DispatchCache;

impl DispatchCache {
    /// Returns the cached table for `type_id`, building it from `spec` on
    /// first access. Build runs under the write lock, so concurrent first
    /// accesses build exactly once.
    pub(crate) fn table_for(
        type_id: TypeId,
        type_name: &'static str,
        spec: impl FnOnce() -> BindingSpec,
    ) -> Result<Arc<DispatchTable>, ConfigError> {
        {
            let read = cache().read().unwrap_or_else(|e| e.into_inner());
            if let Some(table) = read.tables.get(&type_id) {
                return Ok(Arc::clone(table));
            }
        }

        let mut write = cache().write().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = write.tables.get(&type_id) {
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(DispatchTable::build(&spec(), type_name)?);
        write.has_bindings.insert(type_id, !table.is_empty());
        write.tables.insert(type_id, Arc::clone(&table));
        Ok(table)
    }

    /// Returns the cached strategy kind for `type_id`, classifying on first
    /// access.
    pub(crate) fn strategy_kind(
        type_id: TypeId,
        classify: impl FnOnce() -> StrategyKind,
    ) -> StrategyKind {
        {
            let read = cache().read().unwrap_or_else(|e| e.into_inner());
            if let Some(kind) = read.kinds.get(&type_id) {
                return *kind;
            }
        }

        let mut write = cache().write().unwrap_or_else(|e| e.into_inner());
        if let Some(kind) = write.kinds.get(&type_id) {
            return *kind;
        }
        let kind = classify();
        write.kinds.insert(type_id, kind);
        kind
    }

    /// Whether the type's built table declared any explicit handlers.
    /// `None` until the table has been built.
    pub(crate) fn has_bindings(type_id: TypeId) -> Option<bool> {
        let read = cache().read().unwrap_or_else(|e| e.into_inner());
        read.has_bindings.get(&type_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::binding::{Binding, BindingSpec};
    use super::*;
    use crate::model::Event;

    struct Solo;

    impl Solo {
        fn tick(&self) {}
    }

    fn solo_spec() -> BindingSpec {
        BindingSpec::new().bind(Binding::no_args::<Solo>("tick", Event::Create, Solo::tick))
    }

    #[test]
    fn test_table_is_built_once_under_concurrent_first_access() {
        struct Racy;
        impl Racy {
            fn tick(&self) {}
        }

        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        let type_id = TypeId::of::<Racy>();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(move || {
                    let table = DispatchCache::table_for(type_id, "Racy", || {
                        BUILDS.fetch_add(1, Ordering::SeqCst);
                        BindingSpec::new().bind(Binding::no_args::<Racy>(
                            "tick",
                            Event::Create,
                            Racy::tick,
                        ))
                    })
                    .unwrap();
                    assert_eq!(table.handler_count(), 1);
                });
            }
        });

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeat_lookups_share_one_table() {
        let type_id = TypeId::of::<Solo>();
        let a = DispatchCache::table_for(type_id, "Solo", solo_spec).unwrap();
        let b = DispatchCache::table_for(type_id, "Solo", solo_spec).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(DispatchCache::has_bindings(type_id), Some(true));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        struct Broken;
        impl Broken {
            fn tick(&self) {}
        }
        let type_id = TypeId::of::<Broken>();
        let bad = || {
            BindingSpec::new()
                .bind(Binding::no_args::<Broken>("tick", Event::Create, Broken::tick))
                .bind(Binding::no_args::<Broken>("tick", Event::Destroy, Broken::tick))
        };
        assert!(DispatchCache::table_for(type_id, "Broken", bad).is_err());
        // A corrected declaration for the same type succeeds afterwards.
        let fixed = || {
            BindingSpec::new().bind(Binding::no_args::<Broken>("tick", Event::Create, Broken::tick))
        };
        assert!(DispatchCache::table_for(type_id, "Broken", fixed).is_ok());
    }

    #[test]
    fn test_strategy_kind_is_classified_once() {
        struct Kindful;
        let type_id = TypeId::of::<Kindful>();
        let calls = AtomicUsize::new(0);
        let first = DispatchCache::strategy_kind(type_id, || {
            calls.fetch_add(1, Ordering::SeqCst);
            StrategyKind::Table
        });
        let second = DispatchCache::strategy_kind(type_id, || {
            calls.fetch_add(1, Ordering::SeqCst);
            StrategyKind::EventOnly
        });
        assert_eq!(first, StrategyKind::Table);
        assert_eq!(second, StrategyKind::Table);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
