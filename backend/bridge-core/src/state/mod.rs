//! Type-keyed state container.
//!
//! Stores exactly one value per distinct type, registered before serving
//! begins and injected into every request context. The container serializes
//! access only to its own type→value map; stored values that need mutable
//! internal state must carry their own synchronization.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::warn;

/// Process-wide registry of long-lived service objects, keyed by type.
///
/// `Clone` hands out another handle to the same map.
#[derive(Clone, Default)]
pub struct StateContainer {
    entries: Arc<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl StateContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one instance of `T`, replacing any prior instance of that type.
    pub fn manage<T: Send + Sync + 'static>(&self, value: T) {
        let mut entries = self.entries.write().expect("state container poisoned");
        if entries.insert(TypeId::of::<T>(), Arc::new(value)).is_some() {
            warn!("Replacing managed state for type {}", type_name::<T>());
        }
    }

    /// Look up the managed instance of `T`, if any.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let entries = self.entries.read().expect("state container poisoned");
        entries
            .get(&TypeId::of::<T>())
            .cloned()
            .map(|entry| entry.downcast::<T>().expect("state entry type mismatch"))
    }

    /// Look up the managed instance of `T`, aborting if absent.
    ///
    /// # Panics
    ///
    /// Panics when no instance of `T` was managed. Requesting unmanaged
    /// state is a programming error, not a runtime condition to recover from.
    pub fn require<T: Send + Sync + 'static>(&self) -> Arc<T> {
        self.get::<T>().unwrap_or_else(|| {
            panic!(
                "required state not managed: {} - call manage() before serving",
                type_name::<T>()
            )
        })
    }
}
