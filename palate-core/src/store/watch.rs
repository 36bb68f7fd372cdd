//! Instance-scoped subscriber registry for store change notifications.
//!
//! The registry is owned by a store instance, never by ambient global
//! state: subscribing returns a [`WatchHandle`] that detaches on drop or
//! via an explicit [`WatchHandle::detach`], so a forgotten handle cannot
//! leak a callback past its owner's lifetime.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

type Callback<T> = Box<dyn Fn(&T) + Send + Sync>;
type Registry<T> = Mutex<BTreeMap<u64, Callback<T>>>;

/// Subscriber list owned by a single store instance.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use palate_core::Watchers;
///
/// let watchers = Watchers::new();
/// let seen = Arc::new(AtomicU32::new(0));
/// let counter = Arc::clone(&seen);
/// let handle = watchers.subscribe(move |value: &u32| {
///     counter.fetch_add(*value, Ordering::SeqCst);
/// });
///
/// watchers.notify(&2);
/// handle.detach();
/// watchers.notify(&40);
/// assert_eq!(seen.load(Ordering::SeqCst), 2);
/// ```
pub struct Watchers<T> {
    registry: Arc<Registry<T>>,
    next_id: Mutex<u64>,
}

impl<T> std::fmt::Debug for Watchers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .registry
            .lock()
            .map(|guard| guard.len())
            .unwrap_or_default();
        f.debug_struct("Watchers")
            .field("subscribers", &count)
            .finish_non_exhaustive()
    }
}

impl<T> Default for Watchers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Watchers<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: Mutex::new(0),
        }
    }

    /// Register `callback` and return its detach handle.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> WatchHandle<T> {
        let id = {
            let mut next = self
                .next_id
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let id = *next;
            *next += 1;
            id
        };
        let mut registry = self
            .registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        registry.insert(id, Box::new(callback));
        WatchHandle {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    /// Invoke every live subscriber with `value`.
    pub fn notify(&self, value: &T) {
        let registry = self
            .registry
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for callback in registry.values() {
            callback(value);
        }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .map(|guard| guard.len())
            .unwrap_or_default()
    }

    /// Report whether no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for one subscription; detaches it on drop.
#[must_use = "dropping the handle detaches the subscription"]
#[derive(Debug)]
pub struct WatchHandle<T> {
    registry: Weak<Registry<T>>,
    id: u64,
}

impl<T> WatchHandle<T> {
    /// Remove the subscription now instead of waiting for drop.
    pub fn detach(self) {
        // Drop does the work.
    }

    fn remove(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut guard = registry
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.remove(&self.id);
        }
    }
}

impl<T> Drop for WatchHandle<T> {
    fn drop(&mut self) {
        self.remove();
    }
}
