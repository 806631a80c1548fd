//! Listener registry shared by the adapters.
//!
//! Notification works on a snapshot of the registered listeners, so a
//! listener may subscribe, unsubscribe, or call back into its source while
//! being notified.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{Listener, Subscription};

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Set of listeners with RAII unsubscription.
pub struct ListenerSet<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> ListenerSet<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a listener; dropping the returned handle removes it.
    pub fn subscribe(&self, listener: Listener<T>) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, listener));
            id
        };

        let weak = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Call every listener registered at the time of the call.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Listener<T>> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(value);
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for ListenerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_and_unsubscribe() {
        let set = ListenerSet::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));

        let sink = Arc::clone(&total);
        let sub = set.subscribe(Arc::new(move |v: &u32| {
            sink.fetch_add(*v as usize, Ordering::SeqCst);
        }));
        set.notify(&3);
        assert_eq!(total.load(Ordering::SeqCst), 3);

        drop(sub);
        assert!(set.is_empty());
        set.notify(&10);
        assert_eq!(total.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_listener_may_reenter_registry() {
        let set = Arc::new(ListenerSet::<u32>::new());
        let inner = Arc::clone(&set);
        let _sub = set.subscribe(Arc::new(move |_: &u32| {
            // Would deadlock if notify held the registry lock.
            assert_eq!(inner.len(), 1);
        }));
        set.notify(&1);
    }
}
