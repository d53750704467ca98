use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A multicast event: callbacks registered under a subscriber name.
///
/// Subscribing again under the same name replaces the earlier callback, so
/// a subscriber that re-registers on every run is still called once.
pub struct EventChannel<T> {
    subscribers: Mutex<IndexMap<String, Callback<T>>>,
}

impl<T> Default for EventChannel<T> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(IndexMap::new()),
        }
    }
}

impl<T> EventChannel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.lock().insert(name.into(), Arc::new(callback));
    }

    /// Removes the named subscriber; returns whether it was present.
    pub fn unsubscribe(&self, name: &str) -> bool {
        self.subscribers.lock().shift_remove(name).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Calls every subscriber in registration order.
    pub fn raise(&self, event: &T) {
        // Callbacks run outside the lock so they may (un)subscribe.
        let callbacks: Vec<Callback<T>> = self.subscribers.lock().values().cloned().collect();
        for callback in callbacks {
            callback(event);
        }
    }
}
