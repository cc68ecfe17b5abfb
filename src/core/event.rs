//! Change Notification
//!
//! A small publish/subscribe channel. Listeners are invoked synchronously,
//! in subscription order, on the thread that fires the event.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::dispose::{Disposable, DisposeFn};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Listeners<T> {
    next_id: u64,
    entries: Vec<(u64, Listener<T>)>,
}

/// Emits values of type `T` to every subscribed listener.
pub struct EventEmitter<T> {
    listeners: Arc<Mutex<Listeners<T>>>,
}

impl<T: 'static> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventEmitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(Mutex::new(Listeners {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Subscribe to this event. Dispose the returned [`Subscription`] to stop listening.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut listeners = self.listeners.lock();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, Arc::new(listener)));
            id
        };

        let weak: Weak<Mutex<Listeners<T>>> = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.lock().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `value` to all listeners subscribed at the time of the call.
    pub fn fire(&self, value: &T) {
        // Listeners may subscribe or unsubscribe while being notified, so
        // they run against a snapshot taken outside the lock.
        let snapshot: Vec<Listener<T>> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(value);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }
}

impl<T: 'static> Disposable for EventEmitter<T> {
    fn dispose(&self) {
        self.listeners.lock().entries.clear();
    }
}

/// Handle returned when subscribing or registering with a host.
///
/// Disposing it undoes the subscription; dropping it does not.
#[derive(Debug)]
pub struct Subscription(DisposeFn);

impl Subscription {
    pub fn new<F>(on_dispose: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self(DisposeFn::new(on_dispose))
    }

    /// A subscription with nothing to undo.
    pub fn empty() -> Self {
        Self::new(|| {})
    }
}

impl Disposable for Subscription {
    fn dispose(&self) {
        self.0.dispose();
    }
}
