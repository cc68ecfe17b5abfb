//! Disposable Resources
//!
//! Explicit, idempotent release of owned resources in stack order.

use std::sync::Arc;

use parking_lot::Mutex;

/// A resource that must be explicitly released.
///
/// Implementations must be idempotent: calling `dispose` more than once is a no-op.
pub trait Disposable: Send + Sync {
    fn dispose(&self);
}

impl<D: Disposable + ?Sized> Disposable for Arc<D> {
    fn dispose(&self) {
        (**self).dispose()
    }
}

impl<D: Disposable + ?Sized> Disposable for Box<D> {
    fn dispose(&self) {
        (**self).dispose()
    }
}

/// A disposable that runs a closure the first time it is disposed.
pub struct DisposeFn {
    callback: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl DisposeFn {
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            callback: Mutex::new(Some(Box::new(callback))),
        }
    }
}

impl Disposable for DisposeFn {
    fn dispose(&self) {
        let callback = self.callback.lock().take();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl std::fmt::Debug for DisposeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeFn")
            .field("pending", &self.callback.lock().is_some())
            .finish()
    }
}

#[derive(Default)]
struct StoreState {
    disposed: bool,
    items: Vec<Box<dyn Disposable>>,
}

/// Owns a stack of disposables and releases them together.
///
/// Once disposed, the store stays disposed; anything registered afterwards
/// is disposed on the spot instead of being kept.
#[derive(Default)]
pub struct DisposableStore {
    state: Mutex<StoreState>,
}

impl DisposableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`Disposable::dispose`] has been called on this store.
    pub fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    /// Number of resources currently owned
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take ownership of `value` and hand back a shared reference to it.
    ///
    /// If the store is already disposed, `value` is disposed immediately and
    /// never added.
    pub fn register<D>(&self, value: Arc<D>) -> Arc<D>
    where
        D: Disposable + ?Sized + 'static,
    {
        let mut state = self.state.lock();
        if state.disposed {
            drop(state);
            value.dispose();
        } else {
            state.items.push(Box::new(Arc::clone(&value)));
        }

        value
    }
}

impl Disposable for DisposableStore {
    fn dispose(&self) {
        // The flag is set and the stack taken before anything is released so
        // that a resource disposing back into this store sees it as disposed.
        let items = {
            let mut state = self.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            std::mem::take(&mut state.items)
        };

        dispose_all(items);
    }
}

impl std::fmt::Debug for DisposableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("DisposableStore")
            .field("disposed", &state.disposed)
            .field("items", &state.items.len())
            .finish()
    }
}

/// Dispose every item, last first.
pub fn dispose_all<D: Disposable>(mut items: Vec<D>) {
    while let Some(item) = items.pop() {
        item.dispose();
    }
}
