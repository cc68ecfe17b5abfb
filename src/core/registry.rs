//! Package Registry
//!
//! Tracks opened documents and derives the active one from host tab focus.
//! The registry observes documents; it never owns or disposes them.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use indexmap::IndexSet;
use parking_lot::Mutex;
use tower_lsp::lsp_types::Url;

use super::dispose::{Disposable, DisposableStore};
use super::document::PackageDocument;
use super::event::{EventEmitter, Subscription};
use crate::host::Host;

/// Context key set while a package document has focus.
pub const ACTIVE_CONTEXT_KEY: &str = "msi:isActive";

/// Document identity is the allocation, not the location: two opens of the
/// same location are two distinct members.
#[derive(Clone)]
struct DocumentKey(Arc<PackageDocument>);

impl PartialEq for DocumentKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for DocumentKey {}

impl Hash for DocumentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

#[derive(Default)]
struct RegistryState {
    documents: IndexSet<DocumentKey>,
    active: Option<Arc<PackageDocument>>,
}

/// Registry of opened [`PackageDocument`]s used for managing views.
pub struct PackageRegistry {
    host: Arc<dyn Host>,
    state: Mutex<RegistryState>,
    on_did_change: Arc<EventEmitter<Option<Arc<PackageDocument>>>>,
    store: DisposableStore,
}

impl PackageRegistry {
    /// Create a registry listening to `host` tab changes, seeded from the
    /// currently focused tab.
    pub fn new(host: Arc<dyn Host>) -> Arc<Self> {
        let registry = Arc::new(Self {
            host: Arc::clone(&host),
            state: Mutex::new(RegistryState::default()),
            on_did_change: Arc::new(EventEmitter::new()),
            store: DisposableStore::new(),
        });

        registry.store.register(Arc::clone(&registry.on_did_change));

        let weak: Weak<Self> = Arc::downgrade(&registry);
        let subscription = host.on_did_change_tabs(Box::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.on_changed_tabs();
            }
        }));
        registry.store.register(Arc::new(subscription));

        registry.on_changed_tabs();
        registry
    }

    /// The document shown in the focused custom editor tab, if tracked.
    pub fn active_document(&self) -> Option<Arc<PackageDocument>> {
        self.state.lock().active.clone()
    }

    /// Listen for changes of the active document. A disposed registry
    /// never fires, so listening to it yields an empty subscription.
    pub fn on_did_change_active_document<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Option<Arc<PackageDocument>>) + Send + Sync + 'static,
    {
        if self.store.is_disposed() {
            return Subscription::empty();
        }
        self.on_did_change.subscribe(listener)
    }

    /// Track `document` and recompute the active document.
    ///
    /// Disposing the returned [`Registration`] stops tracking the document
    /// but leaves the document itself alone.
    pub fn add(self: &Arc<Self>, document: Arc<PackageDocument>) -> Registration {
        {
            let mut state = self.state.lock();
            if !state.documents.insert(DocumentKey(Arc::clone(&document))) {
                log::trace!("{} is already registered", document.uri());
            }
        }

        self.on_changed_tabs();

        Registration {
            registry: Arc::downgrade(self),
            document,
        }
    }

    /// First tracked document whose location equals `uri`.
    pub fn find(&self, uri: &Url) -> Option<Arc<PackageDocument>> {
        let uri = uri.as_str();
        self.state
            .lock()
            .documents
            .iter()
            .find(|key| key.0.uri().as_str() == uri)
            .map(|key| Arc::clone(&key.0))
    }

    pub fn contains(&self, document: &Arc<PackageDocument>) -> bool {
        self.state
            .lock()
            .documents
            .contains(&DocumentKey(Arc::clone(document)))
    }

    pub fn len(&self) -> usize {
        self.state.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tracked documents in registration order.
    pub fn documents(&self) -> Vec<Arc<PackageDocument>> {
        self.state
            .lock()
            .documents
            .iter()
            .map(|key| Arc::clone(&key.0))
            .collect()
    }

    fn remove(&self, document: &Arc<PackageDocument>) {
        let removed = self
            .state
            .lock()
            .documents
            .shift_remove(&DocumentKey(Arc::clone(document)));
        if removed {
            log::debug!("Stopped tracking {}", document.uri());
        }
    }

    fn on_changed_tabs(&self) {
        let next = self
            .host
            .active_tab()
            .and_then(|tab| tab.custom_uri().and_then(|uri| self.find(uri)));

        {
            let mut state = self.state.lock();
            let unchanged = match (&next, &state.active) {
                (Some(next), Some(active)) => Arc::ptr_eq(next, active),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            state.active = next.clone();
        }

        match &next {
            Some(document) => log::debug!("Active package is now {}", document.uri()),
            None => log::debug!("No active package"),
        }

        self.host.set_context(ACTIVE_CONTEXT_KEY, next.is_some());
        self.on_did_change.fire(&next);
    }
}

impl Disposable for PackageRegistry {
    fn dispose(&self) {
        self.store.dispose();
    }
}

/// Removal token returned by [`PackageRegistry::add`].
pub struct Registration {
    registry: Weak<PackageRegistry>,
    document: Arc<PackageDocument>,
}

impl Registration {
    pub fn document(&self) -> &Arc<PackageDocument> {
        &self.document
    }
}

impl Disposable for Registration {
    fn dispose(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.document);
        }
    }
}
