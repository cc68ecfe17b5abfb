//! Session Host
//!
//! In-process [`Host`] holding the state a remote editor reports to us:
//! which tab is focused, which context flags are set, and which providers
//! are registered.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::{CustomEditorOptions, CustomReadonlyEditorProvider, Host, TabInput, TreeDataProvider};
use crate::core::{EventEmitter, Subscription};

type ContextSink = Box<dyn Fn(&str, bool) + Send + Sync>;

/// A registered custom editor provider together with its policy.
#[derive(Clone)]
pub struct EditorRegistration {
    pub provider: Arc<dyn CustomReadonlyEditorProvider>,
    pub options: CustomEditorOptions,
}

#[derive(Default)]
pub struct SessionHost {
    active_tab: Mutex<Option<TabInput>>,
    tabs_changed: EventEmitter<()>,
    contexts: Mutex<HashMap<String, bool>>,
    context_sink: Option<ContextSink>,
    editors: Arc<Mutex<IndexMap<String, EditorRegistration>>>,
    trees: Arc<Mutex<IndexMap<String, Arc<dyn TreeDataProvider>>>>,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that also forwards every context change to `sink`.
    pub fn with_context_sink<F>(sink: F) -> Self
    where
        F: Fn(&str, bool) + Send + Sync + 'static,
    {
        Self {
            context_sink: Some(Box::new(sink)),
            ..Self::default()
        }
    }

    /// Record the newly focused tab and notify tab listeners.
    pub fn set_active_tab(&self, tab: Option<TabInput>) {
        *self.active_tab.lock() = tab;
        self.tabs_changed.fire(&());
    }

    pub fn context(&self, key: &str) -> Option<bool> {
        self.contexts.lock().get(key).copied()
    }

    pub fn custom_editor(&self, view_type: &str) -> Option<EditorRegistration> {
        self.editors.lock().get(view_type).cloned()
    }

    pub fn custom_editor_view_types(&self) -> Vec<String> {
        self.editors.lock().keys().cloned().collect()
    }

    pub fn tree_data_provider(&self, view_id: &str) -> Option<Arc<dyn TreeDataProvider>> {
        self.trees.lock().get(view_id).cloned()
    }

    pub fn tree_view_ids(&self) -> Vec<String> {
        self.trees.lock().keys().cloned().collect()
    }
}

impl Host for SessionHost {
    fn active_tab(&self) -> Option<TabInput> {
        self.active_tab.lock().clone()
    }

    fn on_did_change_tabs(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription {
        self.tabs_changed.subscribe(move |_| listener())
    }

    fn set_context(&self, key: &str, value: bool) {
        self.contexts.lock().insert(key.to_string(), value);
        if let Some(sink) = &self.context_sink {
            sink(key, value);
        }
    }

    fn register_custom_editor_provider(
        &self,
        view_type: &str,
        provider: Arc<dyn CustomReadonlyEditorProvider>,
        options: CustomEditorOptions,
    ) -> Subscription {
        let previous = self
            .editors
            .lock()
            .insert(view_type.to_string(), EditorRegistration { provider, options });
        if previous.is_some() {
            log::warn!("Replaced custom editor provider for '{}'", view_type);
        }

        let editors = Arc::downgrade(&self.editors);
        let view_type = view_type.to_string();
        Subscription::new(move || {
            if let Some(editors) = editors.upgrade() {
                editors.lock().shift_remove(&view_type);
            }
        })
    }

    fn register_tree_data_provider(
        &self,
        view_id: &str,
        provider: Arc<dyn TreeDataProvider>,
    ) -> Subscription {
        self.trees.lock().insert(view_id.to_string(), provider);

        let trees = Arc::downgrade(&self.trees);
        let view_id = view_id.to_string();
        Subscription::new(move || {
            if let Some(trees) = trees.upgrade() {
                trees.lock().shift_remove(&view_id);
            }
        })
    }
}
