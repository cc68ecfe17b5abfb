//! Host Editor Environment
//!
//! Capabilities the editor host provides: tab focus, context flags, and the
//! extension points view providers register with.

pub mod session;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tower_lsp::lsp_types::Url;

use crate::core::{PackageDocument, Result, Subscription};

pub use session::{EditorRegistration, SessionHost};

/// What the focused tab is showing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TabInput {
    /// A custom editor for `uri`.
    Custom {
        uri: Url,
        #[serde(rename = "viewType")]
        view_type: String,
    },
    Text {
        uri: Url,
    },
    #[serde(other)]
    Other,
}

impl TabInput {
    /// The location of a custom-editor tab.
    pub fn custom_uri(&self) -> Option<&Url> {
        match self {
            TabInput::Custom { uri, .. } => Some(uri),
            _ => None,
        }
    }
}

/// Options a custom editor provider is registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEditorOptions {
    pub supports_multiple_editors_per_document: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebviewOptions {
    pub enable_scripts: bool,
}

/// A sandboxed surface a custom editor renders into.
pub trait WebviewPanel: Send + Sync {
    fn set_options(&self, options: WebviewOptions);

    fn set_html(&self, html: String);

    /// Run `listener` once when the panel is closed.
    fn on_did_dispose(&self, listener: Box<dyn FnOnce() + Send>);
}

/// Extension point for read-only custom editors.
#[tower_lsp::async_trait]
pub trait CustomReadonlyEditorProvider: Send + Sync {
    /// Open the document for `uri`. The host owns the result and disposes it
    /// when its last editor closes.
    async fn open_custom_document(&self, uri: Url) -> Result<Arc<PackageDocument>>;

    /// Bind an opened document to a freshly created panel.
    fn resolve_custom_editor(&self, document: Arc<PackageDocument>, panel: &dyn WebviewPanel);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollapsibleState {
    #[default]
    None,
    Collapsed,
    Expanded,
}

/// A self-describing tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeItem {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub collapsible_state: CollapsibleState,
}

impl TreeItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: None,
            collapsible_state: CollapsibleState::None,
        }
    }
}

/// Extension point for pull-based tree views.
pub trait TreeDataProvider: Send + Sync {
    fn get_tree_item(&self, element: TreeItem) -> TreeItem;

    /// Children of `element`, or the roots when `element` is `None`.
    fn get_children(&self, element: Option<&TreeItem>) -> Option<Vec<TreeItem>>;
}

/// The editor host as seen by the core.
pub trait Host: Send + Sync {
    /// Input of the focused tab in the active tab group, if any.
    fn active_tab(&self) -> Option<TabInput>;

    /// Call `listener` whenever tabs change.
    fn on_did_change_tabs(&self, listener: Box<dyn Fn() + Send + Sync>) -> Subscription;

    /// Set a boolean context key used to gate command visibility.
    fn set_context(&self, key: &str, value: bool);

    fn register_custom_editor_provider(
        &self,
        view_type: &str,
        provider: Arc<dyn CustomReadonlyEditorProvider>,
        options: CustomEditorOptions,
    ) -> Subscription;

    fn register_tree_data_provider(
        &self,
        view_id: &str,
        provider: Arc<dyn TreeDataProvider>,
    ) -> Subscription;
}
