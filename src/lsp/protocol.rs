//! Custom JSON-RPC messages exchanged with the editor.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_lsp::lsp_types::Url;
use tower_lsp::lsp_types::notification::Notification;

use crate::host::{TabInput, TreeItem};

pub const DID_CHANGE_ACTIVE_TAB: &str = "msi/didChangeActiveTab";
pub const OPEN_CUSTOM_DOCUMENT: &str = "msi/openCustomDocument";
pub const RESOLVE_CUSTOM_EDITOR: &str = "msi/resolveCustomEditor";
pub const DID_DISPOSE_PANEL: &str = "msi/didDisposePanel";
pub const DISPOSE_CUSTOM_DOCUMENT: &str = "msi/disposeCustomDocument";
pub const GET_CHILDREN: &str = "msi/getChildren";
pub const GET_TREE_ITEM: &str = "msi/getTreeItem";
pub const TABLES: &str = "msi/tables";
pub const ROWS: &str = "msi/rows";

/// JSON-RPC error code for unreadable locations.
pub const IO_ERROR_CODE: i64 = -32001;
/// JSON-RPC error code for bytes the engine rejected.
pub const FORMAT_ERROR_CODE: i64 = -32002;

/// Server-to-client request to set a command-visibility context key.
#[derive(Debug)]
pub enum SetContext {}

impl Notification for SetContext {
    type Params = SetContextParams;
    const METHOD: &'static str = "msi/setContext";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetContextParams {
    pub key: String,
    pub value: bool,
}

/// The focused tab changed. `tab` is kept raw so that malformed input can
/// degrade to "no tab" instead of failing the notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveTabParams {
    #[serde(default)]
    pub tab: Option<Value>,
}

impl ActiveTabParams {
    pub fn tab_input(&self) -> Option<TabInput> {
        let tab = self.tab.as_ref()?;
        match serde_json::from_value(tab.clone()) {
            Ok(input) => Some(input),
            Err(e) => {
                log::debug!("Ignoring malformed tab {}: {}", tab, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCustomDocumentParams {
    pub view_type: String,
    pub uri: Url,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenCustomDocumentResult {
    pub document_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCustomEditorParams {
    pub view_type: String,
    pub document_id: u64,
    pub panel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveCustomEditorResult {
    pub html: String,
    pub enable_scripts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelParams {
    pub panel_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParams {
    pub document_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsParams {
    pub document_id: u64,
    pub table: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetChildrenParams {
    pub view_id: String,
    #[serde(default)]
    pub element: Option<TreeItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTreeItemParams {
    pub view_id: String,
    pub element: TreeItem,
}
