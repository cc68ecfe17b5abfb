//! Handlers for the custom `msi/*` methods.
//!
//! These are inherent methods so they can be registered directly with
//! `LspService::build(..).custom_method(..)`.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use tower_lsp::jsonrpc::{Error, ErrorCode, Result as LspResult};

use crate::core::{Disposable, Error as DocumentError, PackageDocument};
use crate::engine::{EngineError, Row, TableInfo};
use crate::host::{EditorRegistration, TreeDataProvider, TreeItem};
use crate::lsp::backend::{Backend, OpenDocument};
use crate::lsp::panel::RemotePanel;
use crate::lsp::protocol::*;

impl Backend {
    pub async fn did_change_active_tab(&self, params: ActiveTabParams) {
        self.host.set_active_tab(params.tab_input());
    }

    pub async fn open_custom_document(
        &self,
        params: OpenCustomDocumentParams,
    ) -> LspResult<OpenCustomDocumentResult> {
        let registration = self.custom_editor(&params.view_type)?;
        let document = registration
            .provider
            .open_custom_document(params.uri)
            .await
            .map_err(document_error)?;

        let document_id = self.next_document_id.fetch_add(1, Ordering::SeqCst);
        self.documents.lock().await.insert(
            document_id,
            OpenDocument {
                view_type: params.view_type,
                document,
            },
        );

        Ok(OpenCustomDocumentResult { document_id })
    }

    pub async fn resolve_custom_editor(
        &self,
        params: ResolveCustomEditorParams,
    ) -> LspResult<ResolveCustomEditorResult> {
        let registration = self.custom_editor(&params.view_type)?;
        let document = self.document(params.document_id).await?;

        let mut panels = self.panels.lock().await;
        if panels.contains_key(&params.panel_id) {
            return Err(invalid_request(format!(
                "panel '{}' is already resolved",
                params.panel_id
            )));
        }
        if !registration.options.supports_multiple_editors_per_document
            && panels
                .values()
                .any(|panel| panel.document_id() == params.document_id)
        {
            return Err(invalid_request(format!(
                "document {} is already shown in another panel",
                params.document_id
            )));
        }

        let panel = Arc::new(RemotePanel::new(params.document_id));
        registration
            .provider
            .resolve_custom_editor(document, panel.as_ref());
        panels.insert(params.panel_id, Arc::clone(&panel));

        Ok(ResolveCustomEditorResult {
            html: panel.html(),
            enable_scripts: panel.options().enable_scripts,
        })
    }

    pub async fn did_dispose_panel(&self, params: PanelParams) {
        let panel = self.panels.lock().await.remove(&params.panel_id);
        match panel {
            Some(panel) => panel.dispose(),
            None => log::debug!("Ignoring close of unknown panel '{}'", params.panel_id),
        }
    }

    pub async fn dispose_custom_document(&self, params: DocumentParams) {
        let open = self.documents.lock().await.remove(&params.document_id);
        match open {
            Some(open) => open.document.dispose(),
            None => log::debug!("Ignoring dispose of unknown document {}", params.document_id),
        }
    }

    pub async fn get_children(&self, params: GetChildrenParams) -> LspResult<Option<Vec<TreeItem>>> {
        let provider = self.tree_data_provider(&params.view_id)?;
        Ok(provider.get_children(params.element.as_ref()))
    }

    pub async fn get_tree_item(&self, params: GetTreeItemParams) -> LspResult<TreeItem> {
        let provider = self.tree_data_provider(&params.view_id)?;
        Ok(provider.get_tree_item(params.element))
    }

    pub async fn tables(&self, params: DocumentParams) -> LspResult<Vec<TableInfo>> {
        let document = self.document(params.document_id).await?;
        document.tables().await.map_err(document_error)
    }

    pub async fn rows(&self, params: RowsParams) -> LspResult<Vec<Row>> {
        let document = self.document(params.document_id).await?;
        document.rows(&params.table).await.map_err(document_error)
    }

    fn custom_editor(&self, view_type: &str) -> LspResult<EditorRegistration> {
        self.host.custom_editor(view_type).ok_or_else(|| {
            Error::invalid_params(format!("no custom editor registered for '{}'", view_type))
        })
    }

    fn tree_data_provider(&self, view_id: &str) -> LspResult<Arc<dyn TreeDataProvider>> {
        self.host.tree_data_provider(view_id).ok_or_else(|| {
            Error::invalid_params(format!("no tree view registered for '{}'", view_id))
        })
    }

    async fn document(&self, document_id: u64) -> LspResult<Arc<PackageDocument>> {
        self.documents
            .lock()
            .await
            .get(&document_id)
            .map(|open| Arc::clone(&open.document))
            .ok_or_else(|| Error::invalid_params(format!("unknown document {}", document_id)))
    }
}

fn invalid_request(message: String) -> Error {
    Error {
        code: ErrorCode::InvalidRequest,
        message: message.into(),
        data: None,
    }
}

/// Map document errors onto JSON-RPC errors the editor can tell apart.
pub(crate) fn document_error(error: DocumentError) -> Error {
    let code = match &error {
        DocumentError::Io { .. } => ErrorCode::ServerError(IO_ERROR_CODE),
        DocumentError::Format { .. } => ErrorCode::ServerError(FORMAT_ERROR_CODE),
        DocumentError::Engine(EngineError::TableNotFound(_)) => ErrorCode::InvalidParams,
        DocumentError::Disposed(_) => ErrorCode::InvalidRequest,
        DocumentError::Engine(_) => ErrorCode::InternalError,
    };

    Error {
        code,
        message: error.to_string().into(),
        data: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::Url;

    #[test]
    fn test_document_error_codes() {
        let uri = Url::parse("pkg://sample.msi").unwrap();

        let io = document_error(DocumentError::Io {
            uri: uri.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        });
        assert_eq!(io.code, ErrorCode::ServerError(IO_ERROR_CODE));
        assert!(io.message.contains("pkg://sample.msi"));

        let format = document_error(DocumentError::Format {
            uri: uri.clone(),
            reason: "truncated".to_string(),
        });
        assert_eq!(format.code, ErrorCode::ServerError(FORMAT_ERROR_CODE));

        let missing = document_error(DocumentError::Engine(EngineError::TableNotFound(
            "File".to_string(),
        )));
        assert_eq!(missing.code, ErrorCode::InvalidParams);

        let disposed = document_error(DocumentError::Disposed(uri));
        assert_eq!(disposed.code, ErrorCode::InvalidRequest);
    }
}
