//! Rows Viewer
//!
//! Read-only custom editor that opens package documents and renders them in
//! a script-enabled panel.

use std::sync::Arc;

use tower_lsp::lsp_types::Url;

use crate::core::{Disposable, PackageDocument, PackageRegistry, Result, Storage, Subscription};
use crate::engine::PackageEngine;
use crate::host::{CustomEditorOptions, CustomReadonlyEditorProvider, Host, WebviewOptions, WebviewPanel};
use crate::util::{NONCE_LENGTH, nonce};

/// View type the rows viewer is registered under.
pub const VIEW_TYPE: &str = "msi.rowsView";

/// A [`PackageDocument`] row viewer.
pub struct RowsViewer {
    registry: Arc<PackageRegistry>,
    storage: Arc<dyn Storage>,
    engine: Arc<dyn PackageEngine>,
    script: String,
}

impl RowsViewer {
    pub fn new(
        registry: Arc<PackageRegistry>,
        storage: Arc<dyn Storage>,
        engine: Arc<dyn PackageEngine>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            storage,
            engine,
            script: script.into(),
        }
    }

    /// Register a viewer with `host`, one panel per document.
    pub fn register(host: &dyn Host, viewer: RowsViewer) -> Subscription {
        host.register_custom_editor_provider(
            VIEW_TYPE,
            Arc::new(viewer),
            CustomEditorOptions {
                supports_multiple_editors_per_document: false,
            },
        )
    }
}

#[tower_lsp::async_trait]
impl CustomReadonlyEditorProvider for RowsViewer {
    async fn open_custom_document(&self, uri: Url) -> Result<Arc<PackageDocument>> {
        PackageDocument::open(uri, self.storage.as_ref(), Arc::clone(&self.engine)).await
    }

    fn resolve_custom_editor(&self, document: Arc<PackageDocument>, panel: &dyn WebviewPanel) {
        let registration = self.registry.add(document);
        panel.on_did_dispose(Box::new(move || registration.dispose()));

        panel.set_options(WebviewOptions {
            enable_scripts: true,
        });

        let nonce = nonce(NONCE_LENGTH);
        panel.set_html(render_html(&nonce, &self.script));
    }
}

fn render_html(nonce: &str, script: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <meta charset="UTF-8">
        <meta http-equiv="Content-Security-Policy" content="default-src 'none'; script-src 'nonce-{nonce}' 'wasm-unsafe-eval';">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <script nonce="{nonce}" src="{script}" defer></script>
        <title>Row Viewer</title>
    </head>
    <body>
        <h1>Row Viewer</h1>
    </body>
</html>
"#
    )
}
