use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use serde_json::json;
use tokio::sync::{Mutex, mpsc};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::Config;
use crate::core::{Disposable, PackageDocument};
use crate::extension::{Extension, Services};
use crate::host::SessionHost;
use crate::lsp::panel::RemotePanel;
use crate::lsp::protocol::{SetContext, SetContextParams};

/// A document the editor opened through one of our custom editors.
pub struct OpenDocument {
    pub view_type: String,
    pub document: Arc<PackageDocument>,
}

/// The main LSP backend that holds state and implements the Language Server Protocol
pub struct Backend {
    pub client: Client,
    pub host: Arc<SessionHost>,
    pub extension: Extension,
    pub documents: Arc<Mutex<HashMap<u64, OpenDocument>>>,
    pub panels: Arc<Mutex<HashMap<String, Arc<RemotePanel>>>>,
    pub(crate) next_document_id: AtomicU64,
}

impl Backend {
    pub fn new(client: Client, config: &Config, services: Services) -> Self {
        let host = Arc::new(SessionHost::with_context_sink(context_forwarder(&client)));
        let extension = Extension::activate(host.clone(), services, config);

        Self {
            client,
            host,
            extension,
            documents: Arc::new(Mutex::new(HashMap::new())),
            panels: Arc::new(Mutex::new(HashMap::new())),
            next_document_id: AtomicU64::new(1),
        }
    }

    fn experimental_capabilities(&self) -> serde_json::Value {
        let custom_editors: Vec<_> = self
            .host
            .custom_editor_view_types()
            .into_iter()
            .filter_map(|view_type| {
                let registration = self.host.custom_editor(&view_type)?;
                Some(json!({
                    "viewType": view_type,
                    "supportsMultipleEditorsPerDocument":
                        registration.options.supports_multiple_editors_per_document,
                }))
            })
            .collect();

        json!({
            "customEditors": custom_editors,
            "treeViews": self.host.tree_view_ids(),
        })
    }
}

/// Context changes are synchronous on our side but notifications are async,
/// so they are queued and sent in order by a single task.
fn context_forwarder(client: &Client) -> impl Fn(&str, bool) + Send + Sync + 'static {
    let (tx, mut rx) = mpsc::unbounded_channel::<SetContextParams>();

    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            let client = client.clone();
            runtime.spawn(async move {
                while let Some(params) = rx.recv().await {
                    client.send_notification::<SetContext>(params).await;
                }
            });
        }
        Err(_) => log::warn!("No async runtime; context changes will not reach the editor"),
    }

    move |key: &str, value: bool| {
        let params = SetContextParams {
            key: key.to_string(),
            value,
        };
        if tx.send(params).is_err() {
            log::debug!("Dropped context change for '{}'", key);
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(
        &self,
        _: InitializeParams,
    ) -> tower_lsp::jsonrpc::Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                experimental: Some(self.experimental_capabilities()),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "msi-ls".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "msi-language-server initialized")
            .await;
    }

    async fn shutdown(&self) -> tower_lsp::jsonrpc::Result<()> {
        let panels: Vec<_> = self.panels.lock().await.drain().collect();
        for (_, panel) in panels {
            panel.dispose();
        }

        let documents: Vec<_> = self.documents.lock().await.drain().collect();
        for (_, open) in documents {
            open.document.dispose();
        }

        self.extension.deactivate();
        Ok(())
    }
}
