use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::Config;
use crate::core::FileStorage;
use crate::engine::MsiEngine;
use crate::extension::Services;
use crate::lsp::backend::Backend;
use crate::lsp::protocol;

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;

    // stdout carries JSON-RPC, so logs go to stderr
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    if let Some(path) = &config.config_file {
        log::info!("Loaded configuration from {:?}", path);
    }

    let engine = MsiEngine::spawn().context("Failed to start the package engine")?;
    let services = Services {
        storage: Arc::new(FileStorage),
        engine: Arc::new(engine),
    };

    let (service, socket) = build_service(config, services);
    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}

/// Build the service with every custom `msi/*` method routed to the backend.
pub fn build_service(config: Config, services: Services) -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::build(move |client| Backend::new(client, &config, services))
        .custom_method(protocol::DID_CHANGE_ACTIVE_TAB, Backend::did_change_active_tab)
        .custom_method(protocol::OPEN_CUSTOM_DOCUMENT, Backend::open_custom_document)
        .custom_method(protocol::RESOLVE_CUSTOM_EDITOR, Backend::resolve_custom_editor)
        .custom_method(protocol::DID_DISPOSE_PANEL, Backend::did_dispose_panel)
        .custom_method(protocol::DISPOSE_CUSTOM_DOCUMENT, Backend::dispose_custom_document)
        .custom_method(protocol::GET_CHILDREN, Backend::get_children)
        .custom_method(protocol::GET_TREE_ITEM, Backend::get_tree_item)
        .custom_method(protocol::TABLES, Backend::tables)
        .custom_method(protocol::ROWS, Backend::rows)
        .finish()
}
