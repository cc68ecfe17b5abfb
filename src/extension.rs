//! Extension Wiring
//!
//! Builds the registry and both view providers once, registers them with
//! the host, and tears everything down on request.

use std::sync::Arc;

use crate::config::Config;
use crate::core::{Disposable, DisposableStore, PackageRegistry, Storage};
use crate::engine::PackageEngine;
use crate::host::Host;
use crate::views::{RowsViewer, TablesViewProvider};

/// Collaborators the extension opens packages with.
#[derive(Clone)]
pub struct Services {
    pub storage: Arc<dyn Storage>,
    pub engine: Arc<dyn PackageEngine>,
}

/// A running extension.
pub struct Extension {
    registry: Arc<PackageRegistry>,
    subscriptions: DisposableStore,
}

impl Extension {
    /// Create the registry and register both views with `host`.
    pub fn activate(host: Arc<dyn Host>, services: Services, config: &Config) -> Self {
        let subscriptions = DisposableStore::new();
        let registry = subscriptions.register(PackageRegistry::new(Arc::clone(&host)));

        let tables = TablesViewProvider::new(Arc::clone(&registry));
        subscriptions.register(Arc::new(TablesViewProvider::register(host.as_ref(), tables)));

        let rows = RowsViewer::new(
            Arc::clone(&registry),
            services.storage,
            services.engine,
            config.script.clone(),
        );
        subscriptions.register(Arc::new(RowsViewer::register(host.as_ref(), rows)));

        log::info!("Extension activated");
        Self {
            registry,
            subscriptions,
        }
    }

    pub fn registry(&self) -> &Arc<PackageRegistry> {
        &self.registry
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_disposed()
    }

    /// Unregister the views and stop the registry. Safe to call repeatedly.
    pub fn deactivate(&self) {
        if self.is_active() {
            log::info!("Extension deactivated");
        }
        self.subscriptions.dispose();
    }
}
