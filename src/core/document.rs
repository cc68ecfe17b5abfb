//! Package Documents
//!
//! A document wraps exactly one opened package and owns its engine handle.

use std::sync::Arc;

use parking_lot::Mutex;
use tower_lsp::lsp_types::Url;

use super::dispose::{Disposable, DisposableStore};
use super::error::{Error, Result};
use super::storage::Storage;
use crate::engine::{EngineError, HandleId, PackageEngine, PackageHandle, Row, TableInfo};

/// An opened package, identified by its location.
pub struct PackageDocument {
    uri: Url,
    engine: Arc<dyn PackageEngine>,
    package: Mutex<Option<PackageHandle>>,
    store: DisposableStore,
}

impl PackageDocument {
    /// Read `uri` from `storage` and open it with `engine`.
    ///
    /// Dropping the returned future cancels the open. The engine never
    /// leaves a package allocated for an open nobody is waiting on, so a
    /// cancelled open leaks nothing.
    pub async fn open(
        uri: Url,
        storage: &dyn Storage,
        engine: Arc<dyn PackageEngine>,
    ) -> Result<Arc<Self>> {
        let data = storage.read_bytes(&uri).await.map_err(|source| Error::Io {
            uri: uri.clone(),
            source,
        })?;

        let handle = engine.open(data).await.map_err(|e| match e {
            EngineError::Malformed(reason) => Error::Format {
                uri: uri.clone(),
                reason,
            },
            other => Error::Engine(other),
        })?;

        log::debug!("Opened {} as package {}", uri, handle.id());
        Ok(Arc::new(Self {
            uri,
            engine,
            package: Mutex::new(Some(handle)),
            store: DisposableStore::new(),
        }))
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn is_disposed(&self) -> bool {
        self.store.is_disposed()
    }

    /// Whether the engine handle is still owned.
    pub fn has_package(&self) -> bool {
        self.package.lock().is_some()
    }

    /// Tie `resource` to this document's lifetime.
    pub fn register<D>(&self, resource: Arc<D>) -> Arc<D>
    where
        D: Disposable + ?Sized + 'static,
    {
        self.store.register(resource)
    }

    pub async fn tables(&self) -> Result<Vec<TableInfo>> {
        let id = self.handle_id()?;
        Ok(self.engine.tables(id).await?)
    }

    pub async fn rows(&self, table: &str) -> Result<Vec<Row>> {
        let id = self.handle_id()?;
        Ok(self.engine.rows(id, table).await?)
    }

    fn handle_id(&self) -> Result<HandleId> {
        self.package
            .lock()
            .as_ref()
            .map(PackageHandle::id)
            .ok_or_else(|| Error::Disposed(self.uri.clone()))
    }
}

impl Disposable for PackageDocument {
    fn dispose(&self) {
        if !self.store.is_disposed() {
            let handle = self.package.lock().take();
            if let Some(handle) = handle {
                log::debug!("Freeing package {} for {}", handle.id(), self.uri);
                self.engine.free(handle);
            }
        }

        self.store.dispose();
    }
}

impl Drop for PackageDocument {
    fn drop(&mut self) {
        if let Some(handle) = self.package.get_mut().take() {
            log::warn!("{} was dropped without being disposed", self.uri);
            self.engine.free(handle);
        }
    }
}

impl std::fmt::Debug for PackageDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageDocument")
            .field("uri", &self.uri.as_str())
            .field("package", &*self.package.lock())
            .field("disposed", &self.store.is_disposed())
            .finish()
    }
}
