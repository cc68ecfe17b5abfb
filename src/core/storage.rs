//! Storage Access
//!
//! Reads the raw bytes behind a document location.

use std::collections::HashMap;
use std::io;

use parking_lot::Mutex;
use tower_lsp::lsp_types::Url;

/// Reads raw bytes for a location.
#[tower_lsp::async_trait]
pub trait Storage: Send + Sync {
    async fn read_bytes(&self, uri: &Url) -> io::Result<Vec<u8>>;
}

/// Reads `file:` locations from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStorage;

#[tower_lsp::async_trait]
impl Storage for FileStorage {
    async fn read_bytes(&self, uri: &Url) -> io::Result<Vec<u8>> {
        let path = uri.to_file_path().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file location: {}", uri),
            )
        })?;

        tokio::fs::read(path).await
    }
}

/// In-memory storage keyed by the location's string form.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, uri: &Url, data: impl Into<Vec<u8>>) {
        self.files.lock().insert(uri.to_string(), data.into());
    }

    pub fn remove(&self, uri: &Url) -> Option<Vec<u8>> {
        self.files.lock().remove(uri.as_str())
    }
}

#[tower_lsp::async_trait]
impl Storage for MemoryStorage {
    async fn read_bytes(&self, uri: &Url) -> io::Result<Vec<u8>> {
        self.files.lock().get(uri.as_str()).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such location: {}", uri))
        })
    }
}
