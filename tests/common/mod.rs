//! Shared fakes for integration tests
#![allow(dead_code)]

use std::collections::HashSet;
use std::io::{self, Cursor};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use msi_language_server::core::{MemoryStorage, PackageDocument, Storage};
use msi_language_server::engine::{
    ColumnInfo, EngineError, HandleId, PackageEngine, PackageHandle, Row, TableInfo,
};
use tower_lsp::lsp_types::Url;

/// Header every package accepted by [`CountingEngine`] starts with.
pub const MAGIC: &[u8] = b"FAKEPKG1";

/// Bytes [`CountingEngine`] accepts.
pub fn well_formed() -> Vec<u8> {
    let mut data = MAGIC.to_vec();
    data.extend_from_slice(b"tables");
    data
}

/// Bytes [`CountingEngine`] rejects.
pub fn truncated() -> Vec<u8> {
    MAGIC[..3].to_vec()
}

/// Engine that tracks every allocation it hands out.
#[derive(Default)]
pub struct CountingEngine {
    next_id: AtomicU64,
    opens: AtomicUsize,
    frees: AtomicUsize,
    live: Mutex<HashSet<HandleId>>,
}

impl CountingEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Successful opens
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    pub fn live(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    fn check(&self, id: HandleId) -> Result<(), EngineError> {
        if self.live.lock().unwrap().contains(&id) {
            Ok(())
        } else {
            Err(EngineError::UnknownHandle(id))
        }
    }
}

#[tower_lsp::async_trait]
impl PackageEngine for CountingEngine {
    async fn open(&self, data: Vec<u8>) -> Result<PackageHandle, EngineError> {
        if !data.starts_with(MAGIC) {
            return Err(EngineError::Malformed("missing header".to_string()));
        }

        let id = HandleId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.live.lock().unwrap().insert(id);
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(PackageHandle::new(id))
    }

    fn free(&self, handle: PackageHandle) {
        assert!(
            self.live.lock().unwrap().remove(&handle.id()),
            "handle {} freed twice",
            handle.id()
        );
        self.frees.fetch_add(1, Ordering::SeqCst);
    }

    async fn tables(&self, id: HandleId) -> Result<Vec<TableInfo>, EngineError> {
        self.check(id)?;
        Ok(vec![TableInfo {
            name: "Property".to_string(),
            columns: vec![ColumnInfo {
                name: "Property".to_string(),
                column_type: "VARCHAR(72)".to_string(),
                category: Some("Identifier".to_string()),
                primary_key: true,
                nullable: false,
                localizable: false,
            }],
        }])
    }

    async fn rows(&self, id: HandleId, table: &str) -> Result<Vec<Row>, EngineError> {
        self.check(id)?;
        if table != "Property" {
            return Err(EngineError::TableNotFound(table.to_string()));
        }

        let mut row = Row::new();
        row.insert("Property".to_string(), Some("ProductName".to_string()));
        Ok(vec![row])
    }
}

/// Storage whose reads never complete.
pub struct PendingStorage;

#[tower_lsp::async_trait]
impl Storage for PendingStorage {
    async fn read_bytes(&self, _: &Url) -> io::Result<Vec<u8>> {
        std::future::pending().await
    }
}

pub fn uri(value: &str) -> Url {
    Url::parse(value).expect("valid uri")
}

/// Storage holding `entries` as (location, bytes) pairs.
pub fn storage(entries: &[(&str, Vec<u8>)]) -> Arc<MemoryStorage> {
    let storage = MemoryStorage::new();
    for (location, data) in entries {
        storage.insert(&uri(location), data.clone());
    }
    Arc::new(storage)
}

/// Open `location` from `storage` with `engine`, panicking on failure.
pub async fn open(
    location: &str,
    storage: &MemoryStorage,
    engine: &Arc<CountingEngine>,
) -> Arc<PackageDocument> {
    PackageDocument::open(uri(location), storage, engine.clone())
        .await
        .expect("open document")
}

/// A minimal Windows Installer database with one `Property` row.
pub fn sample_msi() -> Vec<u8> {
    let mut package = msi::Package::create(msi::PackageType::Installer, Cursor::new(Vec::new()))
        .expect("create package");
    package
        .create_table(
            "Property",
            vec![
                msi::Column::build("Property").primary_key().string(72),
                msi::Column::build("Value").nullable().string(0),
            ],
        )
        .expect("create table");
    package
        .insert_rows(
            msi::Insert::into("Property")
                .row(vec![msi::Value::from("ProductName"), msi::Value::from("Sample")]),
        )
        .expect("insert rows");

    package.into_inner().expect("flush package").into_inner()
}
