//! Package Engine
//!
//! The contract for the external engine that parses package bytes. The
//! core only opens, frees and enumerates; it never looks inside a package.

pub mod msi;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::msi::MsiEngine;

/// Identifies a package allocated by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Exclusive ownership of one engine allocation.
///
/// Not `Clone`: [`PackageEngine::free`] consumes the handle, so a handle can
/// be released at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct PackageHandle {
    id: HandleId,
}

impl PackageHandle {
    /// Only engines should mint handles.
    pub fn new(id: HandleId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed package: {0}")]
    Malformed(String),

    #[error("unknown package handle {0}")]
    UnknownHandle(HandleId),

    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("failed to read table '{table}': {reason}")]
    Read { table: String, reason: String },

    #[error("package engine is not running")]
    Stopped,
}

/// A table declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInfo {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: String,
    pub category: Option<String>,
    pub primary_key: bool,
    pub nullable: bool,
    pub localizable: bool,
}

/// Row values keyed by column name, in column order. `None` is a null cell.
pub type Row = IndexMap<String, Option<String>>;

/// Opens package bytes into engine-owned allocations.
#[tower_lsp::async_trait]
pub trait PackageEngine: Send + Sync {
    /// Parse `data`. On failure nothing stays allocated.
    async fn open(&self, data: Vec<u8>) -> Result<PackageHandle, EngineError>;

    /// Release the allocation behind `handle`.
    fn free(&self, handle: PackageHandle);

    async fn tables(&self, id: HandleId) -> Result<Vec<TableInfo>, EngineError>;

    async fn rows(&self, id: HandleId, table: &str) -> Result<Vec<Row>, EngineError>;
}
