//! MSI Language Server
//!
//! Editor-side services for viewing Windows Installer packages.
//!
//! This library provides:
//! - Disposable ownership and package document lifecycle
//! - A registry deriving the active document from tab focus
//! - Custom editor and tree view providers
//! - An LSP transport connecting them to an editor

pub mod config;
pub mod core;
pub mod engine;
pub mod extension;
pub mod host;
pub mod lsp;
pub mod util;
pub mod views;

// Re-exports for clean public API
pub use config::Config;
pub use crate::core::{Disposable, PackageDocument, PackageRegistry};
pub use engine::{MsiEngine, PackageEngine};
pub use extension::{Extension, Services};
pub use host::{Host, SessionHost};
