//! LSP Protocol Implementation
//!
//! Connects the extension to an editor over JSON-RPC on stdio.

pub mod backend;
pub mod handlers;
pub mod panel;
pub mod protocol;
pub mod server;

pub use backend::Backend;
pub use server::{build_service, serve};
