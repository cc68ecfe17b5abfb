//! View Providers
//!
//! The custom editor and tree view that present open packages.

pub mod rows;
pub mod tables;

pub use rows::RowsViewer;
pub use tables::{PlaceholderSource, TablesViewProvider, TreeSource};
