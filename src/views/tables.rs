//! Tables View
//!
//! Tree of tables for the active package. What the tree shows comes from a
//! pluggable [`TreeSource`].

use std::sync::Arc;

use crate::core::{PackageRegistry, Subscription};
use crate::host::{Host, TreeDataProvider, TreeItem};

/// View id the tables tree is registered under.
pub const VIEW_ID: &str = "msi.tablesView";

/// Supplies the nodes of the tables tree.
pub trait TreeSource: Send + Sync {
    fn children(&self, registry: &PackageRegistry, parent: Option<&TreeItem>) -> Vec<TreeItem>;
}

/// Shows a single `Property` table regardless of what is open.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderSource;

impl TreeSource for PlaceholderSource {
    fn children(&self, _: &PackageRegistry, _: Option<&TreeItem>) -> Vec<TreeItem> {
        // TODO: List the tables of the registry's active document once the tree layout is settled.
        vec![TreeItem::new("Property")]
    }
}

/// Gets tables from a [`PackageDocument`](crate::core::PackageDocument).
pub struct TablesViewProvider {
    registry: Arc<PackageRegistry>,
    source: Box<dyn TreeSource>,
}

impl TablesViewProvider {
    pub fn new(registry: Arc<PackageRegistry>) -> Self {
        Self::with_source(registry, PlaceholderSource)
    }

    pub fn with_source(registry: Arc<PackageRegistry>, source: impl TreeSource + 'static) -> Self {
        Self {
            registry,
            source: Box::new(source),
        }
    }

    pub fn register(host: &dyn Host, provider: TablesViewProvider) -> Subscription {
        host.register_tree_data_provider(VIEW_ID, Arc::new(provider))
    }
}

impl TreeDataProvider for TablesViewProvider {
    fn get_tree_item(&self, element: TreeItem) -> TreeItem {
        element
    }

    fn get_children(&self, element: Option<&TreeItem>) -> Option<Vec<TreeItem>> {
        Some(self.source.children(&self.registry, element))
    }
}
