use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::TocMetadata;

/// Assembled navigation model for one table-of-contents file.
///
/// Items are owned by the tree loader and opaque to this pipeline; only their
/// order matters. The model is constructed once per build and handed to the
/// template engine as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationModel {
    /// Ordered top-level navigation items.
    pub items: Vec<Value>,
    /// Typed metadata, including the optional PDF link.
    pub metadata: TocMetadata,
    /// Site path the model is published under.
    pub path: String,
}

impl NavigationModel {
    pub fn new(items: Vec<Value>, metadata: TocMetadata, path: impl Into<String>) -> Self {
        Self {
            items,
            metadata,
            path: path.into(),
        }
    }
}
