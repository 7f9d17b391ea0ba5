//! Raw and typed page metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw front-matter metadata as produced by the metadata provider.
///
/// Values are untyped JSON: scalars, sequences, or nested structures. The
/// validation stage interprets them against the rule set and coerces the
/// subset it understands into [`TocMetadata`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMetadata {
    /// Field name to raw value.
    #[serde(default)]
    pub fields: Map<String, Value>,
    /// Document classification tag used to scope validation rules.
    #[serde(default)]
    pub content_type: String,
}

impl RawMetadata {
    pub fn new(fields: Map<String, Value>, content_type: impl Into<String>) -> Self {
        Self {
            fields,
            content_type: content_type.into(),
        }
    }

    /// Raw value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// Typed metadata attached to a navigation model.
///
/// Coerced best-effort from [`RawMetadata`]: a type mismatch on one field is
/// reported as a diagnostic and leaves the other fields intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TocMetadata {
    /// Display title for the navigation tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Absolute link to the PDF rendition, filled in when PDF output is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_absolute_path: Option<String>,
}
