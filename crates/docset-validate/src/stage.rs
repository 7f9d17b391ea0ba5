//! Metadata validation stage.
//!
//! Runs the rule engine over a file's raw metadata and, independently of the
//! rule outcomes, coerces the typed navigation-metadata shape. Both kinds of
//! findings land in the shared sink; the stage always returns a best-effort
//! typed object so downstream stages can proceed.

use std::sync::Arc;

use serde_json::Value;

use docset_model::{Diagnostic, ErrorSink, FilePath, RawMetadata, Severity, TocMetadata};

use crate::engine::RuleEngine;
use crate::rules::RuleSet;

/// Diagnostic code for typed-metadata coercion failures, distinct from any
/// rule code.
pub const INVALID_METADATA_TYPE: &str = "invalid-metadata-type";

/// Validates raw metadata and coerces it into [`TocMetadata`].
pub struct MetadataValidator {
    rule_set: Arc<RuleSet>,
    engine: RuleEngine,
}

impl MetadataValidator {
    pub fn new(rule_set: Arc<RuleSet>, engine: RuleEngine) -> Self {
        Self { rule_set, engine }
    }

    /// Validate one file's metadata.
    ///
    /// Pure apart from diagnostics: identical inputs yield identical
    /// diagnostics and an identical typed object.
    pub fn validate(
        &self,
        errors: &ErrorSink,
        file: &FilePath,
        metadata: &RawMetadata,
    ) -> TocMetadata {
        errors.extend(file, self.engine.evaluate(&self.rule_set, metadata));

        TocMetadata {
            title: coerce_string(errors, file, metadata, "title"),
            pdf_absolute_path: coerce_string(errors, file, metadata, "pdfAbsolutePath"),
        }
    }
}

/// Coerce one string-typed field. A mismatch is reported and the field is
/// dropped; other fields are unaffected.
fn coerce_string(
    errors: &ErrorSink,
    file: &FilePath,
    metadata: &RawMetadata,
    field: &str,
) -> Option<String> {
    match metadata.get(field) {
        None => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => {
            errors.add(
                file,
                Diagnostic::new(
                    INVALID_METADATA_TYPE,
                    Severity::Warning,
                    field,
                    format!("Field '{field}' must be a string, found {}.", shape_of(other)),
                ),
            );
            None
        }
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
