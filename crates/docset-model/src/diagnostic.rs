//! Diagnostic types shared across the build pipeline.
//!
//! Diagnostics are data, never control flow: every stage reports them through
//! the shared [`crate::ErrorSink`] and keeps going.

use serde::{Deserialize, Serialize};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks rendered output for the file
    Error,
    /// Should be fixed, does not gate anything
    Warning,
    /// Stylistic or informational
    Suggestion,
}

impl Severity {
    /// Parse severity from a configuration string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "suggestion" => Some(Self::Suggestion),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
            Self::Suggestion => "Suggestion",
        }
    }
}

/// A single finding reported against a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic identifier (e.g. "date-out-of-range").
    pub code: String,
    /// Severity level.
    pub severity: Severity,
    /// Metadata field the finding refers to, empty for file-level findings.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        severity: Severity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            field: field.into(),
            message: message.into(),
        }
    }

    /// File-level error diagnostic with no associated metadata field.
    pub fn file_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, "", message)
    }
}
