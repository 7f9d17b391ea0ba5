//! Build-step failures reported by collaborators.
//!
//! These never cross the orchestrator boundary as errors: the builder turns
//! each one into a diagnostic against the current file and carries on (only
//! a tree-load failure ends the file's sequence early).

use thiserror::Error;

/// Failure of one collaborator call within a file's build sequence.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The navigation-tree file could not be loaded or parsed.
    #[error("failed to load navigation tree: {0}")]
    Load(String),

    /// The metadata provider could not produce raw metadata.
    #[error("failed to read metadata: {0}")]
    Metadata(String),

    /// A template failed to render.
    #[error("template '{template}' failed: {message}")]
    Render { template: String, message: String },

    /// An output artifact could not be written.
    #[error("failed to write '{path}': {message}")]
    Write { path: String, message: String },
}

impl BuildError {
    /// Stable diagnostic code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Load(_) => "invalid-toc-syntax",
            Self::Metadata(_) => "invalid-metadata",
            Self::Render { .. } => "render-failure",
            Self::Write { .. } => "output-write-failure",
        }
    }
}
