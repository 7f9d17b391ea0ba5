use serde::{Deserialize, Serialize};

/// Configured output kind for the build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    /// Render HTML plus a parallel JSON view (the JSON drives PDF outlines).
    #[default]
    Html,
    /// Render only the JSON view at the primary output path.
    Other,
}

/// Read-only build configuration, passed explicitly into the builder rather
/// than read from ambient state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    pub output_type: OutputType,
    /// Validate and report without writing output artifacts.
    pub dry_run: bool,
    /// Enrich models with an absolute PDF link before rendering.
    pub output_pdf: bool,
    /// Site base path, without leading or trailing slash.
    pub base_path: String,
}
