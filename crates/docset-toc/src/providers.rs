//! Collaborator contracts consumed by the build sequence.
//!
//! Implementations own the parts deliberately outside this core: tree
//! parsing, deprecation heuristics, path computation, moniker resolution,
//! template execution, and file output. All traits are object-safe and
//! thread-safe so one set of collaborators serves every worker.

use serde_json::Value;

use docset_model::{Diagnostic, FilePath, RawMetadata, TocMetadata};

use crate::error::BuildError;

/// A parsed navigation tree: an ordered sequence of opaque top-level items.
#[derive(Debug, Clone, Default)]
pub struct NavigationTree {
    pub items: Vec<Value>,
}

/// How a file is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderType {
    /// Content-rendering file: gets an HTML view.
    Content,
    /// Data-only file: JSON view only.
    Other,
}

/// Parses a navigation-tree file. A failure here is the only one that ends a
/// file's build sequence.
pub trait TreeLoader: Send + Sync {
    fn load(&self, file: &FilePath) -> Result<NavigationTree, BuildError>;
}

/// Deep content-deprecation heuristics. Advisory only.
pub trait ContentValidator: Send + Sync {
    fn check_deprecated(&self, file: &FilePath) -> Vec<Diagnostic>;
}

/// Produces a file's raw front-matter metadata.
pub trait MetadataProvider: Send + Sync {
    fn metadata(&self, file: &FilePath) -> Result<RawMetadata, BuildError>;
}

/// Site-path, output-path, and render-type computation.
pub trait DocumentProvider: Send + Sync {
    fn site_path(&self, file: &FilePath) -> String;
    fn output_path(&self, file: &FilePath) -> String;
    fn render_type(&self, file: &FilePath) -> RenderType;
}

/// Version-group resolution.
pub trait MonikerProvider: Send + Sync {
    /// The file's moniker group, or `None` for unversioned content.
    fn file_level_moniker_group(&self, file: &FilePath) -> Option<String>;
}

/// Template execution. Template names are fixed identifiers: `toc.html.js`
/// and `toc.json.js` produce view models, `toc.html` produces markup.
pub trait TemplateEngine: Send + Sync {
    /// Run a view-model template over the navigation model.
    fn render_view(&self, template: &str, model: &Value) -> Result<Value, BuildError>;

    /// Run the HTML template over a view model.
    fn render_html(&self, template: &str, view: &Value) -> Result<String, BuildError>;
}

/// Writes output artifacts.
pub trait OutputSink: Send + Sync {
    fn write_text(&self, path: &str, content: &str) -> Result<(), BuildError>;
    fn write_json(&self, path: &str, content: &Value) -> Result<(), BuildError>;
}

/// Shared publish manifest. Registration is unconditional: every file that
/// gets past tree loading appears here, rendered or not.
pub trait PublishManifest: Send + Sync {
    fn set_publish_item(&self, file: &FilePath, metadata: Option<TocMetadata>, output_path: &str);
}
