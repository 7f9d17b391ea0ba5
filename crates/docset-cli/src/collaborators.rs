//! Filesystem-backed implementations of the build collaborator traits.
//!
//! A toc.json document carries the tree and its front matter together:
//!
//! ```json
//! {
//!   "items": [ { "name": "Overview", "href": "index.md" } ],
//!   "metadata": { "title": "Guides", "ms.author": "docsteam" },
//!   "contentType": "conceptual",
//!   "monikerGroup": "v1"
//! }
//! ```
//!
//! Each collaborator reads only the part it owns, so they stay independent
//! the way the build contract expects.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Value, json};

use docset_model::{Diagnostic, FilePath, RawMetadata, Severity, TocMetadata};
use docset_toc::{
    BuildError, ContentValidator, DocumentProvider, MetadataProvider, MonikerProvider,
    NavigationTree, OutputSink, OutputType, PublishManifest, RenderType, TemplateEngine,
    TreeLoader, url,
};

fn read_document(root: &Path, file: &FilePath) -> Result<Value, String> {
    let full = root.join(file.as_str());
    let text = std::fs::read_to_string(&full).map_err(|error| error.to_string())?;
    serde_json::from_str(&text).map_err(|error| error.to_string())
}

/// Parses the `items` array of a toc.json document.
pub struct FsTreeLoader {
    root: PathBuf,
}

impl FsTreeLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TreeLoader for FsTreeLoader {
    fn load(&self, file: &FilePath) -> Result<NavigationTree, BuildError> {
        let document = read_document(&self.root, file).map_err(BuildError::Load)?;
        match document.get("items") {
            None => Ok(NavigationTree::default()),
            Some(Value::Array(items)) => Ok(NavigationTree {
                items: items.clone(),
            }),
            Some(_) => Err(BuildError::Load("'items' must be an array".to_string())),
        }
    }
}

/// Reads the `metadata` object and `contentType` tag of a toc.json document.
pub struct FsMetadataProvider {
    root: PathBuf,
}

impl FsMetadataProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MetadataProvider for FsMetadataProvider {
    fn metadata(&self, file: &FilePath) -> Result<RawMetadata, BuildError> {
        let document = read_document(&self.root, file).map_err(BuildError::Metadata)?;
        let fields = match document.get("metadata") {
            Some(Value::Object(fields)) => fields.clone(),
            _ => serde_json::Map::new(),
        };
        let content_type = document
            .get("contentType")
            .and_then(Value::as_str)
            .unwrap_or("toc");
        Ok(RawMetadata::new(fields, content_type))
    }
}

/// Advisory scan for trees whose front matter marks them deprecated.
pub struct DeprecationScan {
    root: PathBuf,
}

impl DeprecationScan {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentValidator for DeprecationScan {
    fn check_deprecated(&self, file: &FilePath) -> Vec<Diagnostic> {
        let Ok(document) = read_document(&self.root, file) else {
            // Unreadable files are the tree loader's problem, not an advisory.
            return Vec::new();
        };
        let deprecated = document
            .get("metadata")
            .and_then(|metadata| metadata.get("deprecated"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if deprecated {
            vec![Diagnostic::new(
                "toc-deprecated",
                Severity::Suggestion,
                "deprecated",
                format!("'{file}' is marked deprecated; consider retiring it."),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Derives site and output paths from the file's repository path.
pub struct FsDocumentProvider {
    output_type: OutputType,
}

impl FsDocumentProvider {
    pub fn new(output_type: OutputType) -> Self {
        Self { output_type }
    }
}

impl DocumentProvider for FsDocumentProvider {
    fn site_path(&self, file: &FilePath) -> String {
        file.as_str().to_string()
    }

    fn output_path(&self, file: &FilePath) -> String {
        match self.output_type {
            OutputType::Html => url::change_extension(file.as_str(), ".html"),
            OutputType::Other => url::change_extension(file.as_str(), ".json"),
        }
    }

    fn render_type(&self, _file: &FilePath) -> RenderType {
        // Every discovered toc file renders as site content.
        RenderType::Content
    }
}

/// Reads the optional `monikerGroup` tag of a toc.json document.
pub struct TocMonikerProvider {
    root: PathBuf,
}

impl TocMonikerProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MonikerProvider for TocMonikerProvider {
    fn file_level_moniker_group(&self, file: &FilePath) -> Option<String> {
        read_document(&self.root, file)
            .ok()?
            .get("monikerGroup")?
            .as_str()
            .map(str::to_string)
    }
}

/// Built-in templates: the JSON view is the model itself and the HTML view is
/// a plain nested list.
pub struct NavTemplates;

impl TemplateEngine for NavTemplates {
    fn render_view(&self, _template: &str, model: &Value) -> Result<Value, BuildError> {
        Ok(model.clone())
    }

    fn render_html(&self, template: &str, view: &Value) -> Result<String, BuildError> {
        let items = view
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| BuildError::Render {
                template: template.to_string(),
                message: "view model has no items".to_string(),
            })?;
        let mut html = String::from("<nav><ul>");
        render_items(&mut html, items);
        html.push_str("</ul></nav>");
        Ok(html)
    }
}

fn render_items(html: &mut String, items: &[Value]) {
    for item in items {
        let name = item.get("name").and_then(Value::as_str).unwrap_or("");
        html.push_str("<li>");
        match item.get("href").and_then(Value::as_str) {
            Some(href) => {
                html.push_str("<a href=\"");
                html.push_str(&escape_html(href));
                html.push_str("\">");
                html.push_str(&escape_html(name));
                html.push_str("</a>");
            }
            None => html.push_str(&escape_html(name)),
        }
        if let Some(Value::Array(children)) = item.get("items") {
            html.push_str("<ul>");
            render_items(html, children);
            html.push_str("</ul>");
        }
        html.push_str("</li>");
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Writes artifacts under the output directory, creating parents as needed.
pub struct FsOutput {
    root: PathBuf,
}

impl FsOutput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn prepare(&self, path: &str) -> Result<PathBuf, BuildError> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).map_err(|error| BuildError::Write {
                path: path.to_string(),
                message: error.to_string(),
            })?;
        }
        Ok(full)
    }
}

impl OutputSink for FsOutput {
    fn write_text(&self, path: &str, content: &str) -> Result<(), BuildError> {
        let full = self.prepare(path)?;
        std::fs::write(full, content).map_err(|error| BuildError::Write {
            path: path.to_string(),
            message: error.to_string(),
        })
    }

    fn write_json(&self, path: &str, content: &Value) -> Result<(), BuildError> {
        let text = serde_json::to_string_pretty(content).map_err(|error| BuildError::Write {
            path: path.to_string(),
            message: error.to_string(),
        })?;
        self.write_text(path, &text)
    }
}

/// In-memory publish manifest, serialized to `.publish.json` after the build.
#[derive(Default)]
pub struct JsonPublishManifest {
    items: Mutex<BTreeMap<FilePath, String>>,
}

impl JsonPublishManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("manifest lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize the manifest. Entries carry no metadata payload at this
    /// stage; a later finalization pass attaches it.
    pub fn to_json(&self) -> Value {
        let items = self.items.lock().expect("manifest lock poisoned");
        let files: Vec<Value> = items
            .iter()
            .map(|(file, output_path)| json!({"path": file, "outputPath": output_path}))
            .collect();
        json!({ "files": files })
    }

    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(&self.to_json())?;
        std::fs::write(path, text)
    }
}

impl PublishManifest for JsonPublishManifest {
    fn set_publish_item(&self, file: &FilePath, _metadata: Option<TocMetadata>, output_path: &str) {
        self.items
            .lock()
            .expect("manifest lock poisoned")
            .insert(file.clone(), output_path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_rendering_escapes_and_nests() {
        let view = json!({"items": [
            {"name": "A & B", "href": "a.md", "items": [
                {"name": "Child", "href": "b.md"}
            ]},
            {"name": "No link"}
        ]});
        let html = NavTemplates
            .render_html("toc.html", &view)
            .expect("render html");
        assert!(html.contains("<a href=\"a.md\">A &amp; B</a>"));
        assert!(html.contains("<ul><li><a href=\"b.md\">Child</a></li></ul>"));
        assert!(html.contains("<li>No link</li>"));
    }

    #[test]
    fn manifest_serializes_sorted_entries() {
        let manifest = JsonPublishManifest::new();
        manifest.set_publish_item(&FilePath::new("b/toc.json"), None, "b/toc.html");
        manifest.set_publish_item(&FilePath::new("a/toc.json"), None, "a/toc.html");
        let json = manifest.to_json();
        assert_eq!(json["files"][0]["path"], "a/toc.json");
        assert_eq!(json["files"][1]["outputPath"], "b/toc.html");
    }

    #[test]
    fn document_provider_swaps_extension_per_output_type() {
        let file = FilePath::new("guide/toc.json");
        let html = FsDocumentProvider::new(OutputType::Html);
        assert_eq!(html.output_path(&file), "guide/toc.html");
        let other = FsDocumentProvider::new(OutputType::Other);
        assert_eq!(other.output_path(&file), "guide/toc.json");
    }
}
