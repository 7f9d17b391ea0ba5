//! Per-file build sequence.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use docset_model::{Diagnostic, ErrorSink, FilePath, NavigationModel, Severity};
use docset_validate::MetadataValidator;

use crate::config::{BuildConfig, OutputType};
use crate::error::BuildError;
use crate::providers::{
    ContentValidator, DocumentProvider, MetadataProvider, MonikerProvider, OutputSink,
    PublishManifest, RenderType, TemplateEngine, TreeLoader,
};
use crate::url::{change_extension, combine};

/// View-model template for HTML rendering.
pub const TOC_HTML_VIEW_TEMPLATE: &str = "toc.html.js";
/// Markup template for HTML rendering.
pub const TOC_HTML_TEMPLATE: &str = "toc.html";
/// View-model template for the JSON rendition (also drives PDF outlines).
pub const TOC_JSON_TEMPLATE: &str = "toc.json.js";

/// Fixed route segment under which PDF renditions are published.
const PDF_ROUTE: &str = "opbuildpdf";

/// Orchestrates the per-file build sequence.
///
/// Holds no mutable state; a single instance serves all worker threads. Each
/// `build` call is independent apart from the shared error sink and publish
/// manifest.
pub struct TocBuilder {
    config: BuildConfig,
    tree_loader: Arc<dyn TreeLoader>,
    content_validator: Arc<dyn ContentValidator>,
    metadata_provider: Arc<dyn MetadataProvider>,
    metadata_validator: MetadataValidator,
    document_provider: Arc<dyn DocumentProvider>,
    moniker_provider: Arc<dyn MonikerProvider>,
    template_engine: Arc<dyn TemplateEngine>,
    output: Arc<dyn OutputSink>,
    publish_manifest: Arc<dyn PublishManifest>,
}

impl TocBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: BuildConfig,
        tree_loader: Arc<dyn TreeLoader>,
        content_validator: Arc<dyn ContentValidator>,
        metadata_provider: Arc<dyn MetadataProvider>,
        metadata_validator: MetadataValidator,
        document_provider: Arc<dyn DocumentProvider>,
        moniker_provider: Arc<dyn MonikerProvider>,
        template_engine: Arc<dyn TemplateEngine>,
        output: Arc<dyn OutputSink>,
        publish_manifest: Arc<dyn PublishManifest>,
    ) -> Self {
        Self {
            config,
            tree_loader,
            content_validator,
            metadata_provider,
            metadata_validator,
            document_provider,
            moniker_provider,
            template_engine,
            output,
            publish_manifest,
        }
    }

    /// Build one table-of-contents file.
    ///
    /// Steps run strictly in order. Only a tree-load failure ends the
    /// sequence early; every other failure becomes a diagnostic and the
    /// sequence still runs through publish registration, so metadata errors
    /// never suppress TOC assembly for navigation purposes.
    pub fn build(&self, errors: &ErrorSink, file: &FilePath) {
        let tree = match self.tree_loader.load(file) {
            Ok(tree) => tree,
            Err(error) => {
                errors.add(file, Diagnostic::file_error(error.code(), error.to_string()));
                return;
            }
        };

        errors.extend(file, self.content_validator.check_deprecated(file));

        let raw_metadata = match self.metadata_provider.metadata(file) {
            Ok(metadata) => metadata,
            Err(error) => {
                errors.add(file, Diagnostic::file_error(error.code(), error.to_string()));
                docset_model::RawMetadata::default()
            }
        };

        let mut toc_metadata = self
            .metadata_validator
            .validate(errors, file, &raw_metadata);

        let site_path = self.document_provider.site_path(file);
        let output_path = self.document_provider.output_path(file);

        if self.config.output_pdf {
            let moniker_group = self
                .moniker_provider
                .file_level_moniker_group(file)
                .unwrap_or_default();
            toc_metadata.pdf_absolute_path = Some(format!(
                "/{}",
                combine([
                    self.config.base_path.as_str(),
                    PDF_ROUTE,
                    moniker_group.as_str(),
                    change_extension(&site_path, ".pdf").as_str(),
                ])
            ));
        }

        let model = NavigationModel::new(tree.items, toc_metadata, site_path);

        if !errors.file_has_error(file) && !self.config.dry_run {
            if let Err(error) = self.render(file, &model, &output_path) {
                errors.add(file, Diagnostic::file_error(error.code(), error.to_string()));
            }
        } else {
            debug!(%file, "skipping render");
        }

        // The manifest always records where the logical output would live,
        // so the build report stays complete even for files with errors.
        self.publish_manifest.set_publish_item(file, None, &output_path);
    }

    fn render(
        &self,
        file: &FilePath,
        model: &NavigationModel,
        output_path: &str,
    ) -> Result<(), BuildError> {
        let model_value = serde_json::to_value(model).map_err(|error| BuildError::Render {
            template: TOC_JSON_TEMPLATE.to_string(),
            message: error.to_string(),
        })?;

        match self.config.output_type {
            OutputType::Html => {
                if self.document_provider.render_type(file) == RenderType::Content {
                    let view = self
                        .template_engine
                        .render_view(TOC_HTML_VIEW_TEMPLATE, &model_value)?;
                    let html = self.template_engine.render_html(TOC_HTML_TEMPLATE, &view)?;
                    self.output.write_text(output_path, &html)?;
                }

                // The JSON view always exists alongside HTML output; the PDF
                // outline generator consumes it.
                let json = self.render_json(&model_value)?;
                self.output
                    .write_json(&change_extension(output_path, ".json"), &json)?;
            }
            OutputType::Other => {
                let json = self.render_json(&model_value)?;
                self.output.write_json(output_path, &json)?;
            }
        }
        Ok(())
    }

    fn render_json(&self, model_value: &Value) -> Result<Value, BuildError> {
        self.template_engine
            .render_view(TOC_JSON_TEMPLATE, model_value)
    }
}
