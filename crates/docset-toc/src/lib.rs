//! Table-of-contents build orchestration.
//!
//! One [`TocBuilder::build`] call runs the full per-file sequence: tree load,
//! deprecation check, metadata validation, model assembly, PDF-path
//! enrichment, conditional rendering, and publish registration. Everything
//! the sequence consumes — tree parsing, path computation, templates, output
//! writing — sits behind the collaborator traits in [`providers`].

pub mod builder;
pub mod config;
pub mod error;
pub mod providers;
pub mod url;

pub use builder::TocBuilder;
pub use config::{BuildConfig, OutputType};
pub use error::BuildError;
pub use providers::{
    ContentValidator, DocumentProvider, MetadataProvider, MonikerProvider, NavigationTree,
    OutputSink, PublishManifest, RenderType, TemplateEngine, TreeLoader,
};
