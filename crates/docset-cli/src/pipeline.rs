//! Build driver: rule loading, TOC discovery, and parallel per-file builds.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use docset_model::{Diagnostic, ErrorSink, FilePath, Severity};
use docset_toc::{BuildConfig, OutputType, PublishManifest, TocBuilder};
use docset_validate::{
    MetadataValidator, RuleEngine, RulesConfig, StaticAliasDirectory, load_rules,
};

use crate::collaborators::{
    DeprecationScan, FsDocumentProvider, FsMetadataProvider, FsOutput, FsTreeLoader,
    JsonPublishManifest, NavTemplates, TocMonikerProvider,
};

/// Resolved options for one build run.
#[derive(Debug)]
pub struct BuildOptions {
    pub docs_folder: PathBuf,
    pub output_dir: PathBuf,
    pub rules_file: Option<PathBuf>,
    pub output_type: OutputType,
    pub dry_run: bool,
    pub output_pdf: bool,
    pub base_path: String,
    pub jobs: Option<usize>,
}

/// What one build run produced.
#[derive(Debug)]
pub struct BuildOutcome {
    pub files: Vec<FilePath>,
    pub report: BTreeMap<FilePath, Vec<Diagnostic>>,
    pub published: usize,
    pub manifest_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl BuildOutcome {
    /// True when any file carries an error-severity diagnostic.
    pub fn has_errors(&self) -> bool {
        self.report
            .values()
            .flatten()
            .any(|diagnostic| diagnostic.severity == Severity::Error)
    }

    /// Total diagnostic count at one severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.report
            .values()
            .flatten()
            .filter(|diagnostic| diagnostic.severity == severity)
            .count()
    }
}

/// Load the rule configuration for a docs folder.
///
/// An explicit `--rules` path must exist; otherwise `rules.json` inside the
/// docs folder is used when present, and an empty configuration otherwise.
pub fn load_build_rules(options: &BuildOptions) -> Result<RulesConfig> {
    let path = match &options.rules_file {
        Some(path) => path.clone(),
        None => {
            let default = options.docs_folder.join("rules.json");
            if !default.exists() {
                info!("no rules.json found; metadata validation is limited to type coercion");
                return Ok(RulesConfig::default());
            }
            default
        }
    };
    let config =
        load_rules(&path).with_context(|| format!("load rules from {}", path.display()))?;
    info!(
        rules = config.rule_set.rule_count(),
        fields = config.rule_set.field_count(),
        "loaded rule configuration"
    );
    Ok(config)
}

/// Alias directory from an optional `aliases.json` (alias to owning list).
fn load_alias_directory(docs_folder: &Path) -> Result<StaticAliasDirectory> {
    let path = docs_folder.join("aliases.json");
    if !path.exists() {
        return Ok(StaticAliasDirectory::new());
    }
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("read {}", path.display()))?;
    let owners: BTreeMap<String, String> =
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    let mut directory = StaticAliasDirectory::new();
    for (alias, list) in owners {
        directory.insert(alias, list);
    }
    Ok(directory)
}

/// Find every toc.json under the docs folder.
///
/// Directories starting with `.` or `_` are skipped, as is the output
/// directory itself.
pub fn discover_toc_files(root: &Path, output_dir: &Path) -> Result<Vec<FilePath>> {
    let mut files = Vec::new();
    walk(root, root, output_dir, &mut files)
        .with_context(|| format!("scan {}", root.display()))?;
    files.sort();
    Ok(files)
}

fn walk(
    root: &Path,
    dir: &Path,
    output_dir: &Path,
    files: &mut Vec<FilePath>,
) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if path.is_dir() {
            if name.starts_with('.') || name.starts_with('_') || path == output_dir {
                continue;
            }
            walk(root, &path, output_dir, files)?;
        } else if name == "toc.json" {
            let relative = path.strip_prefix(root).unwrap_or(&path);
            files.push(FilePath::new(relative.to_string_lossy()));
        }
    }
    Ok(())
}

/// Run a full build: discover, validate, render, publish.
pub fn run_build(options: &BuildOptions) -> Result<BuildOutcome> {
    let rules = load_build_rules(options)?;
    let directory = load_alias_directory(&options.docs_folder)?;
    let files = discover_toc_files(&options.docs_folder, &options.output_dir)?;
    info!(files = files.len(), "discovered toc files");

    let engine = RuleEngine::new(
        Utc::now(),
        Arc::new(rules.allow_lists),
        Arc::new(directory),
    );
    let validator = MetadataValidator::new(Arc::new(rules.rule_set), engine);

    let config = BuildConfig {
        output_type: options.output_type,
        dry_run: options.dry_run,
        output_pdf: options.output_pdf,
        base_path: options.base_path.clone(),
    };
    let manifest = Arc::new(JsonPublishManifest::new());
    let builder = TocBuilder::new(
        config,
        Arc::new(FsTreeLoader::new(&options.docs_folder)),
        Arc::new(DeprecationScan::new(&options.docs_folder)),
        Arc::new(FsMetadataProvider::new(&options.docs_folder)),
        validator,
        Arc::new(FsDocumentProvider::new(options.output_type)),
        Arc::new(TocMonikerProvider::new(&options.docs_folder)),
        Arc::new(NavTemplates),
        Arc::new(FsOutput::new(&options.output_dir)),
        Arc::clone(&manifest) as Arc<dyn PublishManifest>,
    );

    let errors = ErrorSink::new();
    let jobs = options
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        });
    run_parallel(&builder, &errors, &files, jobs);

    let manifest_path = if options.dry_run {
        None
    } else {
        std::fs::create_dir_all(&options.output_dir)
            .with_context(|| format!("create {}", options.output_dir.display()))?;
        let path = options.output_dir.join(".publish.json");
        manifest
            .write_to(&path)
            .with_context(|| format!("write {}", path.display()))?;
        Some(path)
    };

    Ok(BuildOutcome {
        published: manifest.len(),
        files,
        report: errors.into_report(),
        manifest_path,
        output_dir: options.output_dir.clone(),
    })
}

/// Build files across worker threads. Files are independent; workers pull
/// the next index from a shared counter.
fn run_parallel(builder: &TocBuilder, errors: &ErrorSink, files: &[FilePath], jobs: usize) {
    let next = AtomicUsize::new(0);
    let workers = jobs.min(files.len()).max(1);
    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(file) = files.get(index) else {
                        break;
                    };
                    debug!(%file, "building toc");
                    builder.build(errors, file);
                }
            });
        }
    });
}
