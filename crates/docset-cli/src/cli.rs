//! CLI argument definitions for the docset builder.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "docset",
    version,
    about = "docset - validate documentation metadata and build navigation trees",
    long_about = "Validate page metadata against a configurable rule set and assemble\n\
                  table-of-contents models ready for rendering.\n\n\
                  Files with error-severity findings are excluded from rendered output\n\
                  but still registered in the publish manifest."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build every toc.json under a docs folder.
    Build(BuildArgs),

    /// Load and check a rule configuration without building anything.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Docs folder to scan for toc.json files.
    #[arg(value_name = "DOCS_FOLDER")]
    pub docs_folder: PathBuf,

    /// Output directory for rendered artifacts (default: <DOCS_FOLDER>/_site).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Rule configuration file (default: <DOCS_FOLDER>/rules.json if present).
    #[arg(long = "rules", value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Configured output kind.
    #[arg(long = "output-type", value_enum, default_value = "html")]
    pub output_type: OutputTypeArg,

    /// Validate and report without writing output artifacts.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Enrich models with absolute PDF links.
    #[arg(long = "pdf")]
    pub pdf: bool,

    /// Site base path used for PDF links.
    #[arg(long = "base-path", value_name = "PATH", default_value = "")]
    pub base_path: String,

    /// Number of worker threads (default: available parallelism).
    #[arg(long = "jobs", value_name = "N")]
    pub jobs: Option<usize>,
}

#[derive(Parser)]
pub struct RulesArgs {
    /// Rule configuration file to check.
    #[arg(value_name = "RULES_FILE")]
    pub rules_file: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputTypeArg {
    Html,
    Other,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum LogFormatArg {
    #[default]
    Pretty,
    Compact,
    Json,
}
