//! docset CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

use docset_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputTypeArg};
use docset_cli::logging::{LogConfig, LogFormat, init_logging};
use docset_cli::pipeline::{BuildOptions, run_build};
use docset_cli::summary::{print_rules, print_summary};
use docset_toc::OutputType;
use docset_validate::load_rules;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Build(args) => {
            let options = BuildOptions {
                output_dir: args
                    .output_dir
                    .clone()
                    .unwrap_or_else(|| args.docs_folder.join("_site")),
                docs_folder: args.docs_folder,
                rules_file: args.rules,
                output_type: match args.output_type {
                    OutputTypeArg::Html => OutputType::Html,
                    OutputTypeArg::Other => OutputType::Other,
                },
                dry_run: args.dry_run,
                output_pdf: args.pdf,
                base_path: args.base_path,
                jobs: args.jobs,
            };
            match run_build(&options) {
                Ok(outcome) => {
                    print_summary(&outcome);
                    if outcome.has_errors() { 1 } else { 0 }
                }
                Err(error) => {
                    eprintln!("error: {error:#}");
                    1
                }
            }
        }
        Command::Rules(args) => match load_rules(&args.rules_file) {
            Ok(config) => {
                print_rules(&config);
                0
            }
            Err(error) => {
                eprintln!("error: {error}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
