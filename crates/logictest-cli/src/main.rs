use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use logictest::config::Config;

mod commands;
mod formatter;

use commands::RunMode;

#[derive(Parser, Debug)]
#[command(name = "logictest")]
#[command(version)]
#[command(about = "Runs sqllogictest files and reports one result line per record")]
#[command(long_about = "Runs sqllogictest files and reports one result line per record

MODES:
  verify     Run the test files, writing a pass / fail line for each record
  generate   Run like verify, and write <file>.generated with the observed results
  filter     Run like generate, but leave records that fail to execute out of the copy
  analyze    Count statement types used across the test files
  report     Summarize result logs written by verify

Directories are walked recursively for files with the .test extension.

CONFIGURATION:
  Settings can be configured in ~/.logictestrc (TOML format):
    [log]
    truncate_queries = false       # Shorten queries longer than 50 chars
    durations = false              # Write execution time of each record
    file = \"results.log\"           # Append log lines here instead of stdout

    [suite]
    extension = \".test\"            # Extension of collected test files
    root_dir = \"test\"              # Log paths are cut off at this directory
    generated_suffix = \".generated\"

    [engine]
    hash_threshold = 8             # Override hash-threshold of every query

  SQLLOGICTEST_TRUNCATE_QUERIES, when set, turns query truncation on.
  RUST_LOG controls diagnostics written to stderr (default: warn).")]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Configuration file (default: ~/.logictestrc)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run test files and log a result for each record
    Verify(RunArgs),
    /// Run test files and write copies holding the observed results
    Generate(RunArgs),
    /// Run test files and write copies without the records that failed
    Filter(RunArgs),
    /// Count statement types used by the test files
    Analyze {
        /// Records excluded for this engine by skipif/onlyif are not counted
        #[arg(long, default_value = "mysql")]
        engine: String,

        #[arg(required = true, value_name = "PATHS")]
        paths: Vec<PathBuf>,
    },
    /// Summarize result logs
    Report {
        /// The logs were written with durations
        #[arg(long)]
        durations: bool,

        #[arg(required = true, value_name = "LOGS")]
        logs: Vec<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Append result lines to this file instead of writing them to stdout
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Write the execution time of each record
    #[arg(long)]
    durations: bool,

    /// Shorten queries longer than 50 characters
    #[arg(long)]
    truncate_queries: bool,

    /// Test files or directories
    #[arg(required = true, value_name = "PATHS")]
    paths: Vec<PathBuf>,
}

impl RunArgs {
    /// Command-line flags override the configuration file.
    fn apply(&self, config: &mut Config) {
        config.log.durations |= self.durations;
        config.log.truncate_queries |= self.truncate_queries;
        if let Some(file) = &self.log_file {
            config.log.file = Some(file.clone());
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for the result log
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init()
        .ok();

    let mut config = load_config(cli.config.as_deref())?;

    match cli.mode {
        Mode::Verify(args) => run(RunMode::Verify, &args, &mut config),
        Mode::Generate(args) => run(RunMode::Generate, &args, &mut config),
        Mode::Filter(args) => run(RunMode::Filter, &args, &mut config),
        Mode::Analyze { engine, paths } => commands::analyze(&config, &engine, &paths),
        Mode::Report { durations, logs } => commands::report(&logs, durations),
    }
}

fn run(mode: RunMode, args: &RunArgs, config: &mut Config) -> anyhow::Result<()> {
    args.apply(config);
    commands::run_suite(mode, config, &args.paths)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config file {}", path.display())),
        None => Config::load().context("Failed to load ~/.logictestrc"),
    }
}
