use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use logictest::analyzer::analyze_statements;
use logictest::config::Config;
use logictest::result_log::{parse_result_file, parse_result_file_with_duration};
use logictest::{LogOptions, ResultLogWriter, Runner, SqliteHarness};

use crate::formatter::{self, LogReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Verify,
    Generate,
    Filter,
}

/// Runs the test files under `paths` against SQLite.
pub fn run_suite(mode: RunMode, config: &Config, paths: &[PathBuf]) -> anyhow::Result<()> {
    let start = Instant::now();
    tracing::debug!(?mode, files = paths.len(), log_file = ?config.log.file, "starting run");
    let sink = open_log_sink(config.log.file.as_deref())?;
    let options = LogOptions::from_config(&config.log, &config.suite.root_dir);
    let harness = SqliteHarness::new().context("Failed to open SQLite database")?;

    let mut runner = Runner::new(harness, ResultLogWriter::new(sink, options))
        .with_suite_config(config.suite.clone())
        .with_hash_threshold(config.engine.hash_threshold);

    match mode {
        RunMode::Verify => {
            let summary = runner.run_test_files(paths)?;
            formatter::print_summary(&summary, start.elapsed());
        }
        RunMode::Generate => {
            let written = runner.generate_test_files(paths)?;
            formatter::print_generated(&written, start.elapsed());
        }
        RunMode::Filter => {
            let written = runner.filter_test_files(paths)?;
            formatter::print_generated(&written, start.elapsed());
        }
    }
    Ok(())
}

pub fn analyze(config: &Config, engine: &str, paths: &[PathBuf]) -> anyhow::Result<()> {
    let counts = analyze_statements(paths, &config.suite.extension, engine)?;
    print!("{counts}");
    Ok(())
}

pub fn report(logs: &[PathBuf], durations: bool) -> anyhow::Result<()> {
    let mut entries = vec![];
    for log in logs {
        let parsed = if durations {
            parse_result_file_with_duration(log)
        } else {
            parse_result_file(log)
        }
        .with_context(|| format!("Failed to parse result log {}", log.display()))?;
        entries.extend(parsed);
    }
    formatter::print_report(&LogReport::from_entries(&entries));
    Ok(())
}

fn open_log_sink(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = fs_err::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    })
}
