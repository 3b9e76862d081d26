//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use logictest::{Harness, LogOptions, QueryOutput, ResultLogWriter, Runner};

#[derive(Debug)]
pub struct ScriptError(pub String);

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ScriptError {}

/// Harness answering queries from a fixed table.
///
/// SQL starting with `FAIL` returns an error and SQL containing `PANIC` panics.
pub struct ScriptedHarness {
    engine: &'static str,
    queries: HashMap<String, QueryOutput>,
    pub executed: Vec<String>,
    pub inits: usize,
    pub fail_init: bool,
}

impl ScriptedHarness {
    pub fn new(engine: &'static str) -> Self {
        Self {
            engine,
            queries: HashMap::new(),
            executed: vec![],
            inits: 0,
            fail_init: false,
        }
    }

    pub fn with_query(mut self, sql: &str, schema: &str, rows: &[&str]) -> Self {
        self.queries.insert(
            sql.to_string(),
            QueryOutput::new(schema, rows.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    fn run(&mut self, sql: &str) -> Result<(), ScriptError> {
        self.executed.push(sql.to_string());
        if sql.contains("PANIC") {
            panic!("engine blew up\nwhile running {sql}");
        }
        if sql.starts_with("FAIL") {
            return Err(ScriptError(format!("refused {sql}")));
        }
        Ok(())
    }
}

impl Harness for ScriptedHarness {
    type Error = ScriptError;

    fn init(&mut self) -> Result<(), ScriptError> {
        self.inits += 1;
        if self.fail_init {
            return Err(ScriptError("cannot connect".to_string()));
        }
        Ok(())
    }

    fn engine_name(&self) -> &str {
        self.engine
    }

    fn execute_statement(&mut self, sql: &str) -> Result<(), ScriptError> {
        self.run(sql)
    }

    fn execute_query(&mut self, sql: &str) -> Result<QueryOutput, ScriptError> {
        self.run(sql)?;
        self.queries
            .get(sql)
            .cloned()
            .ok_or_else(|| ScriptError(format!("no such query: {sql}")))
    }
}

/// Writes a test file under `dir` and returns its path.
pub fn write_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent).unwrap();
    }
    fs_err::write(&path, content).unwrap();
    path
}

/// A runner logging into memory.
pub fn runner<H: Harness>(harness: H, options: LogOptions) -> Runner<H, Vec<u8>> {
    Runner::new(harness, ResultLogWriter::new(vec![], options))
}

/// Log lines with their leading timestamps removed.
pub fn log_lines(log: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(log)
        .lines()
        .map(|line| {
            line.split_once(' ')
                .map_or(line, |(_, rest)| rest)
                .to_string()
        })
        .collect()
}
