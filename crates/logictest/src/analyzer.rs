//! Statement usage statistics across a test suite.

use std::fmt;
use std::path::Path;

use itertools::Itertools;

use crate::collect::collect_test_files;
use crate::error_handling::TestError;
use crate::parser::{parse_file, Record};

/// Statement prefixes that are counted. Overlapping prefixes are all counted, so a
/// `CREATE TABLE` statement also counts as `CREATE`.
pub const STATEMENT_PREFIXES: &[&str] = &[
    "ALTER ",
    "ALTER TABLE ",
    "ALTER DATABASE ",
    "ALTER VIEW ",
    "ALTER EVENT ",
    "ALTER TABLESPACE ",
    "ALTER UNDO TABLESPACE ",
    "ALTER LOGFILE GROUP ",
    "ALTER SERVER ",
    "CREATE ",
    "CREATE TABLE ",
    "CREATE DATABASE ",
    "CREATE FUNCTION ",
    "CREATE PROCEDURE ",
    "CREATE VIEW ",
    "CREATE TRIGGER ",
    "CREATE INDEX ",
    "CREATE UNIQUE INDEX ",
    "CREATE ROLE ",
    "DROP ",
    "DROP INDEX ",
    "DROP PROCEDURE ",
    "DROP TABLE ",
    "DROP TRIGGER ",
    "DROP VIEW ",
    "RENAME TABLE ",
    "RENAME TABLES ",
    "TRUNCATE TABLE ",
    "CALL ",
    "DELETE ",
    "DO ",
    "LOAD ",
    "SELECT ",
    "SHOW ",
    "PREPARE ",
    "INSERT ",
    "UPDATE ",
];

/// Per-prefix statement counts, in [`STATEMENT_PREFIXES`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementCounts {
    counts: Vec<usize>,
}

impl Default for StatementCounts {
    fn default() -> Self {
        Self {
            counts: vec![0; STATEMENT_PREFIXES.len()],
        }
    }
}

impl StatementCounts {
    /// Counts the SQL of every record that would run on `engine`.
    pub fn add_records(&mut self, records: &[Record], engine: &str) {
        for record in records
            .iter()
            .filter(|r| r.should_execute_for_engine(engine))
        {
            let sql = record.sql();
            for (count, prefix) in self.counts.iter_mut().zip(STATEMENT_PREFIXES) {
                if sql.starts_with(prefix) {
                    *count += 1;
                }
            }
        }
    }

    /// Count for a prefix, with or without its trailing space.
    pub fn get(&self, prefix: &str) -> usize {
        STATEMENT_PREFIXES
            .iter()
            .position(|p| p.trim_end() == prefix.trim_end())
            .map_or(0, |i| self.counts[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        STATEMENT_PREFIXES.iter().copied().zip(self.counts.iter().copied())
    }
}

impl fmt::Display for StatementCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statement Counts:")?;
        for (prefix, count) in self.iter() {
            writeln!(f, " -  {prefix:<25}: {:>12}", group_thousands(count))?;
        }
        Ok(())
    }
}

/// Counts statement prefixes over every test file under `paths`.
pub fn analyze_statements(
    paths: &[impl AsRef<Path>],
    extension: &str,
    engine: &str,
) -> Result<StatementCounts, TestError> {
    let mut counts = StatementCounts::default();
    for file in collect_test_files(paths, extension)? {
        tracing::debug!(file = %file.display(), "analyzing statements");
        counts.add_records(&parse_file(&file)?, engine);
    }
    Ok(counts)
}

/// `1234567` -> `1,234,567`
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut groups = vec![];
    if head > 0 {
        groups.push(&digits[..head]);
    }
    groups.extend(
        digits.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );
    groups.iter().join(",")
}
