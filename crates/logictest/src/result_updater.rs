//! Query result updating and generated test file output.
//!
//! The rewriter walks the source text with a forward-only cursor. Lines that are not replaced
//! are copied byte for byte, so a file whose results did not change is reproduced exactly.

use crate::executor::validator::{compute_hash, normalize_for_comparison};
use crate::output::Outcome;
use crate::parser::record_parser::{is_directive_line, RESULTS_DELIMITER};
use crate::parser::strip_inline_comment;
use crate::parser::{format_hash_line, Record};

/// What a generated copy of a test file keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteMode {
    /// Every record is kept; queries get the observed results.
    Generate,
    /// Like `Generate`, but records that failed to execute are dropped.
    Filter,
}

/// Fresh lines for a query record that executed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedQuery {
    pub header: String,
    /// Either the values, one per line, or a single hash summary line.
    pub result_lines: Vec<String>,
}

/// Computes the replacement lines for `record` from its execution outcome.
///
/// Returns `None` when the record is copied unchanged: statements, halts, skipped queries and
/// queries that failed with an engine error.
pub fn update_record_with_output(record: &Record, outcome: &Outcome) -> Option<UpdatedQuery> {
    let Record::Query { expected, .. } = record else {
        return None;
    };
    if outcome.error.is_some() {
        return None;
    }
    let observed = outcome.observed.as_ref()?;

    let values =
        normalize_for_comparison(&observed.rows, expected.sort_mode(), observed.num_columns());
    let result_lines = if expected.should_hash(values.len()) {
        vec![format_hash_line(values.len(), &compute_hash(&values))]
    } else {
        values
    };

    Some(UpdatedQuery {
        header: expected.header(&observed.schema),
        result_lines,
    })
}

/// Whether the record is dropped from filtered copies.
fn execution_failed(record: &Record, outcome: &Outcome) -> bool {
    match record {
        Record::Statement { .. } => outcome.is_failure(),
        Record::Query { .. } => outcome.error.is_some(),
        Record::Halt { .. } => false,
    }
}

fn directive_tokens_match(line: &str, header: &str) -> bool {
    strip_inline_comment(line)
        .split_whitespace()
        .eq(header.split_whitespace())
}

/// Produces the generated copy of one test file as records are executed in order.
pub struct TestFileRewriter<'a> {
    /// Source lines with their terminators.
    lines: Vec<&'a str>,
    /// Number of source lines consumed so far.
    cursor: usize,
    out: String,
    mode: RewriteMode,
}

impl<'a> TestFileRewriter<'a> {
    pub fn new(source: &'a str, mode: RewriteMode) -> Self {
        Self {
            lines: source.split_inclusive('\n').collect(),
            cursor: 0,
            out: String::with_capacity(source.len()),
            mode,
        }
    }

    /// Applies the outcome of one record. Records must be applied in file order.
    pub fn apply(&mut self, record: &Record, outcome: &Outcome) {
        if self.mode == RewriteMode::Filter && execution_failed(record, outcome) {
            tracing::debug!(line = record.line(), "dropping failed record");
            self.copy_until(record.start_line() as usize - 1);
            self.skip_record();
            return;
        }

        let Some(update) = update_record_with_output(record, outcome) else {
            return;
        };

        self.copy_until(record.line() as usize - 1);
        match self.peek() {
            // an unchanged header keeps its inline comment
            Some(directive) if directive_tokens_match(directive, &update.header) => {
                self.out.push_str(directive);
            }
            _ => self.write_line(&update.header),
        }
        self.cursor += 1;

        let separated = self.copy_query_lines();
        if !separated && !update.result_lines.is_empty() {
            self.write_line(RESULTS_DELIMITER);
        }
        for line in &update.result_lines {
            self.write_line(line);
        }
        if separated {
            self.skip_until_blank();
        } else if !update.result_lines.is_empty()
            && self.peek().is_some_and(|line| !line.trim().is_empty())
        {
            // the next record followed the SQL directly; keep it out of the results
            self.write_line("");
        }
    }

    /// Copies all remaining lines and returns the generated text.
    pub fn finish(mut self) -> String {
        self.copy_until(self.lines.len());
        self.out
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.cursor).copied()
    }

    fn copy_until(&mut self, line_index: usize) {
        while self.cursor < line_index.min(self.lines.len()) {
            self.out.push_str(self.lines[self.cursor]);
            self.cursor += 1;
        }
    }

    /// Copies the SQL lines of a query, through the `----` separator if there is one. Returns
    /// whether a separator was copied.
    fn copy_query_lines(&mut self) -> bool {
        let mut first = true;
        while let Some(line) = self.peek() {
            if line.trim().is_empty() || (!first && is_directive_line(line)) {
                return false;
            }
            self.out.push_str(line);
            self.cursor += 1;
            first = false;
            if line.trim() == RESULTS_DELIMITER {
                return true;
            }
        }
        false
    }

    /// Skips old result lines, leaving the terminating blank line to be copied.
    fn skip_until_blank(&mut self) {
        while self.peek().is_some_and(|line| !line.trim().is_empty()) {
            self.cursor += 1;
        }
    }

    /// Skips a whole record including its terminating blank line.
    fn skip_record(&mut self) {
        self.skip_until_blank();
        if self.peek().is_some() {
            self.cursor += 1;
        }
    }

    fn write_line(&mut self, line: &str) {
        // a copied last line may lack its terminator
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str(line);
        self.out.push('\n');
    }
}
