//! Individual record processing and execution.

use std::sync::Arc;
use std::time::Instant;

use crate::error_handling::{AnyError, Mismatch};
use crate::output::{Outcome, QueryOutput};
use crate::parser::{ExpectedResults, QueryExpect, Record};

use super::core::Harness;
use super::validator::{compare_rows, compare_schema, compute_hash, normalize_for_comparison};

/// Runs one record against the harness and decides how it is reported.
pub fn execute_record<H: Harness>(harness: &mut H, record: &Record) -> Outcome {
    if !record.should_execute_for_engine(harness.engine_name()) {
        tracing::trace!(line = record.line(), "conditions exclude engine");
        return match record {
            Record::Statement { .. } | Record::Query { .. } => Outcome::skipped(),
            // an excluded halt is not reported, and the file still stops here
            Record::Halt { .. } => Outcome::stop(),
        };
    }

    match record {
        Record::Halt { .. } => Outcome::stop(),
        Record::Statement {
            sql, expect_error, ..
        } => {
            let start = Instant::now();
            let ret = harness.execute_statement(sql);
            let elapsed = start.elapsed();

            let outcome = match (ret, *expect_error) {
                (Ok(()), false) | (Err(_), true) => Outcome::ok(),
                (Ok(()), true) => Outcome::not_ok(Mismatch::ExpectedError),
                (Err(e), false) => Outcome::engine_error(Arc::new(e) as AnyError),
            };
            outcome.with_duration(elapsed)
        }
        Record::Query { sql, expected, .. } => {
            let start = Instant::now();
            let ret = harness.execute_query(sql);
            let elapsed = start.elapsed();

            match ret {
                Ok(output) => verify_query(expected, &output)
                    .with_observed(output)
                    .with_duration(elapsed),
                Err(e) => Outcome::engine_error(Arc::new(e) as AnyError).with_duration(elapsed),
            }
        }
    }
}

/// Checks the observed output of a query against its expectation. Checks run in order and the
/// first one that fails decides the report.
fn verify_query(expected: &QueryExpect, output: &QueryOutput) -> Outcome {
    let num_results = expected.num_results();
    if !compare_schema(&expected.schema, &output.schema, num_results) {
        return Outcome::not_ok(Mismatch::Schema {
            expected: expected.schema.clone(),
            actual: output.schema.clone(),
        });
    }

    if output.rows.len() != num_results {
        return Outcome::not_ok(Mismatch::ResultCount {
            expected: num_results,
            actual: output.rows.len(),
        });
    }

    let normalized =
        normalize_for_comparison(&output.rows, expected.sort_mode(), output.num_columns());
    match &expected.results {
        ExpectedResults::Hash { hash, .. } => {
            let actual = compute_hash(&normalized);
            if actual != *hash {
                return Outcome::not_ok(Mismatch::Hash {
                    expected: hash.clone(),
                    actual,
                });
            }
        }
        ExpectedResults::Values(values) => {
            if let Err(position) = compare_rows(values, &normalized) {
                return Outcome::not_ok(Mismatch::Result {
                    position,
                    expected: values[position].clone(),
                    actual: normalized[position].clone(),
                });
            }
        }
    }

    Outcome::ok()
}
