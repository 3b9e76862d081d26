//! Core execution logic for sqllogictest runner.

mod core;
mod record_processor;
pub mod validator;

// Re-export public types and traits
pub use self::core::{ExecutionContext, Harness, RunSummary, Runner};
pub use self::record_processor::execute_record;
