//! Logictest Suite - sqllogictest verification harness
//!
//! This is the root crate that re-exports all components.

pub use logictest;
