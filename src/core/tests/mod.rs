//! Core module tests
//!
//! Contains test suites for core functionality:
//! - Canonicalisation and type tests
//! - Registry indexing, shadowing and re-indexing tests
//! - Keystroke accumulator state machine tests
//! - Keystroke script parser tests
//! - Definition validation tests

#[cfg(test)]
mod accumulator_tests;
#[cfg(test)]
mod parser_tests;
