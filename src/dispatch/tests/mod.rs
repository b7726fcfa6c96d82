//! Dispatch module tests
//!
//! Contains test suites for:
//! - Chord dispatch per kind, including the two-phase content flow
//! - Stand-alone collaborators and suggestions

#[cfg(test)]
mod collaborator_tests;
