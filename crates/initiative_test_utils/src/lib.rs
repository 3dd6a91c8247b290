//! # Initiative Test Utilities
//!
//! Shared testing utilities for the initiative crates:
//! - Determinism test harness
//! - Participant fixtures
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
