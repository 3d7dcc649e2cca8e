//! Gitleaks integration module
//!
//! This module provides the gitleaks CLI integration: subprocess execution and
//! report artifact parsing.

pub mod executor;
pub mod report;

pub use executor::*;
pub use report::*;
