//! Application layer - the scan pipeline use case

pub mod pipeline;

pub use pipeline::*;
