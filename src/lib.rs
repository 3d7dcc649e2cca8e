//! Leaksweep - repository secret scanning service
//!
//! Clones a repository at shallow depth, runs gitleaks against the checkout,
//! and returns structured findings over an HTTP API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

mod app;

pub use app::{AppHandle, create_app};
pub use config::Config;
pub use logging::init_tracing;
