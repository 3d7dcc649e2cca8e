//! Scan collaborator contracts
//!
//! The pipeline depends on these traits rather than concrete services so that
//! tests can substitute in-memory doubles for the network, subprocess, and
//! filesystem collaborators.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::entities::Finding;

/// Service that materializes a repository into a destination directory.
#[async_trait]
pub trait RepositoryFetcher: Send + Sync {
    /// Produce a shallow working copy (latest revision only) of the
    /// repository's default branch inside `destination`.
    async fn fetch(&self, repository_url: &str, destination: &Path) -> Result<(), FetchError>;
}

/// Service that runs the external secret scanner against a workspace.
#[async_trait]
pub trait ScanRunner: Send + Sync {
    /// Invoke the scanner with `workspace` as the scan target, directing the
    /// report to a fixed in-workspace path.
    ///
    /// Success is defined by the report artifact existing on disk after the
    /// process terminates; the exit status never decides the outcome on its
    /// own. A non-zero exit with an artifact present means the scanner found
    /// secrets, which is a successful run.
    async fn run(&self, workspace: &Path) -> Result<RunOutcome, ScanExecutionError>;
}

/// Service that decodes the report artifact into findings.
pub trait ReportParser: Send + Sync {
    /// Read and decode the report artifact.
    ///
    /// A zero-length artifact is the scanner's "no findings" signal and
    /// decodes to an empty list without touching the JSON decoder.
    fn parse(&self, artifact: &Path) -> Result<Vec<Finding>, ReportParseError>;
}

/// Outcome of a scanner run whose report artifact exists.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Path of the report artifact inside the workspace.
    pub report_path: PathBuf,
    /// Process exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// Combined stdout/stderr, kept for diagnostics only.
    pub diagnostics: String,
}

/// Repository fetch error
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Unsupported repository URL scheme for {0}. Only HTTP(S) is supported.")]
    UnsupportedScheme(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository clone failed: {0}")]
    Clone(String),
}

/// Scanner execution error (the report artifact was never produced)
#[derive(Debug, thiserror::Error)]
pub enum ScanExecutionError {
    #[error("Scanner executable not found: {0}")]
    NotInstalled(String),

    #[error("Failed to launch scanner: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scanner timed out after {0} seconds")]
    Timeout(u64),

    #[error("Scanner exited (code {exit_code:?}) without writing a report: {diagnostics}")]
    ReportMissing {
        exit_code: Option<i32>,
        /// Combined stdout/stderr captured for operator visibility.
        diagnostics: String,
    },
}

/// Report artifact parse error
#[derive(Debug, thiserror::Error)]
pub enum ReportParseError {
    #[error("Failed to read report artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode report artifact {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
