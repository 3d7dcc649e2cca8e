//! Scan pipeline: sequential controller for a single scan request.
//!
//! Every scan runs its stages strictly in order through [`ScanPipeline`],
//! which validates each transition against the state machine defined on
//! [`ScanStage`] and records an audit-trail entry on the [`ScanJob`].
//!
//! ```text
//! Controller            ScanPipeline              Collaborators
//!     │                      │                         │
//!     ├─ execute(&mut job) ─►│                         │
//!     │                      ├─ acquire workspace      │
//!     │                      ├─ Fetching ─────────────►│ RepositoryFetcher
//!     │                      ├─ Scanning ─────────────►│ ScanRunner
//!     │                      ├─ Parsing ──────────────►│ ReportParser
//!     │                      ├─ Assembled              │
//!     │                      ├─ release workspace      │
//!     │◄─── findings ────────┤                         │
//! ```
//!
//! The workspace is released before `execute` returns on every path,
//! including failures. Release problems are logged and swallowed so they
//! never change an already-determined scan outcome.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    FetchError, Finding, ReportParseError, ReportParser, RepositoryFetcher, ScanExecutionError,
    ScanJob, ScanRunner, ScanStage, StageTransitionError,
};
use crate::infrastructure::workspace::{WorkspaceError, WorkspaceManager};

/// Errors from the scan pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ScanPipelineError {
    #[error("Workspace allocation failed: {0}")]
    Workspace(#[from] WorkspaceError),

    #[error("Repository fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Scanner execution failed: {0}")]
    ScanExecution(#[from] ScanExecutionError),

    #[error("Report handling failed: {0}")]
    Report(#[from] ReportParseError),

    #[error("Invalid stage transition: {0}")]
    Transition(#[from] StageTransitionError),
}

/// Sequential scan lifecycle controller.
///
/// All stage transitions are validated and logged through this service.
/// Controllers call [`ScanPipeline::execute`] instead of driving the
/// collaborators directly.
#[derive(Clone)]
pub struct ScanPipeline {
    workspaces: WorkspaceManager,
    fetcher: Arc<dyn RepositoryFetcher>,
    runner: Arc<dyn ScanRunner>,
    parser: Arc<dyn ReportParser>,
}

impl ScanPipeline {
    pub fn new(
        workspaces: WorkspaceManager,
        fetcher: Arc<dyn RepositoryFetcher>,
        runner: Arc<dyn ScanRunner>,
        parser: Arc<dyn ReportParser>,
    ) -> Self {
        Self {
            workspaces,
            fetcher,
            runner,
            parser,
        }
    }

    /// Run one scan end to end, mutating `job` as stages progress.
    ///
    /// On success the job is left in [`ScanStage::Assembled`] and the caller
    /// owns the final transition to [`ScanStage::Responded`]. On failure the
    /// job is left in [`ScanStage::Failed`] with the error recorded.
    pub async fn execute(&self, job: &mut ScanJob) -> Result<Vec<Finding>, ScanPipelineError> {
        info!(
            scan_id = %job.scan_id,
            repository = %job.repository_url,
            "Starting secret scan"
        );

        match self.run_stages(job).await {
            Ok(findings) => {
                info!(
                    scan_id = %job.scan_id,
                    finding_count = findings.len(),
                    "Scan pipeline completed"
                );
                Ok(findings)
            }
            Err(error) => {
                if let Err(transition_error) = job.fail(&error.to_string()) {
                    warn!(
                        scan_id = %job.scan_id,
                        error = %transition_error,
                        "Could not record scan failure"
                    );
                }
                warn!(scan_id = %job.scan_id, error = %error, "Scan pipeline failed");
                Err(error)
            }
        }
    }

    async fn run_stages(&self, job: &mut ScanJob) -> Result<Vec<Finding>, ScanPipelineError> {
        let mut workspace = self.workspaces.acquire()?;
        let result = self.run_in_workspace(job, workspace.path()).await;
        workspace.release();
        result
    }

    async fn run_in_workspace(
        &self,
        job: &mut ScanJob,
        workspace: &std::path::Path,
    ) -> Result<Vec<Finding>, ScanPipelineError> {
        job.transition(ScanStage::Fetching, Some("Cloning repository".into()))?;
        info!(scan_id = %job.scan_id, "Scan transitioned to Fetching");

        self.fetcher.fetch(&job.repository_url, workspace).await?;

        job.transition(ScanStage::Scanning, Some("Running secret scanner".into()))?;
        info!(scan_id = %job.scan_id, "Scan transitioned to Scanning");

        let outcome = self.runner.run(workspace).await?;
        if !outcome.diagnostics.is_empty() {
            debug!(
                scan_id = %job.scan_id,
                exit_code = ?outcome.exit_code,
                diagnostics = %outcome.diagnostics,
                "Scanner diagnostics captured"
            );
        }

        job.transition(ScanStage::Parsing, Some("Decoding report artifact".into()))?;
        info!(scan_id = %job.scan_id, "Scan transitioned to Parsing");

        let findings = self.parser.parse(&outcome.report_path)?;

        job.transition(
            ScanStage::Assembled,
            Some(format!("Assembled {} findings", findings.len())),
        )?;
        info!(
            scan_id = %job.scan_id,
            finding_count = findings.len(),
            "Scan transitioned to Assembled"
        );

        Ok(findings)
    }
}
