//! Scan domain entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{ScanStage, StageTransition, StageTransitionError};

/// A single secret occurrence reported by the scanner.
///
/// Field names mirror the scanner's JSON report keys one-to-one; report fields
/// we do not surface (entropy, commit metadata, match context) are ignored at
/// decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Secret")]
    pub secret: String,
    #[serde(rename = "File")]
    pub file: String,
    #[serde(rename = "StartLine")]
    pub start_line: u32,
    #[serde(rename = "RuleID")]
    pub rule_id: String,
}

/// Tracks a single scan request through the pipeline.
///
/// The scan id exists for log correlation only and is never returned to
/// clients. Stage changes go through [`ScanJob::transition`], which enforces
/// the state machine defined on [`ScanStage`] and records an audit entry.
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub scan_id: Uuid,
    pub repository_url: String,
    pub stage: ScanStage,
    pub created_at: DateTime<Utc>,
    pub error: Option<String>,
    pub transitions: Vec<StageTransition>,
}

impl ScanJob {
    pub fn new(repository_url: impl Into<String>) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            repository_url: repository_url.into(),
            stage: ScanStage::Idle,
            created_at: Utc::now(),
            error: None,
            transitions: Vec::new(),
        }
    }

    /// Move the scan to `next`, validating against the stage transition table.
    pub fn transition(
        &mut self,
        next: ScanStage,
        reason: Option<String>,
    ) -> Result<(), StageTransitionError> {
        if !self.stage.can_transition_to(&next) {
            return Err(StageTransitionError {
                from: self.stage.clone(),
                to: next,
            });
        }

        self.transitions.push(StageTransition {
            from: self.stage.clone(),
            to: next.clone(),
            timestamp: Utc::now(),
            reason,
        });
        self.stage = next;
        Ok(())
    }

    /// Move the scan to [`ScanStage::Failed`], recording the error once the
    /// transition is accepted. A rejected transition leaves the job unmarked.
    pub fn fail(&mut self, error: &str) -> Result<(), StageTransitionError> {
        self.transition(ScanStage::Failed, Some(error.to_string()))?;
        self.error = Some(error.to_string());
        Ok(())
    }
}
