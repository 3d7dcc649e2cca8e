//! Scan value objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of scan source submitted by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Git repository URL
    Url,
    /// Uploaded archive reference (accepted but not implemented)
    Archive,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url => write!(f, "url"),
            Self::Archive => write!(f, "archive"),
        }
    }
}

/// Pipeline stage of a scan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStage {
    /// Workspace not yet prepared
    Idle,
    /// Cloning the repository into the workspace
    Fetching,
    /// Scanner subprocess is running
    Scanning,
    /// Decoding the report artifact
    Parsing,
    /// Findings assembled into a result
    Assembled,
    /// Response handed to the client
    Responded,
    /// A stage failed; the scan is over
    Failed,
}

impl ScanStage {
    /// Returns the set of valid target stages from the current stage.
    ///
    /// ```text
    /// Idle ──► Fetching ──► Scanning ──► Parsing ──► Assembled ──► Responded
    ///  │           │            │           │
    ///  └───────────┴────────────┴───────────┴──► Failed
    /// ```
    pub fn valid_transitions(&self) -> &[ScanStage] {
        match self {
            Self::Idle => &[Self::Fetching, Self::Failed],
            Self::Fetching => &[Self::Scanning, Self::Failed],
            Self::Scanning => &[Self::Parsing, Self::Failed],
            Self::Parsing => &[Self::Assembled, Self::Failed],
            Self::Assembled => &[Self::Responded],
            Self::Responded | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `target` is allowed from the current stage.
    pub fn can_transition_to(&self, target: &ScanStage) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Whether this stage represents a terminal (final) state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Responded | Self::Failed)
    }
}

impl std::fmt::Display for ScanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Fetching => write!(f, "Fetching"),
            Self::Scanning => write!(f, "Scanning"),
            Self::Parsing => write!(f, "Parsing"),
            Self::Assembled => write!(f, "Assembled"),
            Self::Responded => write!(f, "Responded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Recorded stage transition for a scan (log correlation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: ScanStage,
    pub to: ScanStage,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Human-readable reason or context for the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Error returned when an invalid stage transition is attempted.
#[derive(Debug, thiserror::Error)]
#[error("Invalid scan stage transition from {from} to {to}")]
pub struct StageTransitionError {
    pub from: ScanStage,
    pub to: ScanStage,
}
