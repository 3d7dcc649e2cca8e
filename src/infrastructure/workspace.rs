//! Per-scan workspace management
//!
//! Every scan request gets its own uniquely named directory under a common
//! parent. The directory is removed when the request finishes, whatever the
//! outcome.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::WorkspaceConfig;

/// Prefix for workspace directory names.
const WORKSPACE_PREFIX: &str = "leaksweep-scan-";

/// Errors emitted by the workspace manager.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Failed to allocate scan workspace: {0}")]
    Create(#[source] std::io::Error),
}

/// An exclusively-owned scan directory, removed on release.
///
/// Release is idempotent, and `Drop` releases as a backstop, so the directory
/// is removed exactly once on every exit path including unwinds.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    /// Root path of the workspace directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recursively delete the workspace directory.
    ///
    /// Removal failures are logged and swallowed: a cleanup problem must never
    /// override an already-determined scan outcome. Releasing an
    /// already-released workspace is a no-op.
    pub fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => debug!(path = %self.path.display(), "Removed scan workspace"),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Failed to remove scan workspace")
                }
            }
        }
    }

    /// Whether the workspace directory has already been released.
    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}

/// Allocates uniquely named scan workspaces under a common parent directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    parent_dir: PathBuf,
}

impl WorkspaceManager {
    /// Create a manager rooted at the configured parent directory (the system
    /// temp dir when unset), creating it if absent.
    pub fn new(config: &WorkspaceConfig) -> std::io::Result<Self> {
        let parent_dir = config
            .parent_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);

        if !parent_dir.exists() {
            std::fs::create_dir_all(&parent_dir)?;
        }

        Ok(Self { parent_dir })
    }

    /// Allocate a fresh workspace. Directory names carry a random suffix, so
    /// concurrent acquisitions never collide.
    pub fn acquire(&self) -> Result<Workspace, WorkspaceError> {
        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(&self.parent_dir)
            .map_err(WorkspaceError::Create)?;
        let path = dir.path().to_path_buf();

        debug!(path = %path.display(), "Allocated scan workspace");

        Ok(Workspace {
            path,
            dir: Some(dir),
        })
    }

    /// Parent directory under which workspaces are allocated.
    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }
}
