//! Infrastructure layer - workspace, git, and scanner implementations

pub mod git;
pub mod gitleaks;
pub mod workspace;

pub use git::*;
pub use gitleaks::*;
pub use workspace::*;
