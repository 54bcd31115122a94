use crate::error::{AheadBehindError, CommandError};
use crate::model::AheadBehind;
use std::path::Path;

/// Primitive version-control operations against a single working copy.
///
/// Implementations must not share mutable state between calls for different
/// repositories: the orchestrator calls them concurrently from worker threads.
pub trait VcsClient: Send + Sync {
    /// Update remote-tracking refs without touching the working tree.
    fn fetch(&self, path: &Path) -> Result<(), CommandError>;

    /// True when there are uncommitted or untracked changes.
    fn is_dirty(&self, path: &Path) -> Result<bool, CommandError>;

    /// Commits only on the local branch versus only on its upstream.
    fn ahead_behind(&self, path: &Path) -> Result<AheadBehind, AheadBehindError>;

    fn push(&self, path: &Path) -> Result<(), CommandError>;

    /// Integrates upstream commits by rebasing, never with a merge commit.
    fn pull(&self, path: &Path) -> Result<(), CommandError>;
}
