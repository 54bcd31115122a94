use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A working copy found under the base directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    path: PathBuf,
    name: String,
    /// Whether the checked-out branch had a tracking branch configured at
    /// discovery time. Decisions use the freshly inspected value instead.
    pub has_upstream: bool,
}

impl Repository {
    pub fn new(path: PathBuf, has_upstream: bool) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path,
            name,
            has_upstream,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct AheadBehind {
    pub ahead: u32,
    pub behind: u32,
}

impl AheadBehind {
    pub fn new(ahead: u32, behind: u32) -> Self {
        Self { ahead, behind }
    }
}

/// Snapshot produced by one inspection.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RepositoryState {
    pub is_dirty: bool,
    pub fetch_succeeded: bool,
    pub has_upstream: bool,
    /// `None` means unknown; counts are only present when an upstream exists
    /// and the fetch succeeded.
    pub ahead_behind: Option<AheadBehind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl RepositoryState {
    pub fn ahead(&self) -> Option<u32> {
        self.ahead_behind.map(|counts| counts.ahead)
    }

    pub fn behind(&self) -> Option<u32> {
        self.ahead_behind.map(|counts| counts.behind)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Inspection {
    NotARepo,
    State(RepositoryState),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classification {
    UpToDate,
    Ahead { ahead: u32 },
    Behind { behind: u32 },
    Diverged { ahead: u32, behind: u32 },
    Dirty,
    NoUpstream,
    FetchFailed,
    Unknown,
    NotARepo,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::UpToDate => "up_to_date",
            Classification::Ahead { .. } => "ahead",
            Classification::Behind { .. } => "behind",
            Classification::Diverged { .. } => "diverged",
            Classification::Dirty => "dirty",
            Classification::NoUpstream => "no_upstream",
            Classification::FetchFailed => "fetch_failed",
            Classification::Unknown => "unknown",
            Classification::NotARepo => "not_a_repo",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Ahead { ahead } => write!(f, "ahead {ahead}"),
            Classification::Behind { behind } => write!(f, "behind {behind}"),
            Classification::Diverged { ahead, behind } => {
                write!(f, "diverged +{ahead}/-{behind}")
            }
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    FetchFailed,
    NoUpstream,
    UncommittedChanges,
    UpToDate,
    StatusUnknown,
    NotARepository,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::FetchFailed => "fetch failed",
            SkipReason::NoUpstream => "no upstream configured",
            SkipReason::UncommittedChanges => "uncommitted changes",
            SkipReason::UpToDate => "up to date",
            SkipReason::StatusUnknown => "branch status unknown",
            SkipReason::NotARepository => "not a repository",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Skip { reason: SkipReason },
    Push,
    Pull,
    PushThenPull,
}

impl Action {
    pub fn skip(reason: SkipReason) -> Self {
        Action::Skip { reason }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Skip { .. } => "skip",
            Action::Push => "push",
            Action::Pull => "pull",
            Action::PushThenPull => "push_then_pull",
        }
    }

    /// The sub-steps this action executes, in order.
    pub fn steps(&self) -> &'static [ActionStep] {
        match self {
            Action::Skip { .. } => &[],
            Action::Push => &[ActionStep::Push],
            Action::Pull => &[ActionStep::Pull],
            Action::PushThenPull => &[ActionStep::Push, ActionStep::Pull],
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Skip { reason } => write!(f, "skip ({reason})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStep {
    Push,
    Pull,
}

impl ActionStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStep::Push => "push",
            ActionStep::Pull => "pull",
        }
    }
}

impl fmt::Display for ActionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_name_is_last_component() {
        let repo = Repository::new(PathBuf::from("/work/projects/alpha"), true);
        assert_eq!(repo.name(), "alpha");
        assert_eq!(repo.path(), Path::new("/work/projects/alpha"));
    }

    #[test]
    fn push_then_pull_pushes_first() {
        assert_eq!(
            Action::PushThenPull.steps(),
            &[ActionStep::Push, ActionStep::Pull]
        );
        assert!(Action::skip(SkipReason::UpToDate).steps().is_empty());
    }

    #[test]
    fn action_serializes_with_kind_tag() {
        let value = serde_json::to_value(Action::skip(SkipReason::NoUpstream)).unwrap();
        assert_eq!(value["kind"], "skip");
        assert_eq!(value["reason"], "no_upstream");
    }
}
