use std::path::PathBuf;
use thiserror::Error;

/// A git invocation that could not be launched or exited non-zero.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` produced unexpected output: {output}")]
    UnexpectedOutput { command: String, output: String },
}

/// Failure of the ahead/behind query.
#[derive(Debug, Error)]
pub enum AheadBehindError {
    /// The checked-out branch has no tracking branch (or HEAD is detached).
    #[error("no upstream configured")]
    NoUpstream,

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Conditions that stop a batch before any repository is touched.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("base directory {0} does not exist")]
    NotFound(PathBuf),

    #[error("base directory {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("base directory {path} is not readable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> DiscoveryError {
    DiscoveryError::Unreadable {
        path: path.into(),
        source,
    }
}

/// Why a run could not take the per-base-directory lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error(
        "another sync is already running for {}{} (lock {})",
        .base_dir.display(),
        .holder.map(|pid| format!(" (pid {pid})")).unwrap_or_default(),
        .lock_path.display()
    )]
    AlreadyRunning {
        base_dir: PathBuf,
        lock_path: PathBuf,
        holder: Option<u32>,
    },

    #[error("lockfile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
