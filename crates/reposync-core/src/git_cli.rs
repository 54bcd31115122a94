use crate::error::{AheadBehindError, CommandError};
use crate::model::AheadBehind;
use crate::vcs::VcsClient;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

const UPSTREAM_RANGE: &str = "HEAD...@{upstream}";

/// [`VcsClient`] backed by the `git` executable.
#[derive(Clone, Debug)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, path: &Path, args: &[&str]) -> Result<String, CommandError> {
        let command = format!("git {}", args.join(" "));
        debug!(path = %path.display(), command = %command, "running git");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(path)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Launch {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Reads `branch.<name>.merge` for the checked-out branch. Works on an
    /// unborn branch, where `@{upstream}` cannot be resolved.
    fn upstream_configured(&self, path: &Path) -> Result<bool, CommandError> {
        let branch = match self.run(path, &["symbolic-ref", "--quiet", "--short", "HEAD"]) {
            Ok(branch) => branch.trim().to_string(),
            Err(CommandError::Failed { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        let key = format!("branch.{branch}.merge");
        match self.run(path, &["config", "--get", &key]) {
            Ok(merge) => Ok(!merge.trim().is_empty()),
            Err(CommandError::Failed { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl VcsClient for GitCli {
    fn fetch(&self, path: &Path) -> Result<(), CommandError> {
        self.run(path, &["fetch", "--all", "--quiet"]).map(drop)
    }

    fn is_dirty(&self, path: &Path) -> Result<bool, CommandError> {
        let status = self.run(path, &["status", "--porcelain"])?;
        Ok(!status.trim().is_empty())
    }

    fn ahead_behind(&self, path: &Path) -> Result<AheadBehind, AheadBehindError> {
        let args = ["rev-list", "--left-right", "--count", UPSTREAM_RANGE];
        let stdout = match self.run(path, &args) {
            Ok(stdout) => stdout,
            Err(CommandError::Failed { ref stderr, .. }) if is_missing_upstream(stderr) => {
                return Err(AheadBehindError::NoUpstream);
            }
            // An unborn or detached HEAD fails with unrelated wording.
            Err(err @ CommandError::Failed { .. }) => {
                return match self.upstream_configured(path) {
                    Ok(false) => Err(AheadBehindError::NoUpstream),
                    _ => Err(err.into()),
                };
            }
            Err(err) => return Err(err.into()),
        };
        parse_counts(&stdout).ok_or_else(|| {
            CommandError::UnexpectedOutput {
                command: format!("git {}", args.join(" ")),
                output: stdout.trim().to_string(),
            }
            .into()
        })
    }

    fn push(&self, path: &Path) -> Result<(), CommandError> {
        self.run(path, &["push", "--quiet"]).map(drop)
    }

    fn pull(&self, path: &Path) -> Result<(), CommandError> {
        self.run(path, &["pull", "--rebase", "--quiet"]).map(drop)
    }
}

fn is_missing_upstream(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("no upstream")
        || stderr.contains("does not point to a branch")
        || stderr.contains("upstream branch")
}

/// `rev-list --left-right --count A...B` prints `<left>\t<right>`; left is
/// local-only (ahead), right is upstream-only (behind).
fn parse_counts(stdout: &str) -> Option<AheadBehind> {
    let mut parts = stdout.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(AheadBehind::new(ahead, behind))
}
