//! Shared fixtures for unit tests: real git working copies backed by a local
//! bare remote, and a scripted client that never spawns a process.

use crate::error::{AheadBehindError, CommandError};
use crate::model::AheadBehind;
use crate::vcs::VcsClient;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;
use tempfile::TempDir;

pub(crate) fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

pub(crate) fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("LC_ALL", "C")
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

pub(crate) fn commit_file(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
    git(dir, &["add", name]);
    git(dir, &["commit", "--quiet", "-m", name]);
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "tester"]);
    git(dir, &["config", "user.email", "tester@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A base directory holding working copies that track bare remotes under the
/// same temp dir.
pub(crate) struct GitFixture {
    tmp: TempDir,
}

impl GitFixture {
    pub(crate) fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("work")).unwrap();
        fs::create_dir_all(tmp.path().join("remotes")).unwrap();
        fs::create_dir_all(tmp.path().join("peers")).unwrap();
        Self { tmp }
    }

    pub(crate) fn base_dir(&self) -> PathBuf {
        self.tmp.path().join("work")
    }

    fn remote_path(&self, name: &str) -> PathBuf {
        self.tmp.path().join("remotes").join(format!("{name}.git"))
    }

    /// Creates `work/<name>` with one commit on `main` pushed to its remote.
    pub(crate) fn add_repo(&self, name: &str) -> PathBuf {
        let remote = self.remote_path(name);
        let remote_str = remote.to_string_lossy().into_owned();
        git(
            &self.tmp.path().join("remotes"),
            &["init", "--quiet", "--bare", &remote_str],
        );
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let local = self.base_dir().join(name);
        git(&self.base_dir(), &["init", "--quiet", name]);
        configure_identity(&local);
        git(&local, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        commit_file(&local, "README.md", name);
        git(&local, &["remote", "add", "origin", &remote_str]);
        git(&local, &["push", "--quiet", "-u", "origin", "main"]);
        local
    }

    /// A second clone of `name`'s remote, standing in for another machine.
    pub(crate) fn clone_peer(&self, name: &str) -> PathBuf {
        let remote = self.remote_path(name).to_string_lossy().into_owned();
        let peer = self.tmp.path().join("peers").join(name);
        let peer_str = peer.to_string_lossy().into_owned();
        git(
            self.tmp.path(),
            &["clone", "--quiet", "-b", "main", &remote, &peer_str],
        );
        configure_identity(&peer);
        peer
    }
}

/// Canned answers for one repository. Anything left `None` succeeds.
#[derive(Clone, Debug, Default)]
pub(crate) struct Script {
    pub(crate) fetch_fails: bool,
    pub(crate) dirty: Option<bool>,
    pub(crate) status_fails: bool,
    pub(crate) counts: Option<AheadBehind>,
    pub(crate) no_upstream: bool,
    pub(crate) counts_fail: bool,
    pub(crate) push_fails: bool,
    pub(crate) panic_on_push: bool,
    pub(crate) pull_fails: bool,
}

impl Script {
    pub(crate) fn counts(ahead: u32, behind: u32) -> Self {
        Self {
            counts: Some(AheadBehind::new(ahead, behind)),
            ..Self::default()
        }
    }
}

/// Fake client keyed by repository directory name. Push and pull update the
/// scripted counts the way a real remote would.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<Vec<(String, &'static str)>>,
}

impl ScriptedClient {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, name: &str, script: Script) -> Self {
        self.scripts.lock().unwrap().insert(name.to_string(), script);
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, &'static str)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_for(&self, name: &str) -> Vec<&'static str> {
        self.calls()
            .into_iter()
            .filter(|(repo, _)| repo == name)
            .map(|(_, op)| op)
            .collect()
    }

    fn record(&self, path: &Path, op: &'static str) -> Script {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().unwrap().push((name.clone(), op));
        self.scripts
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .unwrap_or_default()
    }

    fn update_counts(&self, path: &Path, update: impl FnOnce(&mut AheadBehind)) {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if let Some(script) = self.scripts.lock().unwrap().get_mut(&name)
            && let Some(counts) = script.counts.as_mut()
        {
            update(counts);
        }
    }
}

fn scripted_failure(command: &str) -> CommandError {
    CommandError::Failed {
        command: command.to_string(),
        status: "exit status: 1".to_string(),
        stderr: format!("scripted {command} failure"),
    }
}

impl VcsClient for ScriptedClient {
    fn fetch(&self, path: &Path) -> Result<(), CommandError> {
        if self.record(path, "fetch").fetch_fails {
            return Err(scripted_failure("git fetch"));
        }
        Ok(())
    }

    fn is_dirty(&self, path: &Path) -> Result<bool, CommandError> {
        let script = self.record(path, "status");
        if script.status_fails {
            return Err(scripted_failure("git status"));
        }
        Ok(script.dirty.unwrap_or(false))
    }

    fn ahead_behind(&self, path: &Path) -> Result<AheadBehind, AheadBehindError> {
        let script = self.record(path, "ahead_behind");
        if script.no_upstream {
            return Err(AheadBehindError::NoUpstream);
        }
        if script.counts_fail {
            return Err(scripted_failure("git rev-list").into());
        }
        Ok(script.counts.unwrap_or_default())
    }

    fn push(&self, path: &Path) -> Result<(), CommandError> {
        let script = self.record(path, "push");
        if script.panic_on_push {
            panic!("scripted push panic");
        }
        if script.push_fails {
            return Err(scripted_failure("git push"));
        }
        self.update_counts(path, |counts| counts.ahead = 0);
        Ok(())
    }

    fn pull(&self, path: &Path) -> Result<(), CommandError> {
        if self.record(path, "pull").pull_fails {
            return Err(scripted_failure("git pull"));
        }
        self.update_counts(path, |counts| counts.behind = 0);
        Ok(())
    }
}

/// Base directory with one initialized repository per name, for tests that
/// only need directories the locator and inspector accept.
pub(crate) fn plain_repos(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        git2::Repository::init(tmp.path().join(name)).unwrap();
    }
    tmp
}
