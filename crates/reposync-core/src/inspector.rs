use crate::error::AheadBehindError;
use crate::model::{Inspection, Repository, RepositoryState};
use crate::vcs::VcsClient;
use git2::Repository as GitRepository;
use std::path::Path;
use tracing::{debug, warn};

/// Observe a repository's sync state. Never modifies the repository beyond
/// the fetch of remote-tracking refs.
pub fn inspect(repo: &Repository, client: &dyn VcsClient) -> Inspection {
    let path = repo.path();
    if !is_working_copy_root(path) {
        warn!(repo = %repo.name(), path = %path.display(), "not a repository root");
        return Inspection::NotARepo;
    }

    let mut diagnostics = Vec::new();

    if let Err(err) = client.fetch(path) {
        warn!(repo = %repo.name(), error = %err, "fetch failed");
        diagnostics.push(format!("fetch: {err}"));
        return Inspection::State(RepositoryState {
            is_dirty: true,
            fetch_succeeded: false,
            has_upstream: repo.has_upstream,
            ahead_behind: None,
            diagnostics,
        });
    }

    let is_dirty = match client.is_dirty(path) {
        Ok(dirty) => dirty,
        Err(err) => {
            warn!(repo = %repo.name(), error = %err, "status failed; assuming dirty");
            diagnostics.push(format!("status: {err}"));
            true
        }
    };

    let (has_upstream, ahead_behind) = match client.ahead_behind(path) {
        Ok(counts) => (true, Some(counts)),
        Err(AheadBehindError::NoUpstream) => (false, None),
        Err(AheadBehindError::Command(err)) => {
            warn!(repo = %repo.name(), error = %err, "ahead/behind query failed");
            diagnostics.push(format!("ahead/behind: {err}"));
            (true, None)
        }
    };

    let state = RepositoryState {
        is_dirty,
        fetch_succeeded: true,
        has_upstream,
        ahead_behind,
        diagnostics,
    };
    debug!(repo = %repo.name(), state = ?state, "inspected repository");
    Inspection::State(state)
}

/// True when `path` is the top of a non-bare working copy.
pub fn is_working_copy_root(path: &Path) -> bool {
    let Ok(repo) = GitRepository::open(path) else {
        return false;
    };
    let Some(workdir) = repo.workdir() else {
        return false;
    };
    match (workdir.canonicalize(), path.canonicalize()) {
        (Ok(workdir), Ok(path)) => workdir == path,
        _ => false,
    }
}

/// Whether the checked-out branch has a tracking branch configured.
pub fn head_has_upstream(path: &Path) -> bool {
    let Ok(repo) = GitRepository::open(path) else {
        return false;
    };
    let Ok(head) = repo.head() else {
        return false;
    };
    if !head.is_branch() {
        return false;
    }
    let Some(name) = head.shorthand() else {
        return false;
    };
    repo.find_branch(name, git2::BranchType::Local)
        .and_then(|branch| branch.upstream())
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AheadBehind;
    use crate::testing::{GitFixture, Script, ScriptedClient, git_available, plain_repos};
    use git2::Signature;
    use tempfile::TempDir;

    fn repo_in(base: &Path, name: &str) -> Repository {
        Repository::new(base.join(name), true)
    }

    fn state(inspection: Inspection) -> RepositoryState {
        match inspection {
            Inspection::State(state) => state,
            Inspection::NotARepo => panic!("expected a repository state"),
        }
    }

    #[test]
    fn non_repository_makes_no_client_calls() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("plain")).unwrap();
        let client = ScriptedClient::new();

        let inspection = inspect(&repo_in(tmp.path(), "plain"), &client);
        assert_eq!(inspection, Inspection::NotARepo);
        assert!(client.calls().is_empty());
    }

    #[test]
    fn bare_repository_is_not_a_working_copy() {
        let tmp = TempDir::new().unwrap();
        git2::Repository::init_bare(tmp.path().join("bare")).unwrap();
        assert!(!is_working_copy_root(&tmp.path().join("bare")));
    }

    #[test]
    fn subdirectory_of_repository_is_not_a_root() {
        let tmp = plain_repos(&["alpha"]);
        let nested = tmp.path().join("alpha").join("src");
        std::fs::create_dir_all(&nested).unwrap();
        assert!(is_working_copy_root(&tmp.path().join("alpha")));
        assert!(!is_working_copy_root(&nested));
    }

    #[test]
    fn fetch_failure_short_circuits_with_unknown_counts() {
        let tmp = plain_repos(&["alpha"]);
        let client = ScriptedClient::new().with(
            "alpha",
            Script {
                fetch_fails: true,
                ..Script::counts(3, 0)
            },
        );

        let state = state(inspect(&repo_in(tmp.path(), "alpha"), &client));
        assert!(!state.fetch_succeeded);
        assert_eq!(state.ahead_behind, None);
        assert!(state.is_dirty);
        assert_eq!(state.diagnostics.len(), 1);
        assert_eq!(client.calls_for("alpha"), vec!["fetch"]);
    }

    #[test]
    fn status_failure_is_treated_as_dirty() {
        let tmp = plain_repos(&["alpha"]);
        let client = ScriptedClient::new().with(
            "alpha",
            Script {
                status_fails: true,
                ..Script::counts(0, 1)
            },
        );

        let state = state(inspect(&repo_in(tmp.path(), "alpha"), &client));
        assert!(state.fetch_succeeded);
        assert!(state.is_dirty);
        assert_eq!(state.ahead_behind, Some(AheadBehind::new(0, 1)));
    }

    #[test]
    fn missing_upstream_clears_flag() {
        let tmp = plain_repos(&["alpha"]);
        let client = ScriptedClient::new().with(
            "alpha",
            Script {
                no_upstream: true,
                ..Script::default()
            },
        );

        let state = state(inspect(&repo_in(tmp.path(), "alpha"), &client));
        assert!(!state.has_upstream);
        assert_eq!(state.ahead_behind, None);
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn count_failure_keeps_upstream_with_unknown_counts() {
        let tmp = plain_repos(&["alpha"]);
        let client = ScriptedClient::new().with(
            "alpha",
            Script {
                counts_fail: true,
                ..Script::default()
            },
        );

        let state = state(inspect(&repo_in(tmp.path(), "alpha"), &client));
        assert!(state.has_upstream);
        assert_eq!(state.ahead_behind, None);
        assert_eq!(state.diagnostics.len(), 1);
    }

    #[test]
    fn clean_repository_reports_counts() {
        let tmp = plain_repos(&["alpha"]);
        let client = ScriptedClient::new().with("alpha", Script::counts(2, 5));

        let state = state(inspect(&repo_in(tmp.path(), "alpha"), &client));
        assert_eq!(
            state,
            RepositoryState {
                is_dirty: false,
                fetch_succeeded: true,
                has_upstream: true,
                ahead_behind: Some(AheadBehind::new(2, 5)),
                diagnostics: Vec::new(),
            }
        );
        assert_eq!(
            client.calls_for("alpha"),
            vec!["fetch", "status", "ahead_behind"]
        );
    }

    #[test]
    fn head_upstream_probe_follows_branch_config() {
        let tmp = TempDir::new().unwrap();
        let repo = git2::Repository::init(tmp.path()).unwrap();
        assert!(!head_has_upstream(tmp.path()));

        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("a.txt")).unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();
        let oid = repo
            .commit(Some("refs/heads/main"), &sig, &sig, "commit", &tree, &[])
            .unwrap();
        repo.set_head("refs/heads/main").unwrap();
        assert!(!head_has_upstream(tmp.path()));

        repo.remote("origin", "https://example.com/repo.git").unwrap();
        repo.reference("refs/remotes/origin/main", oid, true, "origin main")
            .unwrap();
        let mut branch = repo.find_branch("main", git2::BranchType::Local).unwrap();
        branch.set_upstream(Some("origin/main")).unwrap();
        assert!(head_has_upstream(tmp.path()));
    }

    #[test]
    fn fresh_repository_without_commits_has_no_upstream() {
        if !git_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        crate::testing::git(tmp.path(), &["init", "--quiet", "fresh"]);
        let path = tmp.path().join("fresh");
        let repo = Repository::new(path.clone(), head_has_upstream(&path));
        assert!(!repo.has_upstream);

        let state = state(inspect(&repo, &crate::git_cli::GitCli::new()));
        assert!(!state.has_upstream);
        assert_eq!(state.ahead_behind, None);
        assert_eq!(
            crate::decision::decide(&state),
            crate::model::Action::skip(crate::model::SkipReason::NoUpstream)
        );
    }

    #[test]
    fn inspects_real_repository_with_git() {
        if !git_available() {
            return;
        }
        let fixture = GitFixture::new();
        let path = fixture.add_repo("alpha");
        let repo = Repository::new(path, head_has_upstream(&fixture.base_dir().join("alpha")));
        assert!(repo.has_upstream);

        let state = state(inspect(&repo, &crate::git_cli::GitCli::new()));
        assert!(state.fetch_succeeded);
        assert!(!state.is_dirty);
        assert_eq!(state.ahead_behind, Some(AheadBehind::new(0, 0)));
    }
}
