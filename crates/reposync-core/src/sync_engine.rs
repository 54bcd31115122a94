use crate::decision::{classify, decide};
use crate::error::DiscoveryError;
use crate::inspector::inspect;
use crate::locator::discover;
use crate::model::{
    Action, ActionStep, Classification, Inspection, Repository, RepositoryState, SkipReason,
};
use crate::report::{BatchReport, SyncOutcome, SyncResult};
use crate::sync_engine_workers::{normalized_jobs, run_work_items};
use crate::vcs::VcsClient;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{info, warn};

pub type SyncProgressReporter<'a> = dyn Fn(SyncProgress) + 'a;

#[derive(Clone, Debug)]
pub enum SyncEvent {
    Discovered,
    Inspecting,
    Classified {
        classification: Classification,
        action: Action,
    },
    Pushing,
    Pulling,
    Finished {
        result: SyncResult,
    },
    Done,
}

impl SyncEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncEvent::Discovered => "discovered",
            SyncEvent::Inspecting => "inspecting",
            SyncEvent::Classified { .. } => "classified",
            SyncEvent::Pushing => "pushing",
            SyncEvent::Pulling => "pulling",
            SyncEvent::Finished { .. } => "finished",
            SyncEvent::Done => "done",
        }
    }
}

#[derive(Clone, Debug)]
pub struct SyncProgress {
    pub total_repos: usize,
    pub processed_repos: usize,
    pub repo_name: Option<String>,
    pub event: SyncEvent,
}

#[derive(Clone, Copy)]
pub struct RunSyncOptions<'a> {
    /// Worker threads; `0` and `1` both mean sequential.
    pub jobs: usize,
    /// Inspect and decide only; no push or pull is executed.
    pub dry_run: bool,
    pub progress: Option<&'a SyncProgressReporter<'a>>,
}

impl Default for RunSyncOptions<'_> {
    fn default() -> Self {
        Self {
            jobs: 1,
            dry_run: false,
            progress: None,
        }
    }
}

/// Discover every repository under `base_dir` and bring each in line with
/// its upstream. Returns only after every repository has a result; per
/// repository failures are recorded, never propagated.
pub fn run_sync(
    base_dir: &Path,
    client: &dyn VcsClient,
    options: RunSyncOptions<'_>,
) -> Result<BatchReport, DiscoveryError> {
    let repos = discover(base_dir)?;
    let mut report = BatchReport::new(base_dir);
    emit_progress(options.progress, repos.len(), 0, None, SyncEvent::Discovered);

    let jobs = normalized_jobs(options.jobs, repos.len());
    info!(
        base_dir = %base_dir.display(),
        repos = repos.len(),
        jobs,
        dry_run = options.dry_run,
        "starting sync"
    );

    for result in run_work_items(&repos, client, jobs, options.dry_run, options.progress) {
        report.record(result);
    }

    emit_progress(
        options.progress,
        repos.len(),
        repos.len(),
        None,
        SyncEvent::Done,
    );
    let report = report.finish();
    info!(
        total = report.total(),
        skipped = report.skipped(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        planned = report.planned(),
        "sync finished"
    );
    Ok(report)
}

/// Inspect, decide and act on one repository.
pub fn sync_repository(
    repo: &Repository,
    client: &dyn VcsClient,
    dry_run: bool,
    on_event: &mut dyn FnMut(SyncEvent),
) -> SyncResult {
    on_event(SyncEvent::Inspecting);
    let state = match inspect(repo, client) {
        Inspection::State(state) => state,
        Inspection::NotARepo => {
            let action = Action::skip(SkipReason::NotARepository);
            on_event(SyncEvent::Classified {
                classification: Classification::NotARepo,
                action,
            });
            return SyncResult {
                name: repo.name().to_string(),
                path: repo.path().to_path_buf(),
                classification: Classification::NotARepo,
                action,
                outcome: SyncOutcome::Skipped {
                    reason: SkipReason::NotARepository,
                },
                detail: "git metadata present but not a working copy root".to_string(),
            };
        }
    };

    let classification = classify(&state);
    let action = decide(&state);
    info!(
        repo = %repo.name(),
        classification = classification.as_str(),
        action = action.as_str(),
        "classified repository"
    );
    on_event(SyncEvent::Classified {
        classification,
        action,
    });

    let outcome = match action {
        Action::Skip { reason } => SyncOutcome::Skipped { reason },
        _ if dry_run => SyncOutcome::Planned { action },
        _ => execute_action(repo, client, action, on_event),
    };
    let detail = describe(&state, &outcome);

    SyncResult {
        name: repo.name().to_string(),
        path: repo.path().to_path_buf(),
        classification,
        action,
        outcome,
        detail,
    }
}

/// [`sync_repository`] with panics contained to the one repository.
pub(crate) fn sync_repository_isolated(
    repo: &Repository,
    client: &dyn VcsClient,
    dry_run: bool,
    on_event: &mut dyn FnMut(SyncEvent),
) -> SyncResult {
    let mut decided = None;
    let outcome = {
        let mut track = |event: SyncEvent| {
            if let SyncEvent::Classified {
                classification,
                action,
            } = &event
            {
                decided = Some((*classification, *action));
            }
            on_event(event);
        };
        panic::catch_unwind(AssertUnwindSafe(|| {
            sync_repository(repo, client, dry_run, &mut track)
        }))
    };

    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let error = panic_message(&*payload);
            warn!(repo = %repo.name(), error = %error, "repository processing panicked");
            let (classification, action) = decided.unwrap_or((
                Classification::Unknown,
                Action::skip(SkipReason::StatusUnknown),
            ));
            SyncResult {
                name: repo.name().to_string(),
                path: repo.path().to_path_buf(),
                classification,
                action,
                outcome: SyncOutcome::Aborted {
                    error: error.clone(),
                },
                detail: error,
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

/// Runs the action's steps in order; the first failing step ends the action.
fn execute_action(
    repo: &Repository,
    client: &dyn VcsClient,
    action: Action,
    on_event: &mut dyn FnMut(SyncEvent),
) -> SyncOutcome {
    for &step in action.steps() {
        let result = match step {
            ActionStep::Push => {
                on_event(SyncEvent::Pushing);
                client.push(repo.path())
            }
            ActionStep::Pull => {
                on_event(SyncEvent::Pulling);
                client.pull(repo.path())
            }
        };
        if let Err(err) = result {
            warn!(
                repo = %repo.name(),
                path = %repo.path().display(),
                step = step.as_str(),
                error = %err,
                "repository action failed"
            );
            return SyncOutcome::Failed {
                action,
                step,
                error: err.to_string(),
            };
        }
    }
    info!(repo = %repo.name(), action = action.as_str(), "repository synced");
    SyncOutcome::Succeeded { action }
}

fn describe(state: &RepositoryState, outcome: &SyncOutcome) -> String {
    let ahead = state.ahead().unwrap_or(0);
    let behind = state.behind().unwrap_or(0);
    match outcome {
        SyncOutcome::Skipped { reason } if state.diagnostics.is_empty() => reason.to_string(),
        SyncOutcome::Skipped { .. } => state.diagnostics.join("; "),
        SyncOutcome::Succeeded { action } => match action {
            Action::Push => format!("pushed {}", commits(ahead)),
            Action::Pull => format!("rebased onto {} from upstream", commits(behind)),
            Action::PushThenPull => format!(
                "pushed {}, then rebased onto {}",
                commits(ahead),
                commits(behind)
            ),
            Action::Skip { reason } => reason.to_string(),
        },
        SyncOutcome::Planned { action } => match action {
            Action::Push => format!("would push {}", commits(ahead)),
            Action::Pull => format!("would rebase onto {}", commits(behind)),
            Action::PushThenPull => format!(
                "would push {}, then rebase onto {}",
                commits(ahead),
                commits(behind)
            ),
            Action::Skip { reason } => reason.to_string(),
        },
        SyncOutcome::Failed { error, .. } | SyncOutcome::Aborted { error } => error.clone(),
    }
}

fn commits(count: u32) -> String {
    if count == 1 {
        "1 commit".to_string()
    } else {
        format!("{count} commits")
    }
}

pub(crate) fn emit_progress(
    progress: Option<&SyncProgressReporter<'_>>,
    total_repos: usize,
    processed_repos: usize,
    repo_name: Option<&str>,
    event: SyncEvent,
) {
    if let Some(progress) = progress {
        progress(SyncProgress {
            total_repos,
            processed_repos,
            repo_name: repo_name.map(str::to_string),
            event,
        });
    }
}
