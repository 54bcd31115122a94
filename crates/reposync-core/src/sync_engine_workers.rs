use crate::model::Repository;
use crate::report::SyncResult;
use crate::sync_engine::{
    SyncEvent, SyncProgressReporter, emit_progress, sync_repository_isolated,
};
use crate::sync_engine_types::RepoEvent;
use crate::vcs::VcsClient;
use std::collections::VecDeque;
use std::sync::{Mutex, mpsc};

/// Results come back in `repos` order regardless of `jobs`.
pub(crate) fn run_work_items(
    repos: &[Repository],
    client: &dyn VcsClient,
    jobs: usize,
    dry_run: bool,
    progress: Option<&SyncProgressReporter<'_>>,
) -> Vec<SyncResult> {
    if jobs <= 1 {
        return run_work_items_serial(repos, client, dry_run, progress);
    }
    run_work_items_parallel(repos, client, jobs, dry_run, progress)
}

fn run_work_items_serial(
    repos: &[Repository],
    client: &dyn VcsClient,
    dry_run: bool,
    progress: Option<&SyncProgressReporter<'_>>,
) -> Vec<SyncResult> {
    let total = repos.len();
    let mut results = Vec::with_capacity(total);
    for (processed, repo) in repos.iter().enumerate() {
        let mut on_event =
            |event: SyncEvent| emit_progress(progress, total, processed, Some(repo.name()), event);
        let result = sync_repository_isolated(repo, client, dry_run, &mut on_event);
        emit_progress(
            progress,
            total,
            processed + 1,
            Some(repo.name()),
            SyncEvent::Finished {
                result: result.clone(),
            },
        );
        results.push(result);
    }
    results
}

fn run_work_items_parallel(
    repos: &[Repository],
    client: &dyn VcsClient,
    jobs: usize,
    dry_run: bool,
    progress: Option<&SyncProgressReporter<'_>>,
) -> Vec<SyncResult> {
    let total = repos.len();
    let queue = Mutex::new(repos.iter().enumerate().collect::<VecDeque<_>>());
    let mut slots: Vec<Option<SyncResult>> = (0..total).map(|_| None).collect();
    let (tx, rx) = mpsc::channel::<RepoEvent>();

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            let queue = &queue;
            let tx = tx.clone();
            scope.spawn(move || {
                loop {
                    let next = queue.lock().ok().and_then(|mut guard| guard.pop_front());
                    let Some((index, repo)) = next else {
                        break;
                    };
                    let mut on_event = |event: SyncEvent| {
                        let _ = tx.send(RepoEvent::Step { index, event });
                    };
                    let result = sync_repository_isolated(repo, client, dry_run, &mut on_event);
                    let _ = tx.send(RepoEvent::Finished { index, result });
                }
            });
        }
        drop(tx);

        let mut processed = 0;
        while let Ok(event) = rx.recv() {
            match event {
                RepoEvent::Step { index, event } => {
                    emit_progress(progress, total, processed, Some(repos[index].name()), event);
                }
                RepoEvent::Finished { index, result } => {
                    processed += 1;
                    emit_progress(
                        progress,
                        total,
                        processed,
                        Some(repos[index].name()),
                        SyncEvent::Finished {
                            result: result.clone(),
                        },
                    );
                    slots[index] = Some(result);
                }
            }
        }
    });

    slots.into_iter().flatten().collect()
}

pub(crate) fn normalized_jobs(requested_jobs: usize, work_item_count: usize) -> usize {
    requested_jobs.max(1).min(work_item_count.max(1))
}
