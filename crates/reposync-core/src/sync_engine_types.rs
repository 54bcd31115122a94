use crate::report::SyncResult;
use crate::sync_engine::SyncEvent;

pub(crate) enum RepoEvent {
    Step { index: usize, event: SyncEvent },
    Finished { index: usize, result: SyncResult },
}
