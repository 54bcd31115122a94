//! Keeps a directory of git working copies in step with their upstreams:
//! discover, inspect, decide, then push or pull without touching local work.

pub mod audit;
pub mod config;
pub mod decision;
pub mod error;
pub mod git_cli;
pub mod inspector;
pub mod locator;
pub mod lockfile;
pub mod model;
pub mod report;
pub mod sync_engine;
mod sync_engine_types;
mod sync_engine_workers;
#[cfg(test)]
mod testing;
pub mod vcs;

pub use error::{AheadBehindError, CommandError, DiscoveryError, LockError};
pub use git_cli::GitCli;
pub use model::{Action, Classification, Repository, RepositoryState, SkipReason};
pub use report::{BatchReport, SyncOutcome, SyncResult};
pub use sync_engine::{RunSyncOptions, SyncEvent, SyncProgress, run_sync};
pub use vcs::VcsClient;
