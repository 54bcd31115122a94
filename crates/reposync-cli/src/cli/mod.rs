use anyhow::Context;
use clap::Parser;
use reposync_core::audit::AuditLogger;
use reposync_core::config::{AppConfig, default_config_path};
use reposync_core::lockfile::SyncLock;
use reposync_core::{BatchReport, GitCli, RunSyncOptions, SyncProgress, run_sync};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod args;
mod config_cmd;
mod shared;
mod sync_cmd;

use args::*;

use config_cmd::handle_config;
use sync_cmd::{handle_list, handle_status, handle_sync};

pub fn run() -> anyhow::Result<ExitCode> {
    app::run()
}
