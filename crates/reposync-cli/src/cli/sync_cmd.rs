use super::shared::{print_summary, render_progress_line, render_repository_line, resolve_settings};
use super::*;
use reposync_core::locator::discover;
use std::path::Path;

pub(super) fn handle_sync(
    args: SyncArgs,
    config_path: &Path,
    audit: &AuditLogger,
) -> anyhow::Result<ExitCode> {
    let settings = resolve_settings(config_path, &args.target, args.jobs)?;
    run_batch(
        &settings.base_dir,
        settings.jobs,
        BatchOutput {
            dry_run: args.dry_run,
            json: args.json,
            quiet: args.quiet,
            audit_repo: args.audit_repo,
        },
        audit,
    )
}

pub(super) fn handle_status(
    args: StatusArgs,
    config_path: &Path,
    audit: &AuditLogger,
) -> anyhow::Result<ExitCode> {
    let settings = resolve_settings(config_path, &args.target, args.jobs)?;
    run_batch(
        &settings.base_dir,
        settings.jobs,
        BatchOutput {
            dry_run: true,
            json: args.json,
            quiet: false,
            audit_repo: false,
        },
        audit,
    )
}

pub(super) fn handle_list(args: ListArgs, config_path: &Path) -> anyhow::Result<ExitCode> {
    let settings = resolve_settings(config_path, &args.target, None)?;
    let repos = discover(&settings.base_dir)
        .with_context(|| format!("discover repositories in {}", settings.base_dir.display()))?;
    if repos.is_empty() {
        println!("No repositories found in {}", settings.base_dir.display());
    }
    for repo in &repos {
        println!("{}", render_repository_line(repo));
    }
    Ok(ExitCode::SUCCESS)
}

struct BatchOutput {
    dry_run: bool,
    json: bool,
    quiet: bool,
    audit_repo: bool,
}

fn run_batch(
    base_dir: &Path,
    jobs: usize,
    output: BatchOutput,
    audit: &AuditLogger,
) -> anyhow::Result<ExitCode> {
    let _lock = SyncLock::acquire_for(base_dir)?;
    let show_progress = !output.json && !output.quiet;
    if show_progress {
        let mode = if output.dry_run { " (dry run)" } else { "" };
        println!("Syncing repositories in {}{mode}", base_dir.display());
    }

    let progress_fn = |progress: SyncProgress| {
        if let Some(line) = render_progress_line(&progress) {
            println!("{line}");
        }
    };
    let progress: Option<&dyn Fn(SyncProgress)> = if show_progress {
        Some(&progress_fn)
    } else {
        None
    };
    let options = RunSyncOptions {
        jobs,
        dry_run: output.dry_run,
        progress,
    };

    let client = GitCli::new();
    let report = run_sync(base_dir, &client, options)
        .with_context(|| format!("sync repositories in {}", base_dir.display()))?;

    emit_report(&report, output.json)?;
    match audit.record_report(&report, output.audit_repo) {
        Ok(audit_id) if !output.json => println!("Audit ID: {audit_id}"),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "failed to write audit log"),
    }

    Ok(exit_code_for(&report))
}

fn emit_report(report: &BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        let data = serde_json::to_string_pretty(report).context("serialize report")?;
        println!("{data}");
    } else {
        print_summary(report);
    }
    Ok(())
}

pub(super) fn exit_code_for(report: &BatchReport) -> ExitCode {
    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
