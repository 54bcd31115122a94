use super::*;
use reposync_core::audit::AuditStatus;
use std::path::Path;

pub(super) fn handle_config(
    args: ConfigArgs,
    config_path: &Path,
    audit: &AuditLogger,
) -> anyhow::Result<ExitCode> {
    match args.command {
        ConfigCommands::Init(args) => handle_init(args, config_path, audit),
        ConfigCommands::Show => handle_show(config_path),
    }
}

pub(super) fn handle_init(
    args: InitArgs,
    config_path: &Path,
    audit: &AuditLogger,
) -> anyhow::Result<ExitCode> {
    let result: anyhow::Result<()> = (|| {
        if args.jobs == Some(0) {
            anyhow::bail!("--jobs must be at least 1");
        }
        let mut config = AppConfig::load(config_path)?;
        config.base_dir = Some(args.base_dir.clone());
        if args.jobs.is_some() {
            config.jobs = args.jobs;
        }
        config.save(config_path)?;
        println!("Config saved to {}", config_path.display());
        let resolved = config.resolve_base_dir(None)?;
        if !resolved.is_dir() {
            println!("Warning: {} does not exist yet", resolved.display());
        }
        Ok(())
    })();

    if let Err(err) = &result {
        let _ = audit.record(
            "config.init",
            AuditStatus::Failed,
            None,
            None,
            Some(&err.to_string()),
        );
    } else {
        let audit_id = audit.record("config.init", AuditStatus::Ok, None, None, None)?;
        println!("Audit ID: {audit_id}");
    }
    result.map(|()| ExitCode::SUCCESS)
}

fn handle_show(config_path: &Path) -> anyhow::Result<ExitCode> {
    let config = AppConfig::load(config_path)?;
    println!("config: {}", config_path.display());
    let base_dir = config
        .base_dir
        .as_ref()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string());
    println!("base_dir: {base_dir}");
    println!("jobs: {}", config.jobs.unwrap_or(1));
    Ok(ExitCode::SUCCESS)
}
