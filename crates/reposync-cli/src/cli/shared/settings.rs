use super::*;
use std::path::Path;

pub(in crate::cli) struct RunSettings {
    pub(in crate::cli) base_dir: PathBuf,
    pub(in crate::cli) jobs: usize,
}

/// Flag or `REPOSYNC_BASE_DIR` first, then the config file.
pub(in crate::cli) fn resolve_settings(
    config_path: &Path,
    target: &BaseDirArgs,
    jobs: Option<usize>,
) -> anyhow::Result<RunSettings> {
    let config = AppConfig::load(config_path)?;
    let base_dir = config.resolve_base_dir(target.base_dir.as_deref())?;
    let jobs = jobs.or(config.jobs).unwrap_or(1);
    if jobs == 0 {
        anyhow::bail!("--jobs must be at least 1");
    }
    Ok(RunSettings { base_dir, jobs })
}
