use crate::error::{DiscoveryError, unreadable};
use crate::inspector::head_has_upstream;
use crate::model::Repository;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const VCS_MARKER: &str = ".git";

/// Immediate subdirectories of `base_dir` that carry a `.git` entry, sorted by
/// name. Only a missing or unreadable base directory is an error.
pub fn discover(base_dir: &Path) -> Result<Vec<Repository>, DiscoveryError> {
    let metadata = match fs::metadata(base_dir) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(DiscoveryError::NotFound(base_dir.to_path_buf()));
        }
        Err(err) => return Err(unreadable(base_dir, err)),
    };
    if !metadata.is_dir() {
        return Err(DiscoveryError::NotADirectory(base_dir.to_path_buf()));
    }
    let base_dir = base_dir
        .canonicalize()
        .map_err(|err| unreadable(base_dir, err))?;

    let entries = fs::read_dir(&base_dir).map_err(|err| unreadable(&base_dir, err))?;
    let mut repos = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| unreadable(&base_dir, err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if !path.join(VCS_MARKER).exists() {
            debug!(path = %path.display(), "skipping directory without git metadata");
            continue;
        }
        let has_upstream = head_has_upstream(&path);
        repos.push(Repository::new(path, has_upstream));
    }
    repos.sort_by(|a, b| a.name().cmp(b.name()));

    info!(
        base_dir = %base_dir.display(),
        count = repos.len(),
        "discovered repositories"
    );
    Ok(repos)
}
