use crate::config::default_lock_dir;
use crate::error::LockError;
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive claim on one base directory for the length of a run. Released
/// when dropped.
#[derive(Debug)]
pub struct SyncLock {
    base_dir: PathBuf,
    path: PathBuf,
    file: File,
}

impl SyncLock {
    /// Claims `base_dir` under the default lock directory.
    pub fn acquire_for(base_dir: &Path) -> anyhow::Result<Self> {
        let lock_dir = default_lock_dir()?;
        Ok(Self::acquire_in(&lock_dir, base_dir)?)
    }

    /// Claims `base_dir` with the lock file kept in `lock_dir`. Different
    /// spellings of the same directory share one lock.
    pub fn acquire_in(lock_dir: &Path, base_dir: &Path) -> Result<Self, LockError> {
        let base_dir = base_dir
            .canonicalize()
            .unwrap_or_else(|_| base_dir.to_path_buf());
        fs::create_dir_all(lock_dir).map_err(|source| LockError::Io {
            path: lock_dir.to_path_buf(),
            source,
        })?;

        let path = lock_dir.join(lock_file_name(&base_dir));
        let io_error = |source| LockError::Io {
            path: path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(io_error)?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(err) if is_contended(&err) => {
                return Err(LockError::AlreadyRunning {
                    holder: read_holder(&mut file),
                    base_dir,
                    lock_path: path.clone(),
                });
            }
            Err(err) => return Err(io_error(err)),
        }
        write_holder(&mut file, &base_dir).map_err(io_error)?;
        debug!(base_dir = %base_dir.display(), lock = %path.display(), "sync lock acquired");

        Ok(Self {
            base_dir,
            path,
            file,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_file_name(base_dir: &Path) -> String {
    let digest = Sha256::digest(base_dir.to_string_lossy().as_bytes());
    let hex = hex::encode(digest);
    format!("sync-{}.lock", &hex[..16])
}

fn is_contended(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
        || err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

/// Lock file body: `<pid> <base_dir>`.
fn write_holder(file: &mut File, base_dir: &Path) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    writeln!(file, "{} {}", std::process::id(), base_dir.display())?;
    file.flush()
}

fn read_holder(file: &mut File) -> Option<u32> {
    let mut body = String::new();
    file.read_to_string(&mut body).ok()?;
    body.split_whitespace().next()?.parse().ok()
}
