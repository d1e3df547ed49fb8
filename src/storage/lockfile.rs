//! Data directory lock
//!
//! One `onegeo` process per data directory. sled refuses a second opener
//! with an opaque I/O error; this lock turns that into a readable message
//! naming the holder's PID.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// PID file held for the lifetime of a server or CLI command.
#[derive(Debug)]
pub struct DataDirLock {
    lock_path: PathBuf,
    owned: bool,
}

impl DataDirLock {
    const LOCK_FILE_NAME: &'static str = ".onegeo.lock";

    /// Create `data_dir` if needed and claim it.
    pub fn acquire<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let lock_path = data_dir.join(Self::LOCK_FILE_NAME);
        if lock_path.exists() {
            match holder_pid(&lock_path) {
                Some(pid) if pid == std::process::id() || is_process_running(pid) => {
                    bail!(
                        "Data directory {} is already in use (PID: {pid}).\n\
                         Stop it, or remove the stale lock file: rm {}",
                        data_dir.display(),
                        lock_path.display()
                    );
                }
                _ => {
                    tracing::info!(path = %lock_path.display(), "Removing stale lock file");
                    fs::remove_file(&lock_path).context("Failed to remove stale lock file")?;
                }
            }
        }

        let pid = std::process::id();
        let mut file = File::create(&lock_path)
            .with_context(|| format!("Failed to create lock file {}", lock_path.display()))?;
        writeln!(file, "{pid}").context("Failed to write PID to lock file")?;

        tracing::debug!(pid, path = %lock_path.display(), "Acquired data directory lock");
        Ok(Self {
            lock_path,
            owned: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }

    fn release(&mut self) {
        if !self.owned {
            return;
        }
        match fs::remove_file(&self.lock_path) {
            Ok(()) => tracing::debug!(path = %self.lock_path.display(), "Released data directory lock"),
            Err(e) => tracing::warn!(error = %e, "Failed to remove lock file"),
        }
        self.owned = false;
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// PID recorded in an existing lock file; `None` when unreadable.
fn holder_pid(lock_path: &Path) -> Option<u32> {
    fs::read_to_string(lock_path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn is_process_running(pid: u32) -> bool {
    fs::read_to_string(format!("/proc/{pid}/cmdline"))
        .map(|cmdline| cmdline.contains("onegeo"))
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_process_running(_pid: u32) -> bool {
    true
}
