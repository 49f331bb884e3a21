//! Per-owner advisory lock around archive writes.
//!
//! Cross-platform (fs2) exclusive lock on `<owner dir>/LOCK`. Held while a snapshot
//! file is written and retention runs, and while a snapshot is deleted, so two
//! writers for the same owner cannot interleave eviction. The duplicate check
//! happens before the lock is taken.
//!
//! Lock is released on Drop.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::consts::LOCK_FILE;

pub struct OwnerLock {
    file: std::fs::File,
    path: PathBuf,
}

impl OwnerLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for OwnerLock {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

fn open_lock_file(owner_dir: &Path) -> Result<(std::fs::File, PathBuf)> {
    let path = owner_dir.join(LOCK_FILE);
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("open lock file {}", path.display()))?;
    Ok((f, path))
}

/// Acquire the owner's exclusive lock. Blocks until acquired.
pub fn acquire_owner_lock(owner_dir: &Path) -> Result<OwnerLock> {
    let (file, path) = open_lock_file(owner_dir)?;
    file.lock_exclusive()
        .with_context(|| format!("lock_exclusive {}", path.display()))?;
    Ok(OwnerLock { file, path })
}
