//! Retention: keep at most `max_backups` snapshot files per owner.
//!
//! Runs after every successful create. Oldest files (mtime, then name) go first.
//! Best-effort: a file that cannot be removed is logged and left for the next pass.

use log::{info, warn};
use std::fs;
use std::path::Path;

use crate::metrics::{record_evict_failed, record_evicted};

use super::io::backup_files;

/// Returns the number of files actually removed.
pub(crate) fn enforce_limit(owner_dir: &Path, max_backups: usize) -> usize {
    let files = match backup_files(owner_dir) {
        Ok(v) => v,
        Err(e) => {
            warn!("retention: cannot list {}: {:#}", owner_dir.display(), e);
            return 0;
        }
    };
    if files.len() <= max_backups {
        return 0;
    }

    let excess = files.len() - max_backups;
    let mut deleted = 0usize;
    for f in files.iter().take(excess) {
        match fs::remove_file(&f.path) {
            Ok(()) => {
                deleted += 1;
                record_evicted();
                info!("retention: deleted old backup {}", f.name);
            }
            Err(e) => {
                record_evict_failed();
                warn!("retention: failed to delete old backup {}: {}", f.name, e);
            }
        }
    }

    info!(
        "retention: {} deleted {}, kept {}",
        owner_dir.display(),
        deleted,
        files.len() - deleted
    );
    deleted
}
