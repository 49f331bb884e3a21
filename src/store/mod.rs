//! store: per-owner snapshot archive on local disk.
//!
//! Состав:
//! - BackupStore: create / list / get / delete / count по owner id.
//! - io: раскладка файлов, выделение ключа, tmp+rename запись, чтение.
//! - retention: ограничение числа снапшотов после каждого create.
//!
//! Порядок архива: по mtime файла, от старых к новым (при равенстве по имени).
//! Индексы отображения (display index) назначаются заново при каждом list():
//! 0 = самый старый из оставленных, k-1 = самый новый.
//!
//! Запись, ретенция и удаление одного владельца идут под fs2-локом <owner>/LOCK.
//! Ключ хранения никогда не выдаётся повторно (см. io::allocate_storage_key).
//! Проверка на дубликат выполняется до лока: два гонящихся create могут оба её пройти.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::InvSafeConfig;
use crate::lock::acquire_owner_lock;
use crate::metrics::{record_backup_created, record_corrupt_skipped};
use crate::model::Snapshot;

pub(crate) mod io;
mod retention;

use io::{
    allocate_storage_key, backup_files, read_snapshot, record_issued_key, validate_owner,
    write_snapshot,
};
use retention::enforce_limit;

/// A listed snapshot together with the file it was read from.
#[derive(Debug, Clone)]
pub struct ListedBackup {
    pub index: usize,
    pub path: PathBuf,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone)]
pub struct BackupStore {
    root: PathBuf,
    max_backups: usize,
    fsync: bool,
}

impl BackupStore {
    pub fn new<P: AsRef<Path>>(root: P, max_backups: usize) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_backups: max_backups.max(1),
            fsync: false,
        }
    }

    /// Store rooted at `cfg.archive_root`; the root directory is created if missing.
    pub fn open(cfg: &InvSafeConfig) -> Result<Self> {
        fs::create_dir_all(&cfg.archive_root)
            .with_context(|| format!("create archive root {}", cfg.archive_root.display()))?;
        Ok(Self::new(&cfg.archive_root, cfg.max_backups).with_fsync(cfg.fsync))
    }

    pub fn with_fsync(mut self, on: bool) -> Self {
        self.fsync = on;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_backups(&self) -> usize {
        self.max_backups
    }

    pub fn owner_dir(&self, owner: &str) -> Result<PathBuf> {
        validate_owner(owner)?;
        Ok(self.root.join(owner))
    }

    /// Persist a candidate under a fresh storage key, then apply retention.
    /// Nothing is left behind when the write fails.
    pub fn create(&self, owner: &str, candidate: &Snapshot) -> Result<Snapshot> {
        if candidate.is_empty() {
            return Err(anyhow!("refusing to persist an empty snapshot for {}", owner));
        }
        let dir = self.owner_dir(owner)?;
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;

        let lk = acquire_owner_lock(&dir)?;
        debug!("store: {} locked {}", owner, lk.path().display());

        let mut snap = candidate.clone();
        snap.storage_key = allocate_storage_key(&dir)?;
        let (path, bytes) = write_snapshot(&dir, &snap, self.fsync)?;
        record_backup_created(bytes);
        if let Err(e) = record_issued_key(&dir, &snap.storage_key) {
            warn!("store: {} cannot record last key {}: {:#}", owner, snap.storage_key, e);
        }
        info!(
            "store: {} saved {} ({} B, {} items, {} levels)",
            owner,
            path.display(),
            bytes,
            snap.item_count(),
            snap.experience_level
        );

        let evicted = enforce_limit(&dir, self.max_backups);
        if evicted > 0 {
            debug!("store: {} retention evicted {}", owner, evicted);
        }
        Ok(snap)
    }

    /// Snapshots with their files, oldest first, at most `max_backups` newest files.
    /// Unreadable files are skipped; indices are contiguous over what was read.
    pub fn entries(&self, owner: &str) -> Vec<ListedBackup> {
        let dir = match self.owner_dir(owner) {
            Ok(d) => d,
            Err(e) => {
                warn!("store: {:#}", e);
                return Vec::new();
            }
        };
        let files = match backup_files(&dir) {
            Ok(v) => v,
            Err(e) => {
                warn!("store: cannot list {}: {:#}", dir.display(), e);
                return Vec::new();
            }
        };

        let skip = files.len().saturating_sub(self.max_backups);
        let mut out = Vec::with_capacity(files.len() - skip);
        for f in files.into_iter().skip(skip) {
            match read_snapshot(&f) {
                Ok(snapshot) => out.push(ListedBackup {
                    index: out.len(),
                    path: f.path,
                    snapshot,
                }),
                Err(e) => {
                    record_corrupt_skipped();
                    warn!("store: failed to read backup file {}: {:#}", f.name, e);
                }
            }
        }
        out
    }

    pub fn list(&self, owner: &str) -> Vec<(usize, Snapshot)> {
        self.entries(owner)
            .into_iter()
            .map(|e| (e.index, e.snapshot))
            .collect()
    }

    pub fn get(&self, owner: &str, index: usize) -> Option<Snapshot> {
        self.entries(owner)
            .into_iter()
            .nth(index)
            .map(|e| e.snapshot)
    }

    /// Most recently created listed snapshot.
    pub fn latest(&self, owner: &str) -> Option<Snapshot> {
        self.entries(owner).pop().map(|e| e.snapshot)
    }

    /// Coarse duplicate check against the latest snapshot only
    /// (see [`Snapshot::same_content_as`]).
    pub fn is_duplicate(&self, owner: &str, candidate: &Snapshot) -> bool {
        match self.latest(owner) {
            Some(latest) => latest.same_content_as(candidate),
            None => false,
        }
    }

    pub fn delete(&self, owner: &str, index: usize) -> bool {
        let entry = match self.entries(owner).into_iter().nth(index) {
            Some(e) => e,
            None => {
                debug!("store: {} has no backup #{}", owner, index);
                return false;
            }
        };
        let _lk = match entry.path.parent().map(acquire_owner_lock) {
            Some(Ok(lk)) => lk,
            Some(Err(e)) => {
                warn!("store: {} cannot lock archive for delete: {:#}", owner, e);
                return false;
            }
            None => return false,
        };
        match fs::remove_file(&entry.path) {
            Ok(()) => {
                info!("store: {} deleted backup #{} ({})", owner, index, entry.snapshot.storage_key);
                true
            }
            Err(e) => {
                warn!("store: failed to delete {}: {}", entry.path.display(), e);
                false
            }
        }
    }

    pub fn count(&self, owner: &str) -> usize {
        self.entries(owner).len()
    }

    /// Owner ids that have an archive directory, sorted.
    pub fn owners(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for e in fs::read_dir(&self.root).with_context(|| format!("read_dir {}", self.root.display()))? {
            let e = e?;
            if !e.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = e.file_name().to_str() {
                out.push(name.to_string());
            }
        }
        out.sort();
        Ok(out)
    }
}
