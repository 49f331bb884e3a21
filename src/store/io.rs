//! File-level helpers for one owner's archive directory.
//!
//! Layout in <archive_root>/<owner>/:
//! - backup_<yyyyMMdd_HHmmss>.json       snapshot (pretty JSON)
//! - backup_<yyyyMMdd_HHmmss>_NNN.json   same second, past the highest suffix so far
//! - *.tmp                               in-flight write (tmp+rename), never listed
//! - LOCK                                fs2 advisory lock
//! - LAST_KEY                            last storage key handed out
//!
//! All helpers return errors to the caller; the store decides whether to skip, log or fail.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::consts::{
    BACKUP_FILE_EXT, BACKUP_FILE_PREFIX, FILE_TOKEN_FORMAT, LAST_KEY_FILE, MAX_KEY_SUFFIX,
    TMP_FILE_EXT,
};
use crate::model::Snapshot;

/// One snapshot file as seen on disk.
#[derive(Debug, Clone)]
pub struct BackupFile {
    pub path: PathBuf,
    pub name: String,
    pub modified: SystemTime,
}

/// Owner ids become directory names: reject anything that could escape the root,
/// and padded ids that would alias another owner's archive.
pub(crate) fn validate_owner(owner: &str) -> Result<()> {
    if owner.is_empty()
        || owner.trim() != owner
        || owner == "."
        || owner == ".."
        || owner.contains(['/', '\\', '\0'])
    {
        return Err(anyhow!("invalid owner id '{}'", owner));
    }
    Ok(())
}

fn is_backup_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .map(|ext| ext == BACKUP_FILE_EXT)
        .unwrap_or(false)
}

/// All snapshot files in `dir`, oldest first (mtime, then name).
/// A missing directory is an empty archive.
pub(crate) fn backup_files(dir: &Path) -> Result<Vec<BackupFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for e in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
        let e = e?;
        let name = match e.file_name().to_str() {
            Some(s) => s.to_string(),
            None => continue,
        };
        if !is_backup_name(&name) {
            continue;
        }
        let md = e.metadata().with_context(|| format!("stat {}", name))?;
        if !md.is_file() {
            continue;
        }
        let modified = md.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        out.push(BackupFile {
            path: e.path(),
            name,
            modified,
        });
    }
    out.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(out)
}

/// Suffix rank of `name` within `token`: bare name = 0, `_NNN` = N.
fn key_rank(name: &str, token: &str) -> Option<u32> {
    let rest = name
        .strip_prefix(BACKUP_FILE_PREFIX)?
        .strip_prefix(token)?
        .strip_suffix(BACKUP_FILE_EXT)?
        .strip_suffix('.')?;
    if rest.is_empty() {
        return Some(0);
    }
    let n = rest.strip_prefix('_')?;
    if n.len() != 3 {
        return None;
    }
    n.parse::<u32>().ok()
}

/// Last key handed out in this directory (empty if none recorded yet).
fn last_issued_key(dir: &Path) -> String {
    fs::read_to_string(dir.join(LAST_KEY_FILE))
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Persist the key just handed out. Caller holds the owner lock.
pub(crate) fn record_issued_key(dir: &Path, key: &str) -> Result<()> {
    let path = dir.join(LAST_KEY_FILE);
    let tmp = path.with_extension(TMP_FILE_EXT);
    fs::write(&tmp, key.as_bytes()).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, &path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

/// File name for "now": backup_<token>.json, then _001.._999, always past the highest
/// rank this token has had (on disk or last issued). Evicted or deleted names stay retired.
pub(crate) fn allocate_storage_key(dir: &Path) -> Result<String> {
    let token = Local::now().format(FILE_TOKEN_FORMAT).to_string();
    allocate_for_token(dir, &token)
}

fn allocate_for_token(dir: &Path, token: &str) -> Result<String> {
    let mut highest = key_rank(&last_issued_key(dir), token);
    if dir.exists() {
        for e in fs::read_dir(dir).with_context(|| format!("read_dir {}", dir.display()))? {
            let e = e?;
            if let Some(rank) = e.file_name().to_str().and_then(|n| key_rank(n, token)) {
                highest = Some(highest.map_or(rank, |h| h.max(rank)));
            }
        }
    }

    let next = match highest {
        None => return Ok(format!("{BACKUP_FILE_PREFIX}{token}.{BACKUP_FILE_EXT}")),
        Some(h) => h + 1,
    };
    if next > MAX_KEY_SUFFIX {
        return Err(anyhow!(
            "no free storage key for {} in {}",
            token,
            dir.display()
        ));
    }
    Ok(format!("{BACKUP_FILE_PREFIX}{token}_{next:03}.{BACKUP_FILE_EXT}"))
}

/// Write the snapshot under `snapshot.storage_key` via tmp+rename.
/// Returns the final path and the number of bytes written.
pub(crate) fn write_snapshot(dir: &Path, snapshot: &Snapshot, fsync: bool) -> Result<(PathBuf, usize)> {
    if snapshot.storage_key.is_empty() {
        return Err(anyhow!("snapshot has no storage key"));
    }
    let path = dir.join(&snapshot.storage_key);
    let tmp = path.with_extension(TMP_FILE_EXT);

    let json = serde_json::to_string_pretty(snapshot).context("serialize snapshot")?;
    {
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .with_context(|| format!("open tmp snapshot {}", tmp.display()))?;
        f.write_all(json.as_bytes())
            .with_context(|| format!("write {}", tmp.display()))?;
        f.flush()?;
        if fsync {
            f.sync_all()
                .with_context(|| format!("fsync {}", tmp.display()))?;
        }
    }
    if let Err(e) = fs::rename(&tmp, &path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("rename {} -> {}", tmp.display(), path.display()));
    }
    Ok((path, json.len()))
}

/// Read one snapshot file. The storage key always reflects the actual file name.
pub(crate) fn read_snapshot(file: &BackupFile) -> Result<Snapshot> {
    let text = fs::read_to_string(&file.path)
        .with_context(|| format!("read {}", file.path.display()))?;
    let mut s: Snapshot = serde_json::from_str(&text)
        .with_context(|| format!("parse snapshot {}", file.name))?;
    s.storage_key = file.name.clone();
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_ids_cannot_escape_root() {
        assert!(validate_owner("0f8fad5b-d9cb-469f-a165-70867728950e").is_ok());
        for bad in ["", " ", ".", "..", "a/b", "..\\x", " abc", "abc ", "abc\n"] {
            assert!(validate_owner(bad).is_err(), "{bad:?} must be rejected");
        }
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let d = std::env::temp_dir().join(format!("invsafe-io-{}-{}-{}", tag, std::process::id(), t));
        fs::create_dir_all(&d).unwrap();
        d
    }

    #[test]
    fn key_rank_parses_bare_and_suffixed_names() {
        let t = "20261018_120000";
        assert_eq!(key_rank("backup_20261018_120000.json", t), Some(0));
        assert_eq!(key_rank("backup_20261018_120000_007.json", t), Some(7));
        assert_eq!(key_rank("backup_20261018_120001.json", t), None);
        assert_eq!(key_rank("backup_20261018_120000.tmp", t), None);
        assert_eq!(key_rank("backup_20261018_120000_7.json", t), None);
    }

    #[test]
    fn retired_keys_are_not_handed_out_again() {
        let dir = scratch_dir("retired");
        let t = "20261018_120000";

        assert_eq!(allocate_for_token(&dir, t).unwrap(), "backup_20261018_120000.json");

        // Only a higher suffix is left on disk: never step back to the bare name.
        fs::write(dir.join("backup_20261018_120000_003.json"), b"{}").unwrap();
        assert_eq!(allocate_for_token(&dir, t).unwrap(), "backup_20261018_120000_004.json");

        // Every file gone, the last issued key still counts.
        fs::remove_file(dir.join("backup_20261018_120000_003.json")).unwrap();
        record_issued_key(&dir, "backup_20261018_120000_004.json").unwrap();
        assert_eq!(allocate_for_token(&dir, t).unwrap(), "backup_20261018_120000_005.json");

        // A new second starts from the bare name again.
        assert_eq!(allocate_for_token(&dir, "20261018_120001").unwrap(), "backup_20261018_120001.json");

        record_issued_key(&dir, "backup_20261018_120000_999.json").unwrap();
        assert!(allocate_for_token(&dir, t).is_err());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn only_json_files_are_backups() {
        assert!(is_backup_name("backup_20260101_000000.json"));
        assert!(!is_backup_name("backup_20260101_000000.tmp"));
        assert!(!is_backup_name("LOCK"));
    }
}
