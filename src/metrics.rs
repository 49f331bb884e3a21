//! Lightweight global metrics for InvSafe.
//!
//! Потокобезопасные атомарные счётчики:
//! - Create (persisted / duplicate / empty / cooldown / failed)
//! - Retention evictions
//! - Restore (ok / failed) и деградации по предметам

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Create -----
static BACKUPS_CREATED: AtomicU64 = AtomicU64::new(0);
static BACKUPS_DUPLICATE: AtomicU64 = AtomicU64::new(0);
static BACKUPS_EMPTY: AtomicU64 = AtomicU64::new(0);
static BACKUPS_COOLING_DOWN: AtomicU64 = AtomicU64::new(0);
static BACKUPS_FAILED: AtomicU64 = AtomicU64::new(0);
static BACKUP_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

// ----- Retention -----
static RETENTION_EVICTED: AtomicU64 = AtomicU64::new(0);
static RETENTION_EVICT_FAILED: AtomicU64 = AtomicU64::new(0);

// ----- Listing -----
static CORRUPT_FILES_SKIPPED: AtomicU64 = AtomicU64::new(0);

// ----- Restore -----
static RESTORES_OK: AtomicU64 = AtomicU64::new(0);
static RESTORES_FAILED: AtomicU64 = AtomicU64::new(0);
static ITEMS_ENCODE_DEGRADED: AtomicU64 = AtomicU64::new(0);
static ITEMS_DECODE_DEGRADED: AtomicU64 = AtomicU64::new(0);
static ITEMS_SPILLED: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct MetricsSnapshot {
    pub backups_created: u64,
    pub backups_duplicate: u64,
    pub backups_empty: u64,
    pub backups_cooling_down: u64,
    pub backups_failed: u64,
    pub backup_bytes_written: u64,

    pub retention_evicted: u64,
    pub retention_evict_failed: u64,

    pub corrupt_files_skipped: u64,

    pub restores_ok: u64,
    pub restores_failed: u64,
    pub items_encode_degraded: u64,
    pub items_decode_degraded: u64,
    pub items_spilled: u64,
}

impl MetricsSnapshot {
    /// Share of create attempts that ended in a persisted snapshot.
    pub fn create_ratio(&self) -> f64 {
        let total = self.backups_created
            + self.backups_duplicate
            + self.backups_empty
            + self.backups_cooling_down
            + self.backups_failed;
        if total == 0 {
            0.0
        } else {
            self.backups_created as f64 / total as f64
        }
    }
}

// ----- Recorders (Create) -----
pub fn record_backup_created(bytes: usize) {
    BACKUPS_CREATED.fetch_add(1, Ordering::Relaxed);
    BACKUP_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}
pub fn record_backup_duplicate() {
    BACKUPS_DUPLICATE.fetch_add(1, Ordering::Relaxed);
}
pub fn record_backup_empty() {
    BACKUPS_EMPTY.fetch_add(1, Ordering::Relaxed);
}
pub fn record_backup_cooling_down() {
    BACKUPS_COOLING_DOWN.fetch_add(1, Ordering::Relaxed);
}
pub fn record_backup_failed() {
    BACKUPS_FAILED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Retention / Listing) -----
pub fn record_evicted() {
    RETENTION_EVICTED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_evict_failed() {
    RETENTION_EVICT_FAILED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_corrupt_skipped() {
    CORRUPT_FILES_SKIPPED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Restore) -----
pub fn record_restore(ok: bool) {
    if ok {
        RESTORES_OK.fetch_add(1, Ordering::Relaxed);
    } else {
        RESTORES_FAILED.fetch_add(1, Ordering::Relaxed);
    }
}
pub fn record_encode_degraded() {
    ITEMS_ENCODE_DEGRADED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_decode_degraded() {
    ITEMS_DECODE_DEGRADED.fetch_add(1, Ordering::Relaxed);
}
pub fn record_spilled() {
    ITEMS_SPILLED.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        backups_created: BACKUPS_CREATED.load(Ordering::Relaxed),
        backups_duplicate: BACKUPS_DUPLICATE.load(Ordering::Relaxed),
        backups_empty: BACKUPS_EMPTY.load(Ordering::Relaxed),
        backups_cooling_down: BACKUPS_COOLING_DOWN.load(Ordering::Relaxed),
        backups_failed: BACKUPS_FAILED.load(Ordering::Relaxed),
        backup_bytes_written: BACKUP_BYTES_WRITTEN.load(Ordering::Relaxed),

        retention_evicted: RETENTION_EVICTED.load(Ordering::Relaxed),
        retention_evict_failed: RETENTION_EVICT_FAILED.load(Ordering::Relaxed),

        corrupt_files_skipped: CORRUPT_FILES_SKIPPED.load(Ordering::Relaxed),

        restores_ok: RESTORES_OK.load(Ordering::Relaxed),
        restores_failed: RESTORES_FAILED.load(Ordering::Relaxed),
        items_encode_degraded: ITEMS_ENCODE_DEGRADED.load(Ordering::Relaxed),
        items_decode_degraded: ITEMS_DECODE_DEGRADED.load(Ordering::Relaxed),
        items_spilled: ITEMS_SPILLED.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    BACKUPS_CREATED.store(0, Ordering::Relaxed);
    BACKUPS_DUPLICATE.store(0, Ordering::Relaxed);
    BACKUPS_EMPTY.store(0, Ordering::Relaxed);
    BACKUPS_COOLING_DOWN.store(0, Ordering::Relaxed);
    BACKUPS_FAILED.store(0, Ordering::Relaxed);
    BACKUP_BYTES_WRITTEN.store(0, Ordering::Relaxed);

    RETENTION_EVICTED.store(0, Ordering::Relaxed);
    RETENTION_EVICT_FAILED.store(0, Ordering::Relaxed);

    CORRUPT_FILES_SKIPPED.store(0, Ordering::Relaxed);

    RESTORES_OK.store(0, Ordering::Relaxed);
    RESTORES_FAILED.store(0, Ordering::Relaxed);
    ITEMS_ENCODE_DEGRADED.store(0, Ordering::Relaxed);
    ITEMS_DECODE_DEGRADED.store(0, Ordering::Relaxed);
    ITEMS_SPILLED.store(0, Ordering::Relaxed);
}
