//! InventorySafe: the upward interface of the backup facility.
//!
//! Binds config, codec, archive store, builder, restore engine and cooldown gate.
//! Backup, list, restore and delete answer with a value, an Option or an outcome
//! enum; only opening the archive root returns an error.

use anyhow::Result;
use log::{debug, error, info};
use std::time::{Duration, Instant};

use crate::builder::SnapshotBuilder;
use crate::codec::{ItemCodec, ItemRegistry, JsonItemCodec};
use crate::config::InvSafeConfig;
use crate::cooldown::BackupCooldown;
use crate::error::SafeError;
use crate::inventory::LivePlayer;
use crate::metrics::{
    record_backup_cooling_down, record_backup_duplicate, record_backup_empty,
    record_backup_failed, record_restore,
};
use crate::model::Snapshot;
use crate::restore::{RestoreEngine, RestoreReport};
use crate::store::BackupStore;

/// Result of one backup attempt, for user-facing feedback.
#[derive(Debug)]
pub enum BackupOutcome {
    Created(Snapshot),
    /// No items and zero experience.
    Empty,
    /// Same coarse content as the latest snapshot.
    Duplicate,
    /// Gate closed; time left until the owner may back up again.
    CoolingDown(Duration),
    Failed(SafeError),
}

impl BackupOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, BackupOutcome::Created(_))
    }

    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            BackupOutcome::Created(s) => Some(s),
            _ => None,
        }
    }
}

pub struct InventorySafe {
    cfg: InvSafeConfig,
    store: BackupStore,
    codec: Box<dyn ItemCodec + Send + Sync>,
    cooldown: BackupCooldown,
}

impl InventorySafe {
    /// Open with the bundled JSON codec (open registry, configured fallback item).
    pub fn open(cfg: InvSafeConfig) -> Result<Self> {
        let codec = JsonItemCodec::new(ItemRegistry::open()).with_fallback_item(cfg.fallback_item.clone());
        Self::with_codec(cfg, Box::new(codec))
    }

    pub fn with_codec(cfg: InvSafeConfig, codec: Box<dyn ItemCodec + Send + Sync>) -> Result<Self> {
        let store = BackupStore::open(&cfg)?;
        let cooldown = BackupCooldown::from_millis(cfg.cooldown_ms);
        debug!("invsafe: open {}", cfg);
        Ok(Self {
            cfg,
            store,
            codec,
            cooldown,
        })
    }

    pub fn config(&self) -> &InvSafeConfig {
        &self.cfg
    }

    pub fn store(&self) -> &BackupStore {
        &self.store
    }

    pub fn codec(&self) -> &dyn ItemCodec {
        self.codec.as_ref()
    }

    /// Build, dedup-check and persist a snapshot of `player` right now.
    pub fn create_backup(&self, player: &dyn LivePlayer) -> BackupOutcome {
        let owner = player.owner_id();
        let candidate = match SnapshotBuilder::new(self.codec()).build(player) {
            Some(s) => s,
            None => {
                record_backup_empty();
                return BackupOutcome::Empty;
            }
        };

        if self.store.is_duplicate(owner, &candidate) {
            record_backup_duplicate();
            info!("invsafe: skipping duplicate backup for {}", player.display_name());
            return BackupOutcome::Duplicate;
        }

        match self.store.create(owner, &candidate) {
            Ok(saved) => BackupOutcome::Created(saved),
            Err(e) => {
                record_backup_failed();
                error!("invsafe: failed to create backup for {}: {:#}", player.display_name(), e);
                BackupOutcome::Failed(classify(e))
            }
        }
    }

    /// Event-driven backup: like [`create_backup`](Self::create_backup), behind the
    /// per-owner cooldown. The gate only closes after a snapshot was actually saved.
    pub fn trigger_backup(&self, player: &dyn LivePlayer) -> BackupOutcome {
        let owner = player.owner_id();
        let now = Instant::now();
        if !self.cooldown.is_ready(owner, now) {
            record_backup_cooling_down();
            return BackupOutcome::CoolingDown(self.cooldown.remaining(owner, now));
        }
        let outcome = self.create_backup(player);
        if outcome.is_created() {
            self.cooldown.mark(owner, now);
        }
        outcome
    }

    pub fn build_and_persist(&self, player: &dyn LivePlayer) -> Option<Snapshot> {
        self.create_backup(player).into_snapshot()
    }

    pub fn list(&self, owner: &str) -> Vec<(usize, Snapshot)> {
        self.store.list(owner)
    }

    pub fn get(&self, owner: &str, index: usize) -> Option<Snapshot> {
        self.store.get(owner, index)
    }

    pub fn count(&self, owner: &str) -> usize {
        self.store.count(owner)
    }

    /// Delete the listed snapshot at `index`. Emptying the archive also reopens
    /// the owner's cooldown gate.
    pub fn delete_by_index(&self, owner: &str, index: usize) -> bool {
        let deleted = self.store.delete(owner, index);
        if deleted && self.store.count(owner) == 0 {
            self.cooldown.forget(owner);
            debug!("invsafe: {} archive emptied, cooldown cleared", owner);
        }
        deleted
    }

    pub fn restore_snapshot(&self, snapshot: &Snapshot, player: &mut dyn LivePlayer) -> bool {
        RestoreEngine::new(self.codec()).restore(snapshot, player)
    }

    /// Restore the listed snapshot at `index`; false if it does not exist or restore failed.
    pub fn restore_by_index(&self, player: &mut dyn LivePlayer, index: usize) -> bool {
        let snapshot = match self.store.get(player.owner_id(), index) {
            Some(s) => s,
            None => {
                debug!("invsafe: {} has no backup #{}", player.display_name(), index);
                return false;
            }
        };
        self.restore_snapshot(&snapshot, player)
    }

    /// Restore with a per-item report; None if the index does not exist.
    pub fn restore_by_index_report(
        &self,
        player: &mut dyn LivePlayer,
        index: usize,
    ) -> Option<Result<RestoreReport>> {
        let snapshot = self.store.get(player.owner_id(), index)?;
        let res = RestoreEngine::new(self.codec()).apply(&snapshot, player);
        record_restore(res.is_ok());
        Some(res)
    }
}

fn classify(e: anyhow::Error) -> SafeError {
    match e.downcast::<std::io::Error>() {
        Ok(io) => SafeError::Io(io),
        Err(other) => SafeError::Unexpected(format!("{other:#}")),
    }
}
