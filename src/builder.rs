//! Snapshot builder: live player -> candidate [`Snapshot`].
//!
//! - every non-empty primary slot becomes an ItemRecord (slot order kept);
//! - every non-empty equipment slot becomes an ItemRecord tagged `trinket:<slot id>`;
//! - an unreachable equipment container counts as zero secondary items;
//! - nothing to archive (no items, zero experience) -> None.
//!
//! The duplicate check against the archive is the caller's next step
//! (see `InventorySafe::create_backup`).

use log::{debug, warn};

use crate::codec::{encode_stack, ItemCodec};
use crate::error::SafeError;
use crate::inventory::{EquipmentContainer, LivePlayer, PrimaryContainer};
use crate::model::{ItemRecord, Snapshot};

pub struct SnapshotBuilder<'a> {
    codec: &'a dyn ItemCodec,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(codec: &'a dyn ItemCodec) -> Self {
        Self { codec }
    }

    pub fn build(&self, player: &dyn LivePlayer) -> Option<Snapshot> {
        let primary_items = self.primary_records(player.inventory());
        let secondary_items = match player.equipment() {
            Some(eq) => match self.secondary_records(eq) {
                Ok(v) => v,
                Err(e) => {
                    warn!("builder: {} failed to save equipment: {}", player.display_name(), e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let snapshot = Snapshot::new(
            primary_items,
            secondary_items,
            player.experience_level(),
            player.location(),
        );
        if snapshot.is_empty() {
            debug!("builder: {} has nothing to back up", player.display_name());
            return None;
        }
        Some(snapshot)
    }

    fn primary_records(&self, inv: &dyn PrimaryContainer) -> Vec<ItemRecord> {
        (0..inv.size())
            .map(|i| inv.get_slot(i))
            .filter(|stack| !stack.is_empty())
            .map(|stack| encode_stack(self.codec, &stack).into_inner())
            .collect()
    }

    fn secondary_records(&self, eq: &dyn EquipmentContainer) -> Result<Vec<ItemRecord>, SafeError> {
        let slots = eq
            .slots()
            .map_err(|e| SafeError::CollaboratorUnavailable(format!("{e:#}")))?;
        Ok(slots
            .into_iter()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(slot_id, stack)| {
                encode_stack(self.codec, &stack)
                    .into_inner()
                    .with_origin_slot(&slot_id)
            })
            .collect())
    }
}
