//! Restore engine: stored [`Snapshot`] -> live player.
//!
//! Порядок:
//! 1) очистить основной инвентарь;
//! 2) primary_items по порядку: decode (с фолбэком) и в слот с тем же индексом,
//!    индексы за пределами size() молча отбрасываются;
//! 3) если экипировка доступна, очистить все её слоты;
//! 4) secondary_items: (a) исходный слот (если такой id есть и он пуст),
//!    (b) первый пустой слот экипировки, (c) insert_overflow в основной инвентарь;
//!    без доступной экипировки всё идёт сразу в (c);
//! 5) уровень опыта перезаписывается значением из снапшота.
//!
//! Ошибки отдельных предметов только деградируют предмет; restore() возвращает false
//! лишь когда ошибка прерывает всю последовательность.

use anyhow::Result;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::codec::{decode_record, ItemCodec};
use crate::inventory::{EquipmentContainer, ItemStack, LivePlayer, PrimaryContainer};
use crate::metrics::{record_restore, record_spilled};
use crate::model::{ItemRecord, Snapshot};

/// What happened to each stored record during one restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Primary records placed at their positional index.
    pub placed: usize,
    /// Primary records whose index exceeded the target capacity.
    pub dropped: usize,
    pub equipped_exact: usize,
    pub equipped_fallback: usize,
    /// Secondary records moved into the primary container.
    pub spilled: usize,
    /// Secondary records the primary container refused (full).
    pub lost: usize,
    /// Records rebuilt from identity + quantity or a registry default.
    pub degraded: usize,
}

pub struct RestoreEngine<'a> {
    codec: &'a dyn ItemCodec,
}

impl<'a> RestoreEngine<'a> {
    pub fn new(codec: &'a dyn ItemCodec) -> Self {
        Self { codec }
    }

    /// Apply the snapshot; false only when the whole sequence failed.
    pub fn restore(&self, snapshot: &Snapshot, player: &mut dyn LivePlayer) -> bool {
        let name = player.display_name().to_string();
        match self.apply(snapshot, player) {
            Ok(report) => {
                record_restore(true);
                info!(
                    "restore: {} loaded {} (placed={}, dropped={}, equipped={}+{}, spilled={}, lost={}, degraded={})",
                    name,
                    snapshot.storage_key,
                    report.placed,
                    report.dropped,
                    report.equipped_exact,
                    report.equipped_fallback,
                    report.spilled,
                    report.lost,
                    report.degraded
                );
                true
            }
            Err(e) => {
                record_restore(false);
                error!("restore: failed to load backup {} for {}: {:#}", snapshot.storage_key, name, e);
                false
            }
        }
    }

    /// Same as [`restore`](Self::restore) but reports per-item outcomes and surfaces the error.
    pub fn apply(&self, snapshot: &Snapshot, player: &mut dyn LivePlayer) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();
        {
            let (inv, equipment) = player.containers_mut();

            inv.clear();
            self.restore_primary(snapshot, inv, &mut report);

            let reachable = match equipment {
                Some(eq) => match eq.slots() {
                    Ok(_) => Some(eq),
                    Err(e) => {
                        warn!("restore: equipment unavailable, spilling into inventory: {:#}", e);
                        None
                    }
                },
                None => None,
            };

            match reachable {
                Some(eq) => self.restore_equipment(snapshot, inv, eq, &mut report)?,
                None => {
                    for rec in &snapshot.secondary_items {
                        if let Some(stack) = self.decode(rec, &mut report) {
                            spill(inv, stack, &mut report);
                        }
                    }
                }
            }
        }
        player.set_experience_level(snapshot.experience_level);
        Ok(report)
    }

    fn decode(&self, rec: &ItemRecord, report: &mut RestoreReport) -> Option<ItemStack> {
        let got = decode_record(self.codec, rec);
        if got.is_degraded() {
            report.degraded += 1;
        }
        let stack = got.into_inner();
        if stack.is_empty() {
            debug!("restore: {} x{} decoded to an empty stack, skipped", rec.type_id, rec.quantity);
            return None;
        }
        Some(stack)
    }

    fn restore_primary(
        &self,
        snapshot: &Snapshot,
        inv: &mut dyn PrimaryContainer,
        report: &mut RestoreReport,
    ) {
        let size = inv.size();
        for (index, rec) in snapshot.primary_items.iter().enumerate() {
            if index >= size {
                report.dropped += 1;
                debug!("restore: slot {} beyond capacity {}, dropped {}", index, size, rec.type_id);
                continue;
            }
            if let Some(stack) = self.decode(rec, report) {
                inv.set_slot(index, stack);
                report.placed += 1;
            }
        }
    }

    fn restore_equipment(
        &self,
        snapshot: &Snapshot,
        inv: &mut dyn PrimaryContainer,
        eq: &mut dyn EquipmentContainer,
        report: &mut RestoreReport,
    ) -> Result<()> {
        // No stale equipped item survives, even when the stored set is smaller.
        for (slot_id, stack) in eq.slots()? {
            if !stack.is_empty() {
                eq.set_slot(&slot_id, ItemStack::empty())?;
            }
        }

        for rec in &snapshot.secondary_items {
            let stack = match self.decode(rec, report) {
                Some(s) => s,
                None => continue,
            };
            let live = eq.slots()?;

            if let Some(origin) = rec.origin_slot_id() {
                if live.iter().any(|(id, st)| id == origin && st.is_empty()) {
                    eq.set_slot(origin, stack)?;
                    report.equipped_exact += 1;
                    continue;
                }
            }

            if let Some((free_id, _)) = live.iter().find(|(_, st)| st.is_empty()) {
                debug!(
                    "restore: {} placed in {} instead of {}",
                    rec.type_id,
                    free_id,
                    rec.origin_slot.as_deref().unwrap_or("(none)")
                );
                eq.set_slot(free_id, stack)?;
                report.equipped_fallback += 1;
                continue;
            }

            spill(inv, stack, report);
        }
        Ok(())
    }
}

fn spill(inv: &mut dyn PrimaryContainer, stack: ItemStack, report: &mut RestoreReport) {
    let item = stack.item.clone();
    if inv.insert_overflow(stack) {
        report.spilled += 1;
        record_spilled();
        warn!("restore: could not equip {}, added to main inventory", item);
    } else {
        report.lost += 1;
        warn!("restore: could not equip {} and main inventory is full", item);
    }
}
