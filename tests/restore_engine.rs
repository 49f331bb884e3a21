use anyhow::{anyhow, Result};

use InvSafe::metrics;
use InvSafe::{
    EquipmentContainer, ItemRecord, ItemRegistry, ItemStack, JsonItemCodec, LivePlayer, Location,
    MemoryEquipment, MemoryInventory, MemoryPlayer, PrimaryContainer, RestoreEngine, Snapshot,
};

fn codec() -> JsonItemCodec {
    JsonItemCodec::new(ItemRegistry::with_items([
        "minecraft:stone",
        "minecraft:diamond",
        "mod:ring",
        "mod:belt",
        "mod:charm",
    ]))
    .with_fallback_item("minecraft:barrier")
}

fn rec(id: &str, qty: u32) -> ItemRecord {
    ItemRecord::new(id, qty)
}

fn trinket(id: &str, slot: &str) -> ItemRecord {
    ItemRecord::new(id, 1).with_origin_slot(slot)
}

fn snapshot(primary: Vec<ItemRecord>, secondary: Vec<ItemRecord>, xp: u32) -> Snapshot {
    Snapshot::new(primary, secondary, xp, Location::default())
}

#[test]
fn unresolvable_type_degrades_to_registry_default() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player = MemoryPlayer::new("u1", "Steve", 36);

    let gone = rec("removedmod:widget", 3)
        .with_payload(Some(r#"{"item":"removedmod:widget","count":3}"#.to_string()));
    let snap = snapshot(vec![gone, rec("minecraft:stone", 10)], vec![], 0);

    assert!(engine.restore(&snap, &mut player), "restore must not fail on unknown items");
    assert_eq!(player.inventory.get_slot(0), ItemStack::new("minecraft:barrier", 3));
    assert_eq!(player.inventory.get_slot(1), ItemStack::new("minecraft:stone", 10));

    let mut again = MemoryPlayer::new("u1", "Steve", 36);
    let report = engine.apply(&snap, &mut again)?;
    assert_eq!(report.degraded, 1);
    assert_eq!(report.placed, 2);
    Ok(())
}

#[test]
fn primary_restored_by_sequence_position() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);

    // Captured from slots 0, 5 and 9: the records only keep their order.
    let snap = snapshot(
        vec![rec("minecraft:stone", 1), rec("minecraft:diamond", 2), rec("minecraft:stone", 3)],
        vec![],
        0,
    );
    let mut player = MemoryPlayer::new("u1", "Steve", 36);
    player.inventory.set_slot(20, ItemStack::new("minecraft:diamond", 64));

    engine.apply(&snap, &mut player)?;
    let occupied: Vec<(usize, u32)> = player
        .inventory
        .occupied()
        .into_iter()
        .map(|(i, s)| (i, s.count))
        .collect();
    assert_eq!(occupied, vec![(0, 1), (1, 2), (2, 3)], "live items are cleared first");
    Ok(())
}

#[test]
fn records_beyond_capacity_are_dropped() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let snap = snapshot((1..=4).map(|q| rec("minecraft:stone", q)).collect(), vec![], 0);
    let mut player = MemoryPlayer::new("u1", "Steve", 2);

    let report = engine.apply(&snap, &mut player)?;
    assert_eq!(report.placed, 2);
    assert_eq!(report.dropped, 2);
    assert_eq!(player.inventory.occupied().len(), 2);
    Ok(())
}

#[test]
fn experience_is_overwritten_not_added() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player = MemoryPlayer::new("u1", "Steve", 9);
    player.experience = 99;

    engine.apply(&snapshot(vec![], vec![], 7), &mut player)?;
    assert_eq!(player.experience, 7);
    Ok(())
}

#[test]
fn exact_slot_then_first_free_slot() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player = MemoryPlayer::new("u1", "Steve", 9)
        .with_equipment(MemoryEquipment::with_slots(["ring", "belt", "necklace"]));

    let snap = snapshot(
        vec![],
        vec![trinket("mod:belt", "belt"), trinket("mod:charm", "ankle")],
        0,
    );
    let report = engine.apply(&snap, &mut player)?;
    assert_eq!(report.equipped_exact, 1);
    assert_eq!(report.equipped_fallback, 1);

    let eq = player.equipment.as_ref().expect("equipment");
    assert_eq!(eq.stack_in("belt").map(|s| s.item.as_str()), Some("mod:belt"));
    // "ankle" does not exist: first empty slot in container order
    assert_eq!(eq.stack_in("ring").map(|s| s.item.as_str()), Some("mod:charm"));
    assert!(eq.stack_in("necklace").is_none());
    Ok(())
}

#[test]
fn equipment_overflow_spills_into_primary() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player = MemoryPlayer::new("u1", "Steve", 9)
        .with_equipment(MemoryEquipment::with_slots(["ring"]));

    let snap = snapshot(
        vec![rec("minecraft:stone", 5)],
        vec![trinket("mod:ring", "ring"), trinket("mod:charm", "ring")],
        0,
    );
    assert!(engine.restore(&snap, &mut player));

    let eq = player.equipment.as_ref().expect("equipment");
    assert_eq!(eq.stack_in("ring").map(|s| s.item.as_str()), Some("mod:ring"));
    let items: Vec<&str> = player
        .inventory
        .occupied()
        .into_iter()
        .map(|(_, s)| s.item.as_str())
        .collect();
    assert_eq!(items, vec!["minecraft:stone", "mod:charm"]);
    Ok(())
}

#[test]
fn stale_equipment_is_cleared() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut eq = MemoryEquipment::with_slots(["ring", "belt"]);
    eq.set_slot("belt", ItemStack::new("mod:belt", 1))?;
    let mut player = MemoryPlayer::new("u1", "Steve", 9).with_equipment(eq);

    engine.apply(&snapshot(vec![], vec![trinket("mod:ring", "ring")], 1), &mut player)?;
    let eq = player.equipment.as_ref().expect("equipment");
    assert!(eq.stack_in("belt").is_none(), "old belt must be gone");
    assert_eq!(eq.occupied().len(), 1);
    Ok(())
}

#[test]
fn unavailable_equipment_spills_everything() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player =
        MemoryPlayer::new("u1", "Steve", 9).with_equipment(MemoryEquipment::unavailable());

    let snap = snapshot(vec![], vec![trinket("mod:ring", "ring"), trinket("mod:belt", "belt")], 0);
    assert!(engine.restore(&snap, &mut player));

    let mut fresh =
        MemoryPlayer::new("u1", "Steve", 9).with_equipment(MemoryEquipment::unavailable());
    let report = engine.apply(&snap, &mut fresh)?;
    assert_eq!(report.spilled, 2);
    assert_eq!(fresh.inventory.occupied().len(), 2);
    Ok(())
}

#[test]
fn full_primary_loses_spilled_items_but_succeeds() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player = MemoryPlayer::new("u1", "Steve", 1);

    let snap = snapshot(vec![rec("minecraft:stone", 1)], vec![trinket("mod:ring", "ring")], 0);
    let report = engine.apply(&snap, &mut player)?;
    assert_eq!(report.placed, 1);
    assert_eq!(report.lost, 1);
    assert!(engine.restore(&snap, &mut player));
    Ok(())
}

#[test]
fn dropped_records_are_not_decoded() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    // Both records are unresolvable; only the one that fits is rebuilt.
    let snap = snapshot(vec![rec("gone:a", 1), rec("gone:b", 2)], vec![], 0);
    let mut player = MemoryPlayer::new("u1", "Steve", 1);

    let report = engine.apply(&snap, &mut player)?;
    assert_eq!(report.placed, 1);
    assert_eq!(report.dropped, 1);
    assert_eq!(report.degraded, 1, "a dropped record must not count as degraded");
    Ok(())
}

/// Equipment that lists its slots but refuses every write.
struct ReadOnlyEquipment;

impl EquipmentContainer for ReadOnlyEquipment {
    fn slots(&self) -> Result<Vec<(String, ItemStack)>> {
        Ok(vec![("ring".to_string(), ItemStack::empty())])
    }

    fn set_slot(&mut self, slot_id: &str, _stack: ItemStack) -> Result<()> {
        Err(anyhow!("slot '{}' is locked by another mod", slot_id))
    }
}

struct LockedPlayer {
    inventory: MemoryInventory,
    equipment: ReadOnlyEquipment,
    experience: u32,
}

impl LivePlayer for LockedPlayer {
    fn owner_id(&self) -> &str {
        "u-locked"
    }

    fn display_name(&self) -> &str {
        "Locked"
    }

    fn experience_level(&self) -> u32 {
        self.experience
    }

    fn set_experience_level(&mut self, level: u32) {
        self.experience = level;
    }

    fn location(&self) -> Location {
        Location::default()
    }

    fn inventory(&self) -> &dyn PrimaryContainer {
        &self.inventory
    }

    fn equipment(&self) -> Option<&dyn EquipmentContainer> {
        Some(&self.equipment as &dyn EquipmentContainer)
    }

    fn containers_mut(
        &mut self,
    ) -> (
        &mut dyn PrimaryContainer,
        Option<&mut dyn EquipmentContainer>,
    ) {
        (
            &mut self.inventory,
            Some(&mut self.equipment as &mut dyn EquipmentContainer),
        )
    }
}

#[test]
fn escaping_error_fails_the_whole_restore() -> Result<()> {
    let c = codec();
    let engine = RestoreEngine::new(&c);
    let mut player = LockedPlayer {
        inventory: MemoryInventory::with_size(9),
        equipment: ReadOnlyEquipment,
        experience: 3,
    };
    let snap = snapshot(vec![rec("minecraft:stone", 1)], vec![trinket("mod:ring", "ring")], 8);

    assert!(engine.apply(&snap, &mut player).is_err());

    let before = metrics::snapshot().restores_failed;
    assert!(!engine.restore(&snap, &mut player), "restore must report the failure");
    assert!(metrics::snapshot().restores_failed > before);
    assert_eq!(player.experience, 3, "experience is not applied after a failed sequence");
    Ok(())
}
