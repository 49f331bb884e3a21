//! Live-state collaborators: item stacks, the primary container, the optional
//! equipment container and the player that owns them.
//!
//! The game engine implements these traits; [`MemoryPlayer`] is the in-process
//! implementation used by the CLI (player files) and by tests.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::consts::AIR_ITEM;
use crate::model::Location;

/// Item identity + quantity + opaque structured components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub count: u32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub components: Map<String, Value>,
}

impl ItemStack {
    pub fn new(item: impl Into<String>, count: u32) -> Self {
        Self {
            item: item.into(),
            count,
            components: Map::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(AIR_ITEM, 0)
    }

    pub fn with_component(mut self, key: impl Into<String>, value: Value) -> Self {
        self.components.insert(key.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.item == AIR_ITEM
    }
}

impl Default for ItemStack {
    fn default() -> Self {
        Self::empty()
    }
}

/// Main inventory: fixed number of positional slots.
pub trait PrimaryContainer {
    fn size(&self) -> usize;
    /// Stack in slot `i`; empty stack for an empty or out-of-range slot.
    fn get_slot(&self, i: usize) -> ItemStack;
    fn set_slot(&mut self, i: usize, stack: ItemStack);
    fn clear(&mut self);
    /// Put the stack wherever it fits. False if the container is full.
    fn insert_overflow(&mut self, stack: ItemStack) -> bool;
}

/// Equipment-like container keyed by stable slot ids.
///
/// Every method may fail with "not reachable" (mod not installed, component missing);
/// callers treat that as zero secondary items.
pub trait EquipmentContainer {
    /// All slots, occupied or not, in a stable order.
    fn slots(&self) -> Result<Vec<(String, ItemStack)>>;
    fn set_slot(&mut self, slot_id: &str, stack: ItemStack) -> Result<()>;
}

/// The entity whose inventory is archived.
pub trait LivePlayer {
    /// Stable owner identity (archive key).
    fn owner_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn experience_level(&self) -> u32;
    fn set_experience_level(&mut self, level: u32);
    fn location(&self) -> Location;
    fn inventory(&self) -> &dyn PrimaryContainer;
    fn equipment(&self) -> Option<&dyn EquipmentContainer>;
    /// Both containers at once, for operations that move items between them.
    fn containers_mut(
        &mut self,
    ) -> (
        &mut dyn PrimaryContainer,
        Option<&mut dyn EquipmentContainer>,
    );
}

// ------------------------- in-memory implementation -------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryInventory {
    slots: Vec<Option<ItemStack>>,
}

impl MemoryInventory {
    pub fn with_size(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    /// Occupied slots as (index, stack).
    pub fn occupied(&self) -> Vec<(usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().filter(|st| !st.is_empty()).map(|st| (i, st)))
            .collect()
    }
}

impl PrimaryContainer for MemoryInventory {
    fn size(&self) -> usize {
        self.slots.len()
    }

    fn get_slot(&self, i: usize) -> ItemStack {
        self.slots
            .get(i)
            .and_then(|s| s.clone())
            .unwrap_or_default()
    }

    fn set_slot(&mut self, i: usize, stack: ItemStack) {
        if let Some(slot) = self.slots.get_mut(i) {
            *slot = if stack.is_empty() { None } else { Some(stack) };
        }
    }

    fn clear(&mut self) {
        for s in self.slots.iter_mut() {
            *s = None;
        }
    }

    fn insert_overflow(&mut self, stack: ItemStack) -> bool {
        if stack.is_empty() {
            return true;
        }
        match self.slots.iter_mut().find(|s| s.is_none()) {
            Some(slot) => {
                *slot = Some(stack);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlot {
    pub id: String,
    #[serde(default)]
    pub stack: Option<ItemStack>,
}

/// Equipment container; `available = false` models a missing mod/component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEquipment {
    slots: Vec<EquipmentSlot>,
    #[serde(default = "default_true")]
    available: bool,
}

fn default_true() -> bool {
    true
}

impl MemoryEquipment {
    pub fn with_slots<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            slots: ids
                .into_iter()
                .map(|id| EquipmentSlot {
                    id: id.into(),
                    stack: None,
                })
                .collect(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            slots: Vec::new(),
            available: false,
        }
    }

    /// Stack in the first slot named `id`, if occupied.
    pub fn stack_in(&self, id: &str) -> Option<&ItemStack> {
        self.slots
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.stack.as_ref())
    }

    pub fn occupied(&self) -> Vec<(&str, &ItemStack)> {
        self.slots
            .iter()
            .filter_map(|s| s.stack.as_ref().map(|st| (s.id.as_str(), st)))
            .collect()
    }
}

impl EquipmentContainer for MemoryEquipment {
    fn slots(&self) -> Result<Vec<(String, ItemStack)>> {
        if !self.available {
            return Err(anyhow!("equipment component not installed"));
        }
        Ok(self
            .slots
            .iter()
            .map(|s| (s.id.clone(), s.stack.clone().unwrap_or_default()))
            .collect())
    }

    /// Slot ids may repeat (two ring slots). A non-empty stack goes into the first empty
    /// slot with that id, an empty stack clears the first occupied one; otherwise the
    /// first slot with that id is overwritten.
    fn set_slot(&mut self, slot_id: &str, stack: ItemStack) -> Result<()> {
        if !self.available {
            return Err(anyhow!("equipment component not installed"));
        }
        let stack = if stack.is_empty() { None } else { Some(stack) };
        let clearing = stack.is_none();
        let pos = self
            .slots
            .iter()
            .position(|s| s.id == slot_id && s.stack.is_some() == clearing)
            .or_else(|| self.slots.iter().position(|s| s.id == slot_id))
            .ok_or_else(|| anyhow!("no equipment slot '{}'", slot_id))?;
        self.slots[pos].stack = stack;
        Ok(())
    }
}

/// File-backed / test player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPlayer {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub location: Location,
    pub inventory: MemoryInventory,
    #[serde(default)]
    pub equipment: Option<MemoryEquipment>,
}

impl MemoryPlayer {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, inventory_size: usize) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            experience: 0,
            location: Location::default(),
            inventory: MemoryInventory::with_size(inventory_size),
            equipment: None,
        }
    }

    pub fn with_equipment(mut self, equipment: MemoryEquipment) -> Self {
        self.equipment = Some(equipment);
        self
    }
}

impl LivePlayer for MemoryPlayer {
    fn owner_id(&self) -> &str {
        &self.uuid
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn experience_level(&self) -> u32 {
        self.experience
    }

    fn set_experience_level(&mut self, level: u32) {
        self.experience = level;
    }

    fn location(&self) -> Location {
        self.location.clone()
    }

    fn inventory(&self) -> &dyn PrimaryContainer {
        &self.inventory
    }

    fn equipment(&self) -> Option<&dyn EquipmentContainer> {
        self.equipment
            .as_ref()
            .map(|e| e as &dyn EquipmentContainer)
    }

    fn containers_mut(
        &mut self,
    ) -> (
        &mut dyn PrimaryContainer,
        Option<&mut dyn EquipmentContainer>,
    ) {
        (
            &mut self.inventory,
            self.equipment
                .as_mut()
                .map(|e| e as &mut dyn EquipmentContainer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_fills_first_free_slot_then_refuses() {
        let mut inv = MemoryInventory::with_size(2);
        inv.set_slot(1, ItemStack::new("minecraft:dirt", 1));
        assert!(inv.insert_overflow(ItemStack::new("minecraft:stone", 2)));
        assert_eq!(inv.get_slot(0).item, "minecraft:stone");
        assert!(!inv.insert_overflow(ItemStack::new("minecraft:sand", 3)));
    }

    #[test]
    fn equipment_set_prefers_empty_slot_with_same_id() {
        let mut eq = MemoryEquipment::with_slots(["ring", "ring", "belt"]);
        eq.set_slot("ring", ItemStack::new("mod:gold_ring", 1)).unwrap();
        eq.set_slot("ring", ItemStack::new("mod:iron_ring", 1)).unwrap();
        let rings: Vec<_> = eq
            .occupied()
            .into_iter()
            .filter(|(id, _)| *id == "ring")
            .map(|(_, st)| st.item.clone())
            .collect();
        assert_eq!(rings, vec!["mod:gold_ring", "mod:iron_ring"]);

        eq.set_slot("ring", ItemStack::empty()).unwrap();
        eq.set_slot("ring", ItemStack::empty()).unwrap();
        assert!(eq.occupied().is_empty());
        assert!(eq.set_slot("missing", ItemStack::new("x", 1)).is_err());
    }

    #[test]
    fn unavailable_equipment_errors() {
        let eq = MemoryEquipment::unavailable();
        assert!(eq.slots().is_err());
    }
}
