//! Snapshot record format (one JSON file per snapshot).
//!
//! Файл: <archive_root>/<owner>/backup_<yyyyMMdd_HHmmss>[_NNN].json, pretty JSON.
//!
//! Имена полей стабильны и совпадают с архивами, записанными исходным плагином:
//! {
//!   "timestamp": "2026-10-18 12:00:00",
//!   "items": [ {"item":"minecraft:stone","count":64,"nbt":"{..}"} ],
//!   "trinketItems": [ {"item":"..","count":1,"nbt":null,"slotType":"trinket:ring"} ],
//!   "experience": 30,
//!   "deathLocation": {"dimension":"minecraft:overworld","x":0.5,"y":64.0,"z":-3.2},
//!   "filename": "backup_20261018_120000.json"
//! }
//!
//! Совместимость:
//! - неизвестные поля игнорируются (serde по умолчанию);
//! - старые файлы без trinketItems / slotType / nbt / filename читаются с пустыми значениями.

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DIMENSION, SLOT_TAG_PREFIX};

/// One occupied slot's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "item")]
    pub type_id: String,
    #[serde(rename = "count")]
    pub quantity: u32,
    /// Codec output; absent when encoding failed.
    #[serde(rename = "nbt", default)]
    pub encoded_payload: Option<String>,
    /// Equipment slot the item came from, `trinket:<slot id>`.
    #[serde(rename = "slotType", default, skip_serializing_if = "Option::is_none")]
    pub origin_slot: Option<String>,
}

impl ItemRecord {
    pub fn new(type_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            type_id: type_id.into(),
            quantity,
            encoded_payload: None,
            origin_slot: None,
        }
    }

    pub fn with_payload(mut self, payload: Option<String>) -> Self {
        self.encoded_payload = payload;
        self
    }

    pub fn with_origin_slot(mut self, slot_id: &str) -> Self {
        self.origin_slot = Some(format!("{SLOT_TAG_PREFIX}{slot_id}"));
        self
    }

    /// Bare equipment slot id (tag prefix stripped), if the record carries one.
    pub fn origin_slot_id(&self) -> Option<&str> {
        self.origin_slot
            .as_deref()
            .map(|s| s.strip_prefix(SLOT_TAG_PREFIX).unwrap_or(s))
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub dimension: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION.to_string(),
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }
}

/// Immutable capture of inventory + experience + location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "timestamp", with = "timestamp_format")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "items", default)]
    pub primary_items: Vec<ItemRecord>,
    #[serde(rename = "trinketItems", default)]
    pub secondary_items: Vec<ItemRecord>,
    #[serde(rename = "experience", default)]
    pub experience_level: u32,
    #[serde(rename = "deathLocation", default)]
    pub location: Location,
    /// Archive file name; empty until persisted.
    #[serde(rename = "filename", default)]
    pub storage_key: String,
}

impl Snapshot {
    pub fn new(
        primary_items: Vec<ItemRecord>,
        secondary_items: Vec<ItemRecord>,
        experience_level: u32,
        location: Location,
    ) -> Self {
        Self {
            created_at: now_seconds(),
            primary_items,
            secondary_items,
            experience_level,
            location,
            storage_key: String::new(),
        }
    }

    /// No items anywhere and no experience: not worth archiving.
    pub fn is_empty(&self) -> bool {
        self.primary_items.is_empty()
            && self.secondary_items.is_empty()
            && self.experience_level == 0
    }

    pub fn item_count(&self) -> usize {
        self.primary_items.len() + self.secondary_items.len()
    }

    pub fn primary_quantity(&self) -> u64 {
        self.primary_items.iter().map(|r| r.quantity as u64).sum()
    }

    pub fn secondary_quantity(&self) -> u64 {
        self.secondary_items.iter().map(|r| r.quantity as u64).sum()
    }

    /// Coarse content fingerprint: record counts, summed quantities and experience.
    /// Two different inventories with equal counts and sums compare equal here.
    pub fn same_content_as(&self, other: &Snapshot) -> bool {
        self.primary_items.len() == other.primary_items.len()
            && self.secondary_items.len() == other.secondary_items.len()
            && self.experience_level == other.experience_level
            && self.primary_quantity() == other.primary_quantity()
            && self.secondary_quantity() == other.secondary_quantity()
    }

    /// One-line summary used by listings.
    pub fn summary(&self) -> String {
        format!(
            "{} ({} items [{} inv + {} trinkets], {} levels)",
            self.created_at.format(crate::consts::TIMESTAMP_FORMAT),
            self.item_count(),
            self.primary_items.len(),
            self.secondary_items.len(),
            self.experience_level
        )
    }
}

/// Local wall clock truncated to whole seconds (the on-disk precision).
pub fn now_seconds() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::consts::TIMESTAMP_FORMAT;

    pub fn serialize<S>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_record_without_trinkets_loads() {
        let json = r#"{
            "timestamp": "2025-01-02 03:04:05",
            "items": [{"item": "minecraft:stone", "count": 12}],
            "experience": 3,
            "deathLocation": {"dimension": "minecraft:the_nether", "x": 1.5, "y": 70.0, "z": -2.0},
            "someFutureField": {"ignored": true}
        }"#;
        let s: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(s.primary_items.len(), 1);
        assert_eq!(s.primary_items[0].encoded_payload, None);
        assert_eq!(s.primary_items[0].origin_slot, None);
        assert!(s.secondary_items.is_empty());
        assert_eq!(s.storage_key, "");
        assert_eq!(s.location.dimension, "minecraft:the_nether");
        assert_eq!(
            s.created_at.format(crate::consts::TIMESTAMP_FORMAT).to_string(),
            "2025-01-02 03:04:05"
        );
    }

    #[test]
    fn origin_slot_tag_roundtrip() {
        let r = ItemRecord::new("mod:ring", 1).with_origin_slot("hand/ring");
        assert_eq!(r.origin_slot.as_deref(), Some("trinket:hand/ring"));
        assert_eq!(r.origin_slot_id(), Some("hand/ring"));

        let bare = ItemRecord {
            origin_slot: Some("belt".into()),
            ..ItemRecord::new("mod:belt", 1)
        };
        assert_eq!(bare.origin_slot_id(), Some("belt"));
    }

    #[test]
    fn fingerprint_ignores_order_but_not_sums() {
        let a = Snapshot::new(
            vec![ItemRecord::new("a", 3), ItemRecord::new("b", 5)],
            vec![],
            7,
            Location::default(),
        );
        let mut b = a.clone();
        b.primary_items.reverse();
        assert!(a.same_content_as(&b));

        b.primary_items[0].quantity += 1;
        assert!(!a.same_content_as(&b));
    }
}
