//! Item codec: live stack <-> textual payload stored in `ItemRecord.nbt`.
//!
//! The real encoder belongs to the game engine; [`ItemCodec`] is the seam.
//! [`JsonItemCodec`] is the bundled implementation: the payload is the stack as
//! compact JSON, identities are validated against an [`ItemRegistry`].
//!
//! Fallback chain on the read side ([`decode_record`]):
//!   payload -> decode; on failure/absence -> resolve(type_id, quantity);
//!   on unknown identity -> default_stack(type_id, quantity).

use anyhow::{anyhow, Context, Result};
use log::warn;
use std::collections::BTreeSet;

use crate::consts::AIR_ITEM;
use crate::error::{Recovered, SafeError};
use crate::inventory::ItemStack;
use crate::metrics::{record_decode_degraded, record_encode_degraded};
use crate::model::ItemRecord;

pub trait ItemCodec {
    fn encode(&self, stack: &ItemStack) -> Result<String>;
    fn decode(&self, payload: &str) -> Result<ItemStack>;
    /// Bare stack for a known identity. Err for identities the registry does not know.
    fn resolve(&self, type_id: &str, quantity: u32) -> Result<ItemStack>;
    /// Registry default for an unresolvable identity.
    fn default_stack(&self, type_id: &str, quantity: u32) -> ItemStack;
}

/// Known item identities. An empty registry accepts every namespaced id.
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    known: BTreeSet<String>,
}

impl ItemRegistry {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn register(&mut self, id: impl Into<String>) {
        self.known.insert(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        if id.is_empty() || !id.contains(':') {
            return false;
        }
        id == AIR_ITEM || self.known.is_empty() || self.known.contains(id)
    }
}

#[derive(Debug, Clone)]
pub struct JsonItemCodec {
    registry: ItemRegistry,
    fallback_item: String,
}

impl JsonItemCodec {
    pub fn new(registry: ItemRegistry) -> Self {
        Self {
            registry,
            fallback_item: AIR_ITEM.to_string(),
        }
    }

    pub fn with_fallback_item(mut self, item: impl Into<String>) -> Self {
        self.fallback_item = item.into();
        self
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }
}

impl ItemCodec for JsonItemCodec {
    fn encode(&self, stack: &ItemStack) -> Result<String> {
        if !self.registry.contains(&stack.item) {
            return Err(anyhow!("unregistered item '{}'", stack.item));
        }
        serde_json::to_string(stack).context("serialize item stack")
    }

    fn decode(&self, payload: &str) -> Result<ItemStack> {
        let stack: ItemStack = serde_json::from_str(payload).context("parse item payload")?;
        if !self.registry.contains(&stack.item) {
            return Err(anyhow!("unregistered item '{}'", stack.item));
        }
        Ok(stack)
    }

    fn resolve(&self, type_id: &str, quantity: u32) -> Result<ItemStack> {
        if !self.registry.contains(type_id) {
            return Err(anyhow!("unresolvable item type '{}'", type_id));
        }
        Ok(ItemStack::new(type_id, quantity))
    }

    fn default_stack(&self, _type_id: &str, quantity: u32) -> ItemStack {
        ItemStack::new(self.fallback_item.clone(), quantity)
    }
}

/// Encode one live stack into a record. Encoding failure keeps identity + quantity.
pub fn encode_stack(codec: &dyn ItemCodec, stack: &ItemStack) -> Recovered<ItemRecord> {
    let record = ItemRecord::new(stack.item.clone(), stack.count);
    match codec.encode(stack) {
        Ok(payload) => Recovered::Full(record.with_payload(Some(payload))),
        Err(e) => {
            warn!("encode: failed to encode item stack {}: {:#}", stack.item, e);
            record_encode_degraded();
            Recovered::Degraded {
                value: record,
                cause: SafeError::Encoding {
                    item: stack.item.clone(),
                    reason: format!("{e:#}"),
                },
            }
        }
    }
}

/// Rebuild a live stack from a record; never fails, degrades instead.
pub fn decode_record(codec: &dyn ItemCodec, record: &ItemRecord) -> Recovered<ItemStack> {
    let decode_err = match record.encoded_payload.as_deref() {
        Some(payload) => match codec.decode(payload) {
            Ok(stack) => return Recovered::Full(stack),
            Err(e) => {
                warn!(
                    "decode: failed to decode payload for item {}: {:#}",
                    record.type_id, e
                );
                Some(SafeError::Decoding {
                    item: record.type_id.clone(),
                    reason: format!("{e:#}"),
                })
            }
        },
        None => None,
    };

    match codec.resolve(&record.type_id, record.quantity) {
        Ok(stack) => match decode_err {
            Some(cause) => {
                record_decode_degraded();
                Recovered::Degraded {
                    value: stack,
                    cause,
                }
            }
            // No payload was ever stored: a bare stack is the best fidelity available.
            None => Recovered::Full(stack),
        },
        Err(e) => {
            warn!(
                "decode: {:#}; using registry default for {} x{}",
                e, record.type_id, record.quantity
            );
            record_decode_degraded();
            Recovered::Degraded {
                value: codec.default_stack(&record.type_id, record.quantity),
                cause: SafeError::UnresolvableType(record.type_id.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> JsonItemCodec {
        JsonItemCodec::new(ItemRegistry::with_items(["minecraft:diamond_sword"]))
            .with_fallback_item("minecraft:barrier")
    }

    #[test]
    fn payload_keeps_components() {
        let c = codec();
        let stack = ItemStack::new("minecraft:diamond_sword", 1)
            .with_component("damage", json!(12))
            .with_component("enchantments", json!({"sharpness": 5}));
        let rec = encode_stack(&c, &stack);
        assert!(!rec.is_degraded());
        let back = decode_record(&c, rec.value());
        assert!(!back.is_degraded());
        assert_eq!(back.into_inner(), stack);
    }

    #[test]
    fn unregistered_item_encodes_without_payload() {
        let c = codec();
        let rec = encode_stack(&c, &ItemStack::new("othermod:widget", 4));
        assert!(matches!(rec.cause(), Some(SafeError::Encoding { .. })));
        let rec = rec.into_inner();
        assert_eq!(rec.encoded_payload, None);
        assert_eq!(rec.quantity, 4);
    }

    #[test]
    fn corrupt_payload_falls_back_to_bare_stack() {
        let c = codec();
        let rec = ItemRecord::new("minecraft:diamond_sword", 1).with_payload(Some("{not json".into()));
        let got = decode_record(&c, &rec);
        assert!(matches!(got.cause(), Some(SafeError::Decoding { .. })));
        assert_eq!(got.into_inner(), ItemStack::new("minecraft:diamond_sword", 1));
    }

    #[test]
    fn unknown_identity_uses_registry_default() {
        let c = codec();
        let got = decode_record(&c, &ItemRecord::new("gone:thing", 7));
        assert!(matches!(got.cause(), Some(SafeError::UnresolvableType(_))));
        assert_eq!(got.into_inner(), ItemStack::new("minecraft:barrier", 7));
    }

    #[test]
    fn open_registry_requires_namespace() {
        let r = ItemRegistry::open();
        assert!(r.contains("anymod:anything"));
        assert!(!r.contains("no_namespace"));
    }
}
