#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod config;
pub mod error;
pub mod metrics;
pub mod lock;

// Формат снапшота и коллабораторы (инвентарь, экипировка, кодек)
pub mod model;
pub mod inventory;
pub mod codec;

// Архив на диске: src/store/{mod,io,retention}.rs
pub mod store;

// Сборка / восстановление / гейт
pub mod builder;
pub mod restore;
pub mod cooldown;

// Фасад
pub mod safe;

// Удобные реэкспорты
pub use builder::SnapshotBuilder;
pub use codec::{decode_record, encode_stack, ItemCodec, ItemRegistry, JsonItemCodec};
pub use config::InvSafeConfig;
pub use cooldown::BackupCooldown;
pub use error::{Recovered, SafeError};
pub use inventory::{
    EquipmentContainer, ItemStack, LivePlayer, MemoryEquipment, MemoryInventory, MemoryPlayer,
    PrimaryContainer,
};
pub use model::{ItemRecord, Location, Snapshot};
pub use restore::{RestoreEngine, RestoreReport};
pub use safe::{BackupOutcome, InventorySafe};
pub use store::{BackupStore, ListedBackup};
