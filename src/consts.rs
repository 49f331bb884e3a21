//! Общие константы (раскладка архива, ретенция, предметы).

// -------- Archive layout --------
pub const DEFAULT_ARCHIVE_ROOT: &str = "config/invsafe/death_backups";
pub const BACKUP_FILE_PREFIX: &str = "backup_";
pub const BACKUP_FILE_EXT: &str = "json";
pub const TMP_FILE_EXT: &str = "tmp";
pub const LOCK_FILE: &str = "LOCK";
// Last storage key handed out (never reused)
pub const LAST_KEY_FILE: &str = "LAST_KEY";

// chrono format strings
pub const FILE_TOKEN_FORMAT: &str = "%Y%m%d_%H%M%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Collision suffix within one second: backup_<token>_NNN.json
pub const MAX_KEY_SUFFIX: u32 = 999;

// -------- Retention / gating --------
pub const DEFAULT_MAX_BACKUPS: usize = 5;
pub const DEFAULT_COOLDOWN_MS: u64 = 5000;

// -------- Items --------
pub const AIR_ITEM: &str = "minecraft:air";
pub const SLOT_TAG_PREFIX: &str = "trinket:";
pub const DEFAULT_DIMENSION: &str = "minecraft:overworld";
