//! Centralized configuration for InvSafe.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - InvSafeConfig::from_env() reads the INVSAFE_* variables; fluent `with_*` setters
//!   override individual fields afterwards (tests, CLI flags).
//!
//! Defaults:
//! - archive_root = config/invsafe/death_backups
//! - max_backups = 5 (retention bound per owner)
//! - cooldown_ms = 5000 (minimum interval between automatic backups per owner)
//! - fsync = false
//! - fallback_item = minecraft:air (registry default for unresolvable identities)

use std::fmt;
use std::path::{Path, PathBuf};

use crate::consts::{AIR_ITEM, DEFAULT_ARCHIVE_ROOT, DEFAULT_COOLDOWN_MS, DEFAULT_MAX_BACKUPS};

/// Top-level configuration for the backup facility.
#[derive(Clone, Debug)]
pub struct InvSafeConfig {
    /// Directory that holds one sub-directory per owner.
    /// Env: INVSAFE_ROOT
    pub archive_root: PathBuf,

    /// Retention bound: snapshots kept per owner.
    /// Env: INVSAFE_MAX_BACKUPS (default 5, values < 1 are ignored)
    pub max_backups: usize,

    /// Per-owner cooldown between automatic backups, milliseconds (0 disables).
    /// Env: INVSAFE_COOLDOWN_MS (default 5000)
    pub cooldown_ms: u64,

    /// fsync snapshot files before the tmp -> final rename.
    /// Env: INVSAFE_FSYNC ("1|true|on|yes" => true)
    pub fsync: bool,

    /// Identity used by the JSON codec when a type id cannot be resolved.
    /// Env: INVSAFE_FALLBACK_ITEM (default minecraft:air)
    pub fallback_item: String,
}

impl Default for InvSafeConfig {
    fn default() -> Self {
        Self {
            archive_root: PathBuf::from(DEFAULT_ARCHIVE_ROOT),
            max_backups: DEFAULT_MAX_BACKUPS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
            fsync: false,
            fallback_item: AIR_ITEM.to_string(),
        }
    }
}

fn env_flag(v: &str) -> bool {
    let s = v.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

impl InvSafeConfig {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("INVSAFE_ROOT") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.archive_root = PathBuf::from(s);
            }
        }

        if let Ok(v) = std::env::var("INVSAFE_MAX_BACKUPS") {
            if let Ok(n) = v.trim().parse::<usize>() {
                if n > 0 {
                    cfg.max_backups = n;
                }
            }
        }

        if let Ok(v) = std::env::var("INVSAFE_COOLDOWN_MS") {
            if let Ok(n) = v.trim().parse::<u64>() {
                cfg.cooldown_ms = n;
            }
        }

        if let Ok(v) = std::env::var("INVSAFE_FSYNC") {
            cfg.fsync = env_flag(&v);
        }

        if let Ok(v) = std::env::var("INVSAFE_FALLBACK_ITEM") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.fallback_item = s.to_string();
            }
        }

        cfg
    }

    pub fn with_archive_root<P: AsRef<Path>>(mut self, root: P) -> Self {
        self.archive_root = root.as_ref().to_path_buf();
        self
    }

    /// Zero is clamped to 1: an archive that keeps nothing is not an archive.
    pub fn with_max_backups(mut self, n: usize) -> Self {
        self.max_backups = n.max(1);
        self
    }

    pub fn with_cooldown_ms(mut self, ms: u64) -> Self {
        self.cooldown_ms = ms;
        self
    }

    pub fn with_fsync(mut self, on: bool) -> Self {
        self.fsync = on;
        self
    }

    pub fn with_fallback_item<S: Into<String>>(mut self, item: S) -> Self {
        self.fallback_item = item.into();
        self
    }
}

impl fmt::Display for InvSafeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvSafeConfig {{ \
             archive_root: {}, \
             max_backups: {}, \
             cooldown_ms: {}, \
             fsync: {}, \
             fallback_item: {} \
             }}",
            self.archive_root.display(),
            self.max_backups,
            self.cooldown_ms,
            self.fsync,
            self.fallback_item,
        )
    }
}
