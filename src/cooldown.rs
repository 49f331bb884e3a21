//! Per-owner cooldown between automatic backups.
//!
//! Event sources (bed click, death hook) can fire in bursts; the gate lets the first
//! trigger through and ignores the rest until `window` has passed since the last
//! backup that was actually saved.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct BackupCooldown {
    window: Duration,
    last: Mutex<HashMap<String, Instant>>,
}

impl BackupCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True if `owner` may back up at `now`.
    pub fn is_ready(&self, owner: &str, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }
        let map = match self.last.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match map.get(owner) {
            Some(t) => now.saturating_duration_since(*t) > self.window,
            None => true,
        }
    }

    /// Time left until `owner` is ready again (zero if ready).
    pub fn remaining(&self, owner: &str, now: Instant) -> Duration {
        let map = match self.last.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match map.get(owner) {
            Some(t) => self.window.saturating_sub(now.saturating_duration_since(*t)),
            None => Duration::ZERO,
        }
    }

    /// Record a saved backup for `owner` at `now`.
    pub fn mark(&self, owner: &str, now: Instant) {
        let mut map = match self.last.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.insert(owner.to_string(), now);
    }

    pub fn forget(&self, owner: &str) {
        let mut map = match self.last.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.remove(owner);
    }
}
