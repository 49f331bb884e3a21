//! Failure taxonomy of the backup facility.
//!
//! Per-item failures (Encoding/Decoding/UnresolvableType) and an unreachable
//! equipment container never abort an operation: they travel inside
//! [`Recovered::Degraded`] next to the best-effort value. Whole-operation failures
//! (archive I/O, an error escaping restore) are reported by the facade as
//! `false` / `None` / [`crate::BackupOutcome::Failed`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SafeError {
    /// Item stack could not be serialized; the record keeps identity + quantity only.
    #[error("encode {item}: {reason}")]
    Encoding { item: String, reason: String },

    /// Stored payload could not be parsed back into a stack.
    #[error("decode {item}: {reason}")]
    Decoding { item: String, reason: String },

    /// Type identity unknown to the item registry.
    #[error("unresolvable item type '{0}'")]
    UnresolvableType(String),

    /// Equipment container not installed or not reachable.
    #[error("equipment container unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected: {0}")]
    Unexpected(String),
}

/// Outcome of a per-item step that may fall back to a lesser value.
#[derive(Debug)]
pub enum Recovered<T> {
    Full(T),
    Degraded { value: T, cause: SafeError },
}

impl<T> Recovered<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Recovered::Degraded { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Recovered::Full(v) => v,
            Recovered::Degraded { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Recovered::Full(v) => v,
            Recovered::Degraded { value, .. } => value,
        }
    }

    pub fn cause(&self) -> Option<&SafeError> {
        match self {
            Recovered::Full(_) => None,
            Recovered::Degraded { cause, .. } => Some(cause),
        }
    }
}
