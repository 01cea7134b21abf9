use crate::error::{EventideError, Result};
use crate::keys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kinds carried in the per-entry meta byte of every log entry
pub mod event_kind {
    /// Item lifecycle events (created, deleted, aliased, alias deleted)
    pub const SYSTEM: u8 = 2;
    /// Schema registry mutations
    pub const SCHEMA: u8 = 4;
    /// Domain entity events
    pub const ENTITY: u8 = 8;
}

/// Log event identifier
///
/// Totally ordered by `(partition, timestamp, index)`, which is also the
/// byte order of its encoded key. `index` disambiguates events appended in
/// the same nanosecond.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventId {
    pub partition: u8,
    pub timestamp: u64,
    pub index: u16,
}

impl EventId {
    pub fn new(partition: u8, timestamp: u64, index: u16) -> Self {
        Self {
            partition,
            timestamp,
            index,
        }
    }

    /// Id at the current wall-clock nanosecond with index 0
    pub fn now(partition: u8) -> Result<Self> {
        Ok(Self::new(partition, now_nanos()?, 0))
    }

    /// Smallest id of a partition
    pub fn first(partition: u8) -> Self {
        Self::new(partition, 0, 0)
    }

    /// Largest id of a partition
    pub fn last(partition: u8) -> Self {
        Self::new(partition, u64::MAX, u16::MAX)
    }

    /// Encode as a 13-byte log key
    pub fn encode(&self) -> [u8; keys::LOG_KEY_LEN] {
        keys::log_key(self)
    }

    /// Decode a log key, failing on a wrong tag byte or length
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        keys::decode_log_key(bytes)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.partition, self.timestamp, self.index)
    }
}

/// Current time in nanoseconds since the Unix epoch
pub fn now_nanos() -> Result<u64> {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|ns| u64::try_from(ns).ok())
        .ok_or_else(|| EventideError::InvalidState("system clock out of range".into()))
}

/// A raw entry of the shared log
///
/// `id` is filled in on read and ignored on write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub meta: u8,
    pub id: EventId,
    pub payload: Vec<u8>,
}

impl LogEvent {
    pub fn new(meta: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            meta,
            id: EventId::default(),
            payload: payload.into(),
        }
    }

    /// Attach the id the event is (or will be) stored under
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }
}
