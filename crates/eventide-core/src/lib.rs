//! Eventide Core: types, key codec and storage traits
//!
//! This crate defines the pieces every eventide layer shares:
//! - Identity types: [`EventId`], [`LogEvent`], [`ItemId`]
//! - The bit-exact binary key layout used on disk ([`keys`])
//! - The backing store contract ([`KvStore`], [`KvRead`], [`KvWrite`])
//! - The error taxonomy surfaced by every operation ([`EventideError`])
//! - Store configuration and optional metrics hooks

pub mod codec;
pub mod config;
pub mod error;
pub mod keys;
pub mod observe;
pub mod traits;
pub mod types;

pub use config::{StoreConfig, SyncMode};
pub use error::{EventideError, Result};
pub use traits::{Entry, KvRead, KvStore, KvWrite, ScanControl};
pub use types::{event_kind, item_type, EventId, ItemId, LogEvent};
