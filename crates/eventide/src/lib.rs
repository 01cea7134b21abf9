//! Eventide: embedded event-sourcing storage on LMDB
//!
//! Eventide layers three things on one transactional key space:
//! - **Log**: a shared, append-only event stream partitioned by an 8-bit tag
//! - **Items**: versioned per-identity streams with lifecycle, aliases and
//!   ad-hoc or checkpointed projections
//! - **Schema**: a registry of entity and event types that is itself an
//!   item, rebuilt at any historical version by folding its stream
//!
//! # Quick Start
//!
//! ```no_run
//! use eventide::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let db = EventideDb::open("./data")?;
//! let user = ItemId::new(item_type::ENTITY, "User:alice");
//!
//! db.update(|txn| {
//!     item::create(txn, &user)?;
//!     item::put(txn, &user, &Event::entity("User.Renamed", "Alice"))?;
//!     Ok(())
//! })?;
//!
//! let loaded = db.view(|txn| item::get(txn, &user, 0, 0))?;
//! assert_eq!(loaded.events.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod event_log;
pub mod item;
pub mod prelude;
pub mod replication;
pub mod schema;

// Re-export core types
pub use eventide_core::{
    codec,
    config::{StoreConfig, SyncMode},
    error::{EventideError, Result},
    keys,
    traits::{Entry, KvRead, KvStore, KvWrite, ScanControl},
    types::{event_kind, item_type, EventId, ItemId, LogEvent},
};

// Re-export implementations
pub use eventide_lmdb::{LmdbReadTxn, LmdbStore, LmdbWriteTxn};

// Re-export main types from this crate
pub use db::EventideDb;
pub use item::{Event, IdEvent, Item, PersistentView, ViewCheckpoint};
pub use replication::ReplicaBatch;
pub use schema::{
    DataSchema, EntityType, EventTypeKey, JsonSchema, JsonSchemaDecoder, Schema, SchemaDecoder,
    SchemaRegistry, Value,
};
