//! Eventide Prelude
//!
//! Import this to get all commonly used types and traits:
//!
//! ```
//! use eventide::prelude::*;
//! ```

// Core types
pub use crate::{EventId, EventideDb, EventideError, ItemId, LogEvent, Result};

// Constants
pub use crate::{event_kind, item_type};

// Configs
pub use crate::{StoreConfig, SyncMode};

// Traits
pub use crate::{DataSchema, KvRead, KvStore, KvWrite, PersistentView, SchemaDecoder};

// Implementations
pub use crate::{LmdbReadTxn, LmdbStore, LmdbWriteTxn};

// Operation modules
pub use crate::{event_log, item, replication};

// Items
pub use crate::{Event, IdEvent, Item, ViewCheckpoint};

// Schema
pub use crate::{EntityType, EventTypeKey, JsonSchema, JsonSchemaDecoder, Schema, SchemaRegistry, Value};

// Re-export common external deps
pub use anyhow;
pub use serde::{Deserialize, Serialize};
pub use std::ops::ControlFlow;
pub use std::sync::Arc;
pub use tracing;
