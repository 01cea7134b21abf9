use crate::types::{EventId, ItemId};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventideError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Key decode error: {0}")]
    KeyDecode(String),

    #[error("Envelope decode error: {0}")]
    EnvelopeDecode(String),

    #[error("Stored value has no payload at key {0}")]
    MissingValue(String),

    #[error("Log event not found: {0}")]
    EventNotFound(EventId),

    #[error("Log event {0} found but payload missing")]
    EventPayloadMissing(EventId),

    #[error("Page size must be at least 1")]
    EmptyPage,

    #[error("Partition out of range: {0}")]
    InvalidPartition(u16),

    #[error("Item exists: {0}")]
    ItemExists(ItemId),

    #[error("Item {0} is written only by the schema registry")]
    ReservedItem(ItemId),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Alias exists: {0}")]
    AliasExists(ItemId),

    #[error("Alias not found: {0}")]
    AliasNotFound(ItemId),

    #[error("Alias {alias} not found in item {item}")]
    AliasNotFoundInItem { item: ItemId, alias: ItemId },

    #[error("Not an alias event")]
    NotAliasEvent,

    #[error("View name must not be empty")]
    InvalidViewName,

    #[error("Entity type exists: {0}")]
    EntityExists(String),

    #[error("Entity type not found: {0}")]
    EntityTypeNotFound(String),

    #[error("Event type exists: {entity}.{event}")]
    EventTypeExists { entity: String, event: String },

    #[error("Event type not found: {entity}.{event}")]
    EventTypeNotFound { entity: String, event: String },

    #[error("Event version not found: {entity}.{event}@{vsn}")]
    EventVersionNotFound {
        entity: String,
        event: String,
        vsn: u64,
    },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EventideError>;

// Callers layering their own domain errors on top can go through the
// `#[from] anyhow::Error` variant, or implement `From<TheirError>` for
// `EventideError` to keep the mapping explicit.
