use crate::error::{EventideError, Result};
use crate::keys;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known item type tags
pub mod item_type {
    /// The schema registry item lives under this type
    pub const SCHEMA: u16 = 0;
    /// Domain entities
    pub const ENTITY: u16 = 1;
}

/// Identity of an item: a type tag plus caller-chosen id bytes
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId {
    pub type_tag: u16,
    pub id: Vec<u8>,
}

impl ItemId {
    pub fn new(type_tag: u16, id: impl Into<Vec<u8>>) -> Self {
        Self {
            type_tag,
            id: id.into(),
        }
    }

    /// Log partition this item's events are appended under
    pub fn partition(&self) -> Result<u8> {
        u8::try_from(self.type_tag).map_err(|_| EventideError::InvalidPartition(self.type_tag))
    }

    /// `[type_tag: u16 BE][id bytes]`
    pub fn encode(&self) -> Vec<u8> {
        keys::item_id_bytes(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        keys::decode_item_id(bytes)
    }

    /// True when both ids share a type and `self.id` starts with `prefix.id`
    pub fn has_prefix(&self, prefix: &ItemId) -> bool {
        self.type_tag == prefix.type_tag && self.id.starts_with(&prefix.id)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_tag, String::from_utf8_lossy(&self.id))
    }
}
