//! Binary key layout
//!
//! ```text
//! log event     [LOG_TAG][partition: u16 BE][timestamp: u64 BE][index: u16 BE]
//! item id       [type_tag: u16 BE][id bytes]
//! item subkey   [ITEM_TAG][item id][subkind](suffix)
//!   version     subkind VSN
//!   alias list  subkind ALIASES
//!   event slot  subkind EVENTS + [slot: u64 BE]
//!   view list   subkind VIEW
//!   view        subkind VIEW + view name
//! alias         [ALIAS_TAG][alias item id] -> source item id
//! ```
//!
//! All integers are big-endian so that lexicographic key order equals
//! numeric order.

use crate::error::{EventideError, Result};
use crate::types::{EventId, ItemId};

/// Prefixes every log key
pub const LOG_TAG: u8 = b'e';
/// Prefixes every item index key
pub const ITEM_TAG: u8 = b'i';
/// Prefixes every alias pointer key
pub const ALIAS_TAG: u8 = b'a';

pub const LOG_KEY_LEN: usize = 13;
const LOG_PARTITION_PREFIX_LEN: usize = 3;

/// Item sub-key kinds
pub mod subkind {
    pub const VSN: u8 = b'v';
    pub const ALIASES: u8 = b'a';
    pub const EVENTS: u8 = b'e';
    pub const VIEW: u8 = b's';
}

/// Encode an EventId as a log key
pub fn log_key(id: &EventId) -> [u8; LOG_KEY_LEN] {
    let mut out = [0u8; LOG_KEY_LEN];
    out[0] = LOG_TAG;
    out[1..3].copy_from_slice(&u16::from(id.partition).to_be_bytes());
    out[3..11].copy_from_slice(&id.timestamp.to_be_bytes());
    out[11..13].copy_from_slice(&id.index.to_be_bytes());
    out
}

/// Key prefix shared by every event of a partition
pub fn log_partition_prefix(partition: u8) -> [u8; LOG_PARTITION_PREFIX_LEN] {
    let mut out = [0u8; LOG_PARTITION_PREFIX_LEN];
    out[0] = LOG_TAG;
    out[1..3].copy_from_slice(&u16::from(partition).to_be_bytes());
    out
}

/// Parse a log key back into an EventId
pub fn decode_log_key(bytes: &[u8]) -> Result<EventId> {
    if bytes.len() != LOG_KEY_LEN {
        return Err(EventideError::KeyDecode(format!(
            "log key must be {} bytes, got {}",
            LOG_KEY_LEN,
            bytes.len()
        )));
    }
    if bytes[0] != LOG_TAG {
        return Err(EventideError::KeyDecode(format!(
            "not a log key: tag {:#04x}",
            bytes[0]
        )));
    }
    let partition = u16::from_be_bytes([bytes[1], bytes[2]]);
    let partition =
        u8::try_from(partition).map_err(|_| EventideError::InvalidPartition(partition))?;
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&bytes[3..11]);
    Ok(EventId {
        partition,
        timestamp: u64::from_be_bytes(ts),
        index: u16::from_be_bytes([bytes[11], bytes[12]]),
    })
}

pub fn item_id_bytes(id: &ItemId) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 + id.id.len());
    out.extend_from_slice(&id.type_tag.to_be_bytes());
    out.extend_from_slice(&id.id);
    out
}

pub fn decode_item_id(bytes: &[u8]) -> Result<ItemId> {
    if bytes.len() < 2 {
        return Err(EventideError::KeyDecode(format!(
            "item id needs at least 2 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(ItemId {
        type_tag: u16::from_be_bytes([bytes[0], bytes[1]]),
        id: bytes[2..].to_vec(),
    })
}

fn item_key(id: &ItemId, kind: u8, suffix: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + id.id.len() + suffix.len());
    out.push(ITEM_TAG);
    out.extend_from_slice(&id.type_tag.to_be_bytes());
    out.extend_from_slice(&id.id);
    out.push(kind);
    out.extend_from_slice(suffix);
    out
}

pub fn version_key(id: &ItemId) -> Vec<u8> {
    item_key(id, subkind::VSN, &[])
}

pub fn aliases_key(id: &ItemId) -> Vec<u8> {
    item_key(id, subkind::ALIASES, &[])
}

pub fn event_slot_key(id: &ItemId, slot: u64) -> Vec<u8> {
    item_key(id, subkind::EVENTS, &slot.to_be_bytes())
}

/// Key of the list of view names registered on an item
pub fn views_key(id: &ItemId) -> Vec<u8> {
    item_key(id, subkind::VIEW, &[])
}

pub fn view_key(id: &ItemId, name: &[u8]) -> Vec<u8> {
    item_key(id, subkind::VIEW, name)
}

pub fn alias_key(alias: &ItemId) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 + alias.id.len());
    out.push(ALIAS_TAG);
    out.extend_from_slice(&item_id_bytes(alias));
    out
}
