use eventide_core::{
    codec,
    error::{EventideError, Result},
    types::{event_kind, EventId, ItemId},
};
use serde::{Deserialize, Serialize};

/// Single-byte event types of item lifecycle events
pub mod system_event {
    pub const CREATED: &[u8] = b"c";
    pub const DELETED: &[u8] = b"d";
    pub const ALIASED: &[u8] = b"a";
    pub const ALIAS_DELETED: &[u8] = b"x";
}

/// An event in an item's stream
///
/// `kind` is stored as the log entry's meta byte. `id` is the log id the
/// event was read from and is ignored on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: u8,
    pub id: EventId,
    pub event_type: Vec<u8>,
    pub payload: Vec<u8>,
}

impl Event {
    pub fn new(kind: u8, event_type: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            id: EventId::default(),
            event_type: event_type.into(),
            payload: payload.into(),
        }
    }

    /// Domain event of kind `ENTITY`
    pub fn entity(event_type: impl Into<Vec<u8>>, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(event_kind::ENTITY, event_type, payload)
    }

    pub(crate) fn system(event_type: &[u8], payload: impl Into<Vec<u8>>) -> Self {
        Self::new(event_kind::SYSTEM, event_type, payload)
    }

    /// True for a lifecycle event of the given system type
    pub fn is_system(&self, event_type: &[u8]) -> bool {
        self.kind == event_kind::SYSTEM && self.event_type == event_type
    }

    /// The alias carried by an `ALIASED` or `ALIAS_DELETED` event
    pub fn alias_target(&self) -> Result<ItemId> {
        if !self.is_system(system_event::ALIASED) && !self.is_system(system_event::ALIAS_DELETED) {
            return Err(EventideError::NotAliasEvent);
        }
        ItemId::decode(&self.payload)
    }
}

/// An event together with the item that owns it
///
/// Returned by cross-item log scans, where the slot index is not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdEvent {
    pub item: ItemId,
    pub event: Event,
}

/// Value stored in the log for every item event
///
/// Carries the owning item so that a scan of the shared log can tell which
/// item an event belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct EventEnvelope {
    pub item: ItemId,
    pub event_type: Vec<u8>,
    pub payload: Vec<u8>,
}

impl EventEnvelope {
    pub fn wrap(item: &ItemId, event: &Event) -> Self {
        Self {
            item: item.clone(),
            event_type: event.event_type.clone(),
            payload: event.payload.clone(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes).map_err(|e| EventideError::EnvelopeDecode(e.to_string()))
    }

    /// Split into the owning item and the event read from log id `id`
    pub fn into_event(self, kind: u8, id: EventId) -> (ItemId, Event) {
        (
            self.item,
            Event {
                kind,
                id,
                event_type: self.event_type,
                payload: self.payload,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_event_requires_system_kind() {
        let created = Event::system(system_event::CREATED, Vec::new());
        assert!(created.is_system(system_event::CREATED));
        assert!(!created.is_system(system_event::DELETED));

        // Same type byte, but a domain event
        let lookalike = Event::entity(system_event::CREATED, Vec::new());
        assert!(!lookalike.is_system(system_event::CREATED));
    }

    #[test]
    fn test_alias_target() {
        let alias = ItemId::new(1, b"email:a@b".to_vec());
        let event = Event::system(system_event::ALIASED, alias.encode());
        assert_eq!(event.alias_target().unwrap(), alias);

        let other = Event::entity("type.test", alias.encode());
        assert!(matches!(
            other.alias_target(),
            Err(EventideError::NotAliasEvent)
        ));
    }

    #[test]
    fn test_envelope_garbage_is_decode_error() {
        assert!(matches!(
            EventEnvelope::decode(&[0xff]),
            Err(EventideError::EnvelopeDecode(_))
        ));
    }
}
