use super::data::SchemaDecoder;
use super::types::{EntityType, EventTypeKey, Schema};
use crate::item::Event;
use eventide_core::{
    codec,
    error::{EventideError, Result},
    event_kind,
};
use serde::{Deserialize, Serialize};

/// Event types of schema mutation records
pub mod record_type {
    pub const ENTITY_CREATED: &[u8] = b"ENT:CREATED";
    pub const ENTITY_DELETED: &[u8] = b"ENT:DELETED";
    pub const EVENT_CREATED: &[u8] = b"EVT:CREATED";
    pub const EVENT_UPDATED: &[u8] = b"EVT:UPDATED";
    pub const EVENT_DELETED: &[u8] = b"EVT:DELETED";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntityTypeRecord {
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EventTypeRecord {
    entity: String,
    name: String,
    schema: Vec<u8>,
}

/// One mutation of the schema registry, as stored in the schema item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaChange {
    EntityCreated { name: String },
    EntityDeleted { name: String },
    EventCreated { entity: String, name: String, schema: Vec<u8> },
    EventUpdated { entity: String, name: String, schema: Vec<u8> },
    EventDeleted { entity: String, name: String },
}

impl SchemaChange {
    pub fn to_event(&self) -> Result<Event> {
        let (event_type, payload) = match self {
            SchemaChange::EntityCreated { name } => (
                record_type::ENTITY_CREATED,
                codec::encode(&EntityTypeRecord { name: name.clone() })?,
            ),
            SchemaChange::EntityDeleted { name } => (
                record_type::ENTITY_DELETED,
                codec::encode(&EntityTypeRecord { name: name.clone() })?,
            ),
            SchemaChange::EventCreated {
                entity,
                name,
                schema,
            } => (
                record_type::EVENT_CREATED,
                encode_event_record(entity, name, schema)?,
            ),
            SchemaChange::EventUpdated {
                entity,
                name,
                schema,
            } => (
                record_type::EVENT_UPDATED,
                encode_event_record(entity, name, schema)?,
            ),
            SchemaChange::EventDeleted { entity, name } => (
                record_type::EVENT_DELETED,
                encode_event_record(entity, name, &[])?,
            ),
        };
        Ok(Event::new(event_kind::SCHEMA, event_type, payload))
    }

    /// Parse a schema item event; `None` for events that are not schema records
    pub fn from_event(event: &Event) -> Result<Option<Self>> {
        if event.kind != event_kind::SCHEMA {
            return Ok(None);
        }

        let change = match event.event_type.as_slice() {
            record_type::ENTITY_CREATED => {
                let r: EntityTypeRecord = codec::decode(&event.payload)?;
                SchemaChange::EntityCreated { name: r.name }
            }
            record_type::ENTITY_DELETED => {
                let r: EntityTypeRecord = codec::decode(&event.payload)?;
                SchemaChange::EntityDeleted { name: r.name }
            }
            record_type::EVENT_CREATED => {
                let r: EventTypeRecord = codec::decode(&event.payload)?;
                SchemaChange::EventCreated {
                    entity: r.entity,
                    name: r.name,
                    schema: r.schema,
                }
            }
            record_type::EVENT_UPDATED => {
                let r: EventTypeRecord = codec::decode(&event.payload)?;
                SchemaChange::EventUpdated {
                    entity: r.entity,
                    name: r.name,
                    schema: r.schema,
                }
            }
            record_type::EVENT_DELETED => {
                let r: EventTypeRecord = codec::decode(&event.payload)?;
                SchemaChange::EventDeleted {
                    entity: r.entity,
                    name: r.name,
                }
            }
            other => {
                return Err(EventideError::Schema(format!(
                    "unknown schema record type {}",
                    String::from_utf8_lossy(other)
                )))
            }
        };
        Ok(Some(change))
    }

    /// Fold this change into `schema`
    ///
    /// `schema.vsn` advances on every change, including changes aimed at an
    /// entity type that no longer exists, which are otherwise ignored.
    pub fn apply<D: SchemaDecoder>(self, schema: &mut Schema<D::Schema>, decoder: &D) -> Result<()> {
        schema.vsn += 1;

        match self {
            SchemaChange::EntityCreated { name } => {
                schema.entities.insert(name.clone(), EntityType::new(name));
            }
            SchemaChange::EntityDeleted { name } => {
                if schema.entities.remove(&name).is_none() {
                    tracing::warn!("Schema fold: delete of unknown entity type {}", name);
                }
            }
            SchemaChange::EventCreated {
                entity,
                name,
                schema: bytes,
            } => {
                let Some(target) = schema.entities.get_mut(&entity) else {
                    tracing::warn!("Schema fold: event type {} on unknown entity type {}", name, entity);
                    return Ok(());
                };
                let data_schema = decoder.decode_schema(&bytes)?;
                target.events.insert(EventTypeKey::new(name, 0), data_schema);
                target.vsn += 1;
            }
            SchemaChange::EventUpdated {
                entity,
                name,
                schema: bytes,
            } => {
                let Some(target) = schema.entities.get_mut(&entity) else {
                    tracing::warn!("Schema fold: event type {} on unknown entity type {}", name, entity);
                    return Ok(());
                };
                let data_schema = decoder.decode_schema(&bytes)?;
                let vsn = target.next_vsn(&name);
                target.events.insert(EventTypeKey::new(name, vsn), data_schema);
                target.vsn += 1;
            }
            SchemaChange::EventDeleted { entity, name } => {
                let Some(target) = schema.entities.get_mut(&entity) else {
                    tracing::warn!("Schema fold: event type {} on unknown entity type {}", name, entity);
                    return Ok(());
                };
                target.events.retain(|key, _| key.name != name);
                target.vsn += 1;
            }
        }
        Ok(())
    }
}

fn encode_event_record(entity: &str, name: &str, schema: &[u8]) -> Result<Vec<u8>> {
    codec::encode(&EventTypeRecord {
        entity: entity.to_string(),
        name: name.to_string(),
        schema: schema.to_vec(),
    })
}
