//! Schema registry kept as an event-sourced item
//!
//! Entity types and the revisions of their event types are never stored
//! as mutable state. Each mutation appends a [`SchemaChange`] record to the
//! well-known schema item, and any current or historical view of the
//! registry is rebuilt by folding that item's stream. Because event types
//! are keyed by `(name, vsn)`, payloads written under an old revision stay
//! decodable.
//!
//! ```no_run
//! use eventide::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let db = EventideDb::open("./data")?;
//! let registry = SchemaRegistry::new(JsonSchemaDecoder);
//!
//! db.update(|txn| {
//!     registry.create_entity_type(txn, "User")?;
//!     registry.create_event_type(txn, "User", "Created", &JsonSchema::String)?;
//!     Ok(())
//! })?;
//!
//! let user = db.view(|txn| registry.get_entity_type(txn, "User", u64::MAX))?;
//! assert!(user.get("Created", 0).is_some());
//! # Ok(())
//! # }
//! ```

mod data;
mod events;
mod json;
mod types;

pub use data::{DataSchema, SchemaDecoder, Value};
pub use events::{record_type, SchemaChange};
pub use json::{JsonSchema, JsonSchemaDecoder};
pub use types::{EntityType, EventTypeKey, Schema};

use crate::item;
use eventide_core::{
    error::{EventideError, Result},
    item_type, observe,
    traits::{KvRead, KvWrite},
    types::ItemId,
};
use std::ops::ControlFlow;
use std::time::Instant;

/// Id bytes of the schema item
pub const SCHEMA_ITEM_ID: &[u8] = b"SCHEMA";

/// The item holding the schema registry's event stream
pub fn schema_item() -> ItemId {
    ItemId::new(item_type::SCHEMA, SCHEMA_ITEM_ID)
}

/// Entry point for schema reads and mutations
///
/// Holds only the decoder for stored data schemas. Nothing is cached
/// between calls; every read folds the schema item inside the transaction
/// it is given.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry<D> {
    decoder: D,
}

impl<D: SchemaDecoder> SchemaRegistry<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Create the schema item if it does not exist yet
    pub fn ensure_schema<T: KvWrite>(&self, txn: &mut T) -> Result<()> {
        let id = schema_item();
        if !item::exists(txn, &id)? {
            item::create(txn, &id)?;
            tracing::debug!("Created schema item");
        }
        Ok(())
    }

    /// Rebuild the registry from slot 0
    ///
    /// `stop` is checked before the first record and after each one; the
    /// fold ends as soon as it returns true. A store without a schema item
    /// yields the empty schema.
    pub fn fold_schema<T, P>(&self, txn: &T, mut stop: P) -> Result<Schema<D::Schema>>
    where
        T: KvRead,
        P: FnMut(&Schema<D::Schema>) -> bool,
    {
        let id = schema_item();
        let initial = Schema::default();
        if stop(&initial) || !item::exists(txn, &id)? {
            return Ok(initial);
        }

        let started = Instant::now();
        let mut folded = 0u64;
        let (schema, _) = item::view(txn, &id, 0, initial, |schema, event| {
            let Some(change) = SchemaChange::from_event(event)? else {
                return Ok(ControlFlow::Continue(()));
            };
            change.apply(schema, &self.decoder)?;
            folded += 1;

            if stop(schema) {
                Ok(ControlFlow::Break(()))
            } else {
                Ok(ControlFlow::Continue(()))
            }
        })?;

        observe::record_schema_fold(started.elapsed(), folded);
        Ok(schema)
    }

    /// The registry as of version `vsn` (inclusive)
    pub fn get_schema<T: KvRead>(&self, txn: &T, vsn: u64) -> Result<Schema<D::Schema>> {
        self.fold_schema(txn, |schema| schema.vsn >= vsn)
    }

    /// Current registry version, read from the schema item's slot counter
    ///
    /// Every slot after the initial `CREATED` holds one mutation, so this
    /// equals `fold_schema(txn, |_| false)?.vsn` without the fold.
    pub fn schema_vsn<T: KvRead>(&self, txn: &T) -> Result<u64> {
        let id = schema_item();
        if !item::exists(txn, &id)? {
            return Ok(0);
        }
        Ok(item::latest_version(txn, &id)?.saturating_sub(1))
    }

    /// Entity type `name` once it reached version `vsn`, or its latest state
    pub fn get_entity_type<T: KvRead>(
        &self,
        txn: &T,
        name: &str,
        vsn: u64,
    ) -> Result<EntityType<D::Schema>> {
        let mut schema = self.fold_schema(txn, |schema| {
            schema.entity(name).map_or(false, |entity| entity.vsn >= vsn)
        })?;
        schema
            .entities
            .remove(name)
            .ok_or_else(|| EventideError::EntityTypeNotFound(name.to_string()))
    }

    /// Data schema of revision `vsn` of event type `entity.name`
    ///
    /// Stops folding at the first record that makes the revision exist, so
    /// later deletions do not hide it.
    pub fn get_event_type<T: KvRead>(
        &self,
        txn: &T,
        entity: &str,
        name: &str,
        vsn: u64,
    ) -> Result<D::Schema> {
        let key = EventTypeKey::new(name, vsn);
        let mut schema = self.fold_schema(txn, |schema| {
            schema
                .entity(entity)
                .map_or(false, |e| e.events.contains_key(&key))
        })?;

        let mut entity_type = schema
            .entities
            .remove(entity)
            .ok_or_else(|| EventideError::EntityTypeNotFound(entity.to_string()))?;
        entity_type
            .events
            .remove(&key)
            .ok_or_else(|| EventideError::EventVersionNotFound {
                entity: entity.to_string(),
                event: name.to_string(),
                vsn,
            })
    }

    /// Register a new entity type; returns the new registry version
    pub fn create_entity_type<T: KvWrite>(&self, txn: &mut T, name: &str) -> Result<u64> {
        self.ensure_schema(txn)?;
        let current = self.current(txn)?;
        if current.entity(name).is_some() {
            return Err(EventideError::EntityExists(name.to_string()));
        }

        self.append(
            txn,
            SchemaChange::EntityCreated {
                name: name.to_string(),
            },
        )
    }

    pub fn delete_entity_type<T: KvWrite>(&self, txn: &mut T, name: &str) -> Result<u64> {
        self.ensure_schema(txn)?;
        let current = self.current(txn)?;
        if current.entity(name).is_none() {
            return Err(EventideError::EntityTypeNotFound(name.to_string()));
        }

        self.append(
            txn,
            SchemaChange::EntityDeleted {
                name: name.to_string(),
            },
        )
    }

    /// Register revision 0 of a new event type; returns the new registry version
    pub fn create_event_type<T: KvWrite>(
        &self,
        txn: &mut T,
        entity: &str,
        name: &str,
        schema: &D::Schema,
    ) -> Result<u64> {
        self.ensure_schema(txn)?;
        let current = self.current(txn)?;
        let entity_type = current
            .entity(entity)
            .ok_or_else(|| EventideError::EntityTypeNotFound(entity.to_string()))?;
        if entity_type.has_event(name) {
            return Err(EventideError::EventTypeExists {
                entity: entity.to_string(),
                event: name.to_string(),
            });
        }

        self.append(
            txn,
            SchemaChange::EventCreated {
                entity: entity.to_string(),
                name: name.to_string(),
                schema: schema.encode_schema()?,
            },
        )
    }

    /// Add a revision to an existing event type; returns its revision number
    pub fn update_event_type<T: KvWrite>(
        &self,
        txn: &mut T,
        entity: &str,
        name: &str,
        schema: &D::Schema,
    ) -> Result<u64> {
        self.ensure_schema(txn)?;
        let current = self.current(txn)?;
        let next_vsn = self.existing_event(&current, entity, name)?.next_vsn(name);

        self.append(
            txn,
            SchemaChange::EventUpdated {
                entity: entity.to_string(),
                name: name.to_string(),
                schema: schema.encode_schema()?,
            },
        )?;
        Ok(next_vsn)
    }

    /// Remove every revision of an event type; returns the new registry version
    pub fn delete_event_type<T: KvWrite>(
        &self,
        txn: &mut T,
        entity: &str,
        name: &str,
    ) -> Result<u64> {
        self.ensure_schema(txn)?;
        let current = self.current(txn)?;
        self.existing_event(&current, entity, name)?;

        self.append(
            txn,
            SchemaChange::EventDeleted {
                entity: entity.to_string(),
                name: name.to_string(),
            },
        )
    }

    fn current<T: KvRead>(&self, txn: &T) -> Result<Schema<D::Schema>> {
        self.fold_schema(txn, |_| false)
    }

    fn existing_event<'s>(
        &self,
        schema: &'s Schema<D::Schema>,
        entity: &str,
        name: &str,
    ) -> Result<&'s EntityType<D::Schema>> {
        let entity_type = schema
            .entity(entity)
            .ok_or_else(|| EventideError::EntityTypeNotFound(entity.to_string()))?;
        if !entity_type.has_event(name) {
            return Err(EventideError::EventTypeNotFound {
                entity: entity.to_string(),
                event: name.to_string(),
            });
        }
        Ok(entity_type)
    }

    /// Append a record to the schema item; the slot number is the new version
    fn append<T: KvWrite>(&self, txn: &mut T, change: SchemaChange) -> Result<u64> {
        let vsn = item::put_next(txn, &schema_item(), &change.to_event()?)?;
        tracing::debug!("Schema v{}: {:?}", vsn, change);
        Ok(vsn)
    }
}
