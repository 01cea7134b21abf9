//! Items: versioned, per-identity event streams on top of the shared log
//!
//! An item owns a version counter, one slot pointer per event it has ever
//! appended, a reverse alias list and a list of persistent view names. The
//! events themselves live in the log and are only referenced by slot, which
//! is why [`delete`] can tear down an item without touching the log.

mod alias;
mod event;
mod range;
mod view;

pub use alias::{alias, alias_delete, get_by_alias, resolve_alias};
pub use event::{system_event, Event, IdEvent};
pub use range::range_prefix;
pub use view::{get_view, sync_persistent_view, view, PersistentView, ViewCheckpoint};

pub(crate) use event::EventEnvelope;

use crate::event_log;
use crate::schema::schema_item;
use eventide_core::{
    codec,
    error::{EventideError, Result},
    event_kind, keys, observe,
    traits::{KvRead, KvWrite, ScanControl},
    types::{EventId, ItemId, LogEvent},
};
use std::ops::Range;

/// Events loaded from an item, with its version bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Index of the newest slot
    pub latest_vsn: u64,
    /// Highest slot actually loaded, `None` when the range was empty
    pub loaded_vsn: Option<u64>,
    pub events: Vec<Event>,
}

pub fn exists<T: KvRead>(txn: &T, id: &ItemId) -> Result<bool> {
    txn.contains(&keys::version_key(id))
}

/// Create an item whose stream holds a single `CREATED` event at slot 0
///
/// Re-creating a deleted item starts a fresh incarnation at slot 0; the
/// earlier incarnation's events stay in the log.
pub fn create<T: KvWrite>(txn: &mut T, id: &ItemId) -> Result<()> {
    if exists(txn, id)? {
        return Err(EventideError::ItemExists(id.clone()));
    }
    id.partition()?;

    init_index(txn, id)?;
    append(txn, id, 0, &Event::system(system_event::CREATED, Vec::new()))?;

    tracing::debug!("Created item {}", id);
    Ok(())
}

/// Append an event and return the slot it was written to
///
/// The schema registry item is rejected with `ReservedItem`: its version
/// counter must count schema changes only.
pub fn put<T: KvWrite>(txn: &mut T, id: &ItemId, event: &Event) -> Result<u64> {
    if *id == schema_item() {
        return Err(EventideError::ReservedItem(id.clone()));
    }
    put_next(txn, id, event)
}

/// [`put`] without the reserved-item check
pub(crate) fn put_next<T: KvWrite>(txn: &mut T, id: &ItemId, event: &Event) -> Result<u64> {
    let slot = latest_version(txn, id)?;
    append(txn, id, slot, event)
}

/// Load the events in slots `[from, to]`
///
/// When `to <= from` everything from `from` to the end is loaded.
pub fn get<T: KvRead>(txn: &T, id: &ItemId, from: u64, to: u64) -> Result<Item> {
    let version = latest_version(txn, id)?;
    let end = if to > from {
        to.saturating_add(1).min(version)
    } else {
        version
    };

    let mut events = Vec::new();
    let mut loaded_vsn = None;
    scan_slots(txn, id, from..end, |slot, log_id| {
        events.push(load_event(txn, log_id)?);
        loaded_vsn = Some(slot);
        Ok(ScanControl::Continue)
    })?;

    Ok(Item {
        id: id.clone(),
        latest_vsn: version.saturating_sub(1),
        loaded_vsn,
        events,
    })
}

/// Append a `DELETED` event, then remove the item's local index
///
/// The log keeps every event the item ever appended.
pub fn delete<T: KvWrite>(txn: &mut T, id: &ItemId) -> Result<()> {
    put(txn, id, &Event::system(system_event::DELETED, Vec::new()))?;
    teardown(txn, id)?;

    tracing::debug!("Deleted item {}", id);
    Ok(())
}

/// Number of slots written so far, which is also the next free slot
pub fn latest_version<T: KvRead>(txn: &T, id: &ItemId) -> Result<u64> {
    read_version(txn, id)?.ok_or_else(|| EventideError::ItemNotFound(id.clone()))
}

/// Aliases currently pointing at the item
pub fn aliases<T: KvRead>(txn: &T, id: &ItemId) -> Result<Vec<ItemId>> {
    latest_version(txn, id)?;
    read_aliases(txn, id)
}

/// Names of the persistent views synced on the item
pub fn view_names<T: KvRead>(txn: &T, id: &ItemId) -> Result<Vec<Vec<u8>>> {
    latest_version(txn, id)?;
    read_view_names(txn, id)
}

/// Rebuild the item index for one event already mirrored into the log
///
/// The event must carry its log id. Lifecycle events replay their
/// bookkeeping (index creation, teardown, alias pointers) without appending
/// anything to the log.
pub fn replicate<T: KvWrite>(txn: &mut T, event: &LogEvent) -> Result<()> {
    let (id, item_event) = EventEnvelope::decode(&event.payload)?.into_event(event.meta, event.id);

    if item_event.is_system(system_event::CREATED) {
        if exists(txn, &id)? {
            return Err(EventideError::ItemExists(id));
        }
        init_index(txn, &id)?;
    }

    let slot = latest_version(txn, &id)?;
    record_slot(txn, &id, slot, event.id, event.meta)?;

    if item_event.is_system(system_event::DELETED) {
        teardown(txn, &id)?;
    } else if item_event.is_system(system_event::ALIASED) {
        alias::link(txn, &id, &item_event.alias_target()?)?;
    } else if item_event.is_system(system_event::ALIAS_DELETED) {
        alias::unlink(txn, &id, &item_event.alias_target()?)?;
    }

    tracing::trace!("Replicated event {} into item {} at slot {}", event.id, id, slot);
    Ok(())
}

fn init_index<T: KvWrite>(txn: &mut T, id: &ItemId) -> Result<()> {
    txn.set(&keys::version_key(id), &codec::encode_u64(0), 0)?;
    write_aliases(txn, id, &[])?;
    write_view_names(txn, id, &[])
}

/// Wrap the event, append it to the log and point `slot` at it
fn append<T: KvWrite>(txn: &mut T, id: &ItemId, slot: u64, event: &Event) -> Result<u64> {
    let partition = id.partition()?;
    let envelope = EventEnvelope::wrap(id, event).encode()?;
    let log_id = event_log::put(txn, partition, &LogEvent::new(event.kind, envelope))?;

    record_slot(txn, id, slot, log_id, event.kind)?;
    observe::record_item_put(event.kind);
    Ok(slot)
}

fn record_slot<T: KvWrite>(
    txn: &mut T,
    id: &ItemId,
    slot: u64,
    log_id: EventId,
    kind: u8,
) -> Result<()> {
    txn.set(&keys::event_slot_key(id, slot), &log_id.encode(), kind)?;
    txn.set(&keys::version_key(id), &codec::encode_u64(slot + 1), 0)
}

/// Remove every index key of the item
fn teardown<T: KvWrite>(txn: &mut T, id: &ItemId) -> Result<()> {
    for alias in read_aliases(txn, id)? {
        txn.delete(&keys::alias_key(&alias))?;
    }
    txn.delete(&keys::aliases_key(id))?;

    for name in read_view_names(txn, id)? {
        txn.delete(&keys::view_key(id, &name))?;
    }
    txn.delete(&keys::views_key(id))?;

    let version = read_version(txn, id)?.unwrap_or(0);
    for slot in 0..version {
        txn.delete(&keys::event_slot_key(id, slot))?;
    }

    txn.delete(&keys::version_key(id))
}

fn read_version<T: KvRead>(txn: &T, id: &ItemId) -> Result<Option<u64>> {
    txn.get(&keys::version_key(id))?
        .map(|entry| codec::decode_u64(&entry.value))
        .transpose()
}

pub(crate) fn read_aliases<T: KvRead>(txn: &T, id: &ItemId) -> Result<Vec<ItemId>> {
    match txn.get(&keys::aliases_key(id))? {
        Some(entry) => codec::decode(&entry.value),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn write_aliases<T: KvWrite>(txn: &mut T, id: &ItemId, aliases: &[ItemId]) -> Result<()> {
    txn.set(&keys::aliases_key(id), &codec::encode(aliases)?, 0)
}

pub(crate) fn read_view_names<T: KvRead>(txn: &T, id: &ItemId) -> Result<Vec<Vec<u8>>> {
    match txn.get(&keys::views_key(id))? {
        Some(entry) => codec::decode(&entry.value),
        None => Ok(Vec::new()),
    }
}

pub(crate) fn write_view_names<T: KvWrite>(txn: &mut T, id: &ItemId, names: &[Vec<u8>]) -> Result<()> {
    txn.set(&keys::views_key(id), &codec::encode(names)?, 0)
}

/// Visit `(slot, log id)` for each slot in `slots`, in slot order
///
/// Slots are read by point lookup: an item's slot keys share a prefix with
/// the index keys of any item whose id extends this one.
pub(crate) fn scan_slots<T, F>(txn: &T, id: &ItemId, slots: Range<u64>, mut visit: F) -> Result<()>
where
    T: KvRead,
    F: FnMut(u64, EventId) -> Result<ScanControl>,
{
    for slot in slots {
        let entry = txn.get(&keys::event_slot_key(id, slot))?.ok_or_else(|| {
            EventideError::InvalidState(format!("item {} is missing slot {}", id, slot))
        })?;
        if visit(slot, EventId::decode(&entry.value)?)? == ScanControl::Stop {
            break;
        }
    }
    Ok(())
}

/// Resolve a slot pointer into the item event it references
pub(crate) fn load_event<T: KvRead>(txn: &T, log_id: EventId) -> Result<Event> {
    let log_event = event_log::get(txn, log_id)?;
    let (_, event) = EventEnvelope::decode(&log_event.payload)?.into_event(log_event.meta, log_id);
    Ok(event)
}

/// Kinds whose log events are item envelopes
pub(crate) fn is_item_kind(meta: u8) -> bool {
    matches!(
        meta,
        event_kind::SYSTEM | event_kind::SCHEMA | event_kind::ENTITY
    )
}
