//! Log shipping between stores
//!
//! A primary captures raw log pages with [`capture`]; a replica applies
//! each page with [`apply`] inside one write transaction. Applying first
//! mirrors every event into the log at its original id and then rebuilds
//! the item indexes from the same batch, so a committed page never leaves
//! a slot pointer without its event.

use crate::{event_log, item};
use eventide_core::{
    error::Result,
    traits::{KvRead, KvWrite},
    types::{EventId, LogEvent},
};

/// One page of captured log events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaBatch {
    pub events: Vec<LogEvent>,
    /// Where the next capture should start, `None` once `to` was reached
    pub next: Option<EventId>,
}

/// Read up to `max` raw events in `[from, to]` of `from`'s partition
pub fn capture<T: KvRead>(txn: &T, from: EventId, to: EventId, max: usize) -> Result<ReplicaBatch> {
    let (events, next) = event_log::range(txn, from, to, max)?;
    Ok(ReplicaBatch { events, next })
}

/// Mirror a captured batch into this store
///
/// Events whose kind is not an item kind are mirrored into the log only.
/// Returns the number of events applied.
pub fn apply<T: KvWrite>(txn: &mut T, events: &[LogEvent]) -> Result<usize> {
    for event in events {
        event_log::replicate(txn, event)?;
    }

    for event in events.iter().filter(|e| item::is_item_kind(e.meta)) {
        item::replicate(txn, event)?;
    }

    tracing::debug!("Applied {} replicated events", events.len());
    Ok(events.len())
}
