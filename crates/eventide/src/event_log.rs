//! Shared, append-only event log
//!
//! Events are stored under 13-byte keys derived from their [`EventId`], so a
//! forward scan of one partition visits them in `(timestamp, index)` order.
//! Every function runs inside a caller-supplied transaction; nothing here
//! commits.

use eventide_core::{
    error::{EventideError, Result},
    keys, observe,
    traits::{KvRead, KvWrite, ScanControl},
    types::{now_nanos, EventId, LogEvent},
};

/// Append an event at the current wall-clock nanosecond
///
/// If another event already occupies the key (several appends within the
/// same nanosecond), the index is probed upwards until a free key is found.
pub fn put<T: KvWrite>(txn: &mut T, partition: u8, event: &LogEvent) -> Result<EventId> {
    put_unsafe(txn, partition, now_nanos()?, event)
}

/// Append an event at a caller-chosen timestamp
///
/// Uses the same probe as [`put`]. Two transactions importing at the same
/// timestamp race on the same probe sequence, so only call this under
/// external single-writer serialization (bulk historical imports).
pub fn put_unsafe<T: KvWrite>(
    txn: &mut T,
    partition: u8,
    timestamp: u64,
    event: &LogEvent,
) -> Result<EventId> {
    let mut id = EventId::new(partition, timestamp, 0);
    let mut collisions = 0u64;

    loop {
        let key = id.encode();
        if !txn.contains(&key)? {
            txn.set(&key, &event.payload, event.meta)?;
            observe::record_log_append(collisions);
            if collisions > 0 {
                tracing::debug!("Log append at {} after {} collisions", id, collisions);
            }
            return Ok(id);
        }

        collisions += 1;
        id.index = id.index.checked_add(1).ok_or_else(|| {
            EventideError::InvalidState(format!(
                "no free index left at partition {} timestamp {}",
                partition, timestamp
            ))
        })?;
    }
}

/// Write an event at its pre-assigned id, overwriting whatever is there
///
/// Only for mirroring a foreign log verbatim; the caller must not allocate
/// ids in the same partition concurrently.
pub fn replicate<T: KvWrite>(txn: &mut T, event: &LogEvent) -> Result<()> {
    txn.set(&event.id.encode(), &event.payload, event.meta)
}

/// Point lookup of one event
///
/// Fails with `EventNotFound` when no key exists and with
/// `EventPayloadMissing` when the key exists but carries no value.
pub fn get<T: KvRead>(txn: &T, id: EventId) -> Result<LogEvent> {
    match txn.get(&id.encode()) {
        Ok(Some(entry)) => Ok(LogEvent {
            meta: entry.meta,
            id,
            payload: entry.value,
        }),
        Ok(None) => Err(EventideError::EventNotFound(id)),
        Err(EventideError::MissingValue(_)) => Err(EventideError::EventPayloadMissing(id)),
        Err(e) => Err(e),
    }
}

/// Fold events with ids in `[from, to]` of `from`'s partition
///
/// At most `max` events are passed to `f`. When more remain, the id of the
/// first event not folded is returned; passing it as the next `from`
/// resumes the scan without gaps or duplicates. A `max` of 0 could never
/// advance and fails with `EmptyPage`.
pub fn fold<T, A, F>(
    txn: &T,
    from: EventId,
    to: EventId,
    max: usize,
    init: A,
    mut f: F,
) -> Result<(A, Option<EventId>)>
where
    T: KvRead,
    F: FnMut(&mut A, LogEvent) -> Result<()>,
{
    if max == 0 {
        return Err(EventideError::EmptyPage);
    }
    let prefix = keys::log_partition_prefix(from.partition);
    let start = from.encode();

    let mut acc = init;
    let mut folded = 0usize;
    let mut next = None;

    txn.scan(&start, &prefix, &mut |key, meta, value| {
        // A corrupted key must fail the scan, not be skipped
        let id = EventId::decode(key)?;
        if id > to {
            return Ok(ScanControl::Stop);
        }
        if folded >= max {
            next = Some(id);
            return Ok(ScanControl::Stop);
        }

        f(
            &mut acc,
            LogEvent {
                meta,
                id,
                payload: value.to_vec(),
            },
        )?;
        folded += 1;
        Ok(ScanControl::Continue)
    })?;

    Ok((acc, next))
}

/// Events with ids in `[from, to]`, at most `max`, plus a continuation id
pub fn range<T: KvRead>(
    txn: &T,
    from: EventId,
    to: EventId,
    max: usize,
) -> Result<(Vec<LogEvent>, Option<EventId>)> {
    fold(txn, from, to, max, Vec::new(), |events, event| {
        events.push(event);
        Ok(())
    })
}

/// Like [`range`], keeping only events accepted by `predicate`
///
/// `max` bounds the number of events scanned, not the number matched, so a
/// page may hold fewer than `max` events while a continuation is returned.
pub fn range_match<T, P>(
    txn: &T,
    from: EventId,
    to: EventId,
    max: usize,
    mut predicate: P,
) -> Result<(Vec<LogEvent>, Option<EventId>)>
where
    T: KvRead,
    P: FnMut(&LogEvent) -> bool,
{
    fold(txn, from, to, max, Vec::new(), |events, event| {
        if predicate(&event) {
            events.push(event);
        }
        Ok(())
    })
}
