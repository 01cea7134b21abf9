use super::{is_item_kind, EventEnvelope, IdEvent};
use crate::event_log;
use eventide_core::{
    error::Result,
    traits::KvRead,
    types::{EventId, ItemId},
};

/// Events of every item matching `prefix`, read from the shared log
///
/// Matches items of `prefix.type_tag` whose id starts with `prefix.id`,
/// across item boundaries and in log order, including events of items
/// since deleted. Pagination follows [`event_log::fold`]: `max` bounds the
/// number of log events scanned, and the returned id resumes the scan.
/// Log entries that are not item events are skipped.
pub fn range_prefix<T: KvRead>(
    txn: &T,
    prefix: &ItemId,
    from: EventId,
    to: EventId,
    max: usize,
) -> Result<(Vec<IdEvent>, Option<EventId>)> {
    event_log::fold(txn, from, to, max, Vec::new(), |matches, log_event| {
        if !is_item_kind(log_event.meta) {
            return Ok(());
        }

        let (item, event) =
            EventEnvelope::decode(&log_event.payload)?.into_event(log_event.meta, log_event.id);
        if item.has_prefix(prefix) {
            matches.push(IdEvent { item, event });
        }
        Ok(())
    })
}
