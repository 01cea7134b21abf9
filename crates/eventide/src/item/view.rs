use super::{latest_version, load_event, read_view_names, scan_slots, write_view_names, Event};
use eventide_core::{
    codec,
    error::{EventideError, Result},
    keys, observe,
    traits::{KvRead, KvWrite, ScanControl},
    types::ItemId,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::ops::ControlFlow;

/// Fold the item's events from slot `from` to the end
///
/// `f` may end the fold early with `ControlFlow::Break`; the event that
/// breaks still counts as visited. Returns the accumulator and the last
/// slot visited, `None` if no slot was.
pub fn view<T, A, F>(txn: &T, id: &ItemId, from: u64, init: A, mut f: F) -> Result<(A, Option<u64>)>
where
    T: KvRead,
    F: FnMut(&mut A, &Event) -> Result<ControlFlow<()>>,
{
    let version = latest_version(txn, id)?;

    let mut acc = init;
    let mut last = None;
    scan_slots(txn, id, from..version, |slot, log_id| {
        let event = load_event(txn, log_id)?;
        last = Some(slot);
        match f(&mut acc, &event)? {
            ControlFlow::Continue(()) => Ok(ScanControl::Continue),
            ControlFlow::Break(()) => Ok(ScanControl::Stop),
        }
    })?;

    Ok((acc, last))
}

/// A fold whose result is checkpointed on the item
///
/// State is stored with the shared bincode codec unless the
/// implementation overrides [`encode_state`](Self::encode_state) and
/// [`decode_state`](Self::decode_state).
pub trait PersistentView {
    type State: Serialize + DeserializeOwned;

    fn fold(&mut self, state: &mut Self::State, event: &Event) -> Result<ControlFlow<()>>;

    fn encode_state(&self, state: &Self::State) -> Result<Vec<u8>> {
        codec::encode(state)
    }

    fn decode_state(&self, bytes: &[u8]) -> Result<Self::State> {
        codec::decode(bytes)
    }
}

/// Stored progress of a persistent view
///
/// `vsn` is the number of slots already folded into `state`; the next sync
/// resumes at that slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCheckpoint {
    pub vsn: u64,
    pub state: Vec<u8>,
}

/// The stored checkpoint of a view, `None` if it was never synced
pub fn get_view<T: KvRead>(txn: &T, id: &ItemId, name: &[u8]) -> Result<Option<ViewCheckpoint>> {
    check_view_name(name)?;
    latest_version(txn, id)?;

    txn.get(&keys::view_key(id, name))?
        .map(|entry| codec::decode(&entry.value))
        .transpose()
}

/// Bring a persistent view up to date and return its state
///
/// The first sync checkpoints `initial` at slot 0 and registers the view on
/// the item; later syncs ignore `initial` and fold only the slots appended
/// since the previous sync.
pub fn sync_persistent_view<T, V>(
    txn: &mut T,
    id: &ItemId,
    name: &[u8],
    view_impl: &mut V,
    initial: V::State,
) -> Result<V::State>
where
    T: KvWrite,
    V: PersistentView,
{
    check_view_name(name)?;
    let key = keys::view_key(id, name);

    let checkpoint = match get_view(txn, id, name)? {
        Some(checkpoint) => checkpoint,
        None => {
            let checkpoint = ViewCheckpoint {
                vsn: 0,
                state: view_impl.encode_state(&initial)?,
            };
            txn.set(&key, &codec::encode(&checkpoint)?, 0)?;

            let mut names = read_view_names(txn, id)?;
            names.push(name.to_vec());
            write_view_names(txn, id, &names)?;

            tracing::debug!(
                "Registered view {} on item {}",
                String::from_utf8_lossy(name),
                id
            );
            checkpoint
        }
    };

    let state = view_impl.decode_state(&checkpoint.state)?;
    let mut folded = 0u64;
    let (state, last) = view(&*txn, id, checkpoint.vsn, state, |state, event| {
        folded += 1;
        view_impl.fold(state, event)
    })?;

    if let Some(last) = last {
        let advanced = ViewCheckpoint {
            vsn: last + 1,
            state: view_impl.encode_state(&state)?,
        };
        txn.set(&key, &codec::encode(&advanced)?, 0)?;
        tracing::debug!(
            "Synced view {} on item {}: {} events, checkpoint {} -> {}",
            String::from_utf8_lossy(name),
            id,
            folded,
            checkpoint.vsn,
            advanced.vsn
        );
    }

    observe::record_view_sync(folded);
    Ok(state)
}

fn check_view_name(name: &[u8]) -> Result<()> {
    // The empty suffix is where the item keeps its list of view names
    if name.is_empty() {
        return Err(EventideError::InvalidViewName);
    }
    Ok(())
}
