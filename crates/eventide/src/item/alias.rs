use super::{get, put, read_aliases, system_event, write_aliases, Event, Item};
use eventide_core::{
    error::{EventideError, Result},
    keys,
    traits::{KvRead, KvWrite},
    types::ItemId,
};

/// Point `alias` at `src`
///
/// Aliases are unique: fails with `AliasExists` when `alias` already points
/// at any item, including `src` itself.
pub fn alias<T: KvWrite>(txn: &mut T, src: &ItemId, alias: &ItemId) -> Result<()> {
    if txn.contains(&keys::alias_key(alias))? {
        return Err(EventideError::AliasExists(alias.clone()));
    }

    put(txn, src, &Event::system(system_event::ALIASED, alias.encode()))?;
    link(txn, src, alias)?;

    tracing::debug!("Aliased {} -> {}", alias, src);
    Ok(())
}

/// Remove `alias` from `src`
pub fn alias_delete<T: KvWrite>(txn: &mut T, src: &ItemId, alias: &ItemId) -> Result<()> {
    let target = resolve_alias(txn, alias)?;
    if &target != src {
        return Err(EventideError::AliasNotFoundInItem {
            item: src.clone(),
            alias: alias.clone(),
        });
    }

    put(
        txn,
        src,
        &Event::system(system_event::ALIAS_DELETED, alias.encode()),
    )?;
    unlink(txn, src, alias)?;

    tracing::debug!("Removed alias {} from {}", alias, src);
    Ok(())
}

/// The item `alias` points at
pub fn resolve_alias<T: KvRead>(txn: &T, alias: &ItemId) -> Result<ItemId> {
    match txn.get(&keys::alias_key(alias))? {
        Some(entry) => ItemId::decode(&entry.value),
        None => Err(EventideError::AliasNotFound(alias.clone())),
    }
}

/// [`get`] through an alias
pub fn get_by_alias<T: KvRead>(txn: &T, alias: &ItemId, from: u64, to: u64) -> Result<Item> {
    let src = resolve_alias(txn, alias)?;
    get(txn, &src, from, to)
}

/// Write the pointer and add it to the source's reverse list
pub(super) fn link<T: KvWrite>(txn: &mut T, src: &ItemId, alias: &ItemId) -> Result<()> {
    txn.set(&keys::alias_key(alias), &src.encode(), 0)?;

    let mut aliases = read_aliases(txn, src)?;
    if !aliases.contains(alias) {
        aliases.push(alias.clone());
    }
    write_aliases(txn, src, &aliases)
}

pub(super) fn unlink<T: KvWrite>(txn: &mut T, src: &ItemId, alias: &ItemId) -> Result<()> {
    txn.delete(&keys::alias_key(alias))?;

    let mut aliases = read_aliases(txn, src)?;
    aliases.retain(|a| a != alias);
    write_aliases(txn, src, &aliases)
}
