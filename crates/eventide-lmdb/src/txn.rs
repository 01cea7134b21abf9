use eventide_core::{
    error::{EventideError, Result},
    traits::{Entry, KvRead, KvWrite, ScanControl, ScanVisitor},
};
use lmdb::{Cursor, Database, RoTransaction, RwTransaction, Transaction, WriteFlags};
use std::os::raw::c_uint;

/// Write transaction for the LMDB store
///
/// Writes are buffered by LMDB and become visible to other transactions
/// only on commit. Dropping the transaction without committing aborts it.
pub struct LmdbWriteTxn<'a> {
    txn: Option<RwTransaction<'a>>,
    db: Database,
    stats: TxnStats,
}

/// Transaction statistics
#[derive(Default)]
struct TxnStats {
    keys_written: usize,
    keys_deleted: usize,
}

/// Read-only snapshot transaction for the LMDB store
///
/// Enables concurrent reads without blocking writes or other reads.
pub struct LmdbReadTxn<'a> {
    txn: RoTransaction<'a>,
    db: Database,
}

impl<'a> LmdbReadTxn<'a> {
    pub fn new(txn: RoTransaction<'a>, db: Database) -> Self {
        Self { txn, db }
    }
}

impl<'a> KvRead for LmdbReadTxn<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Entry>> {
        get_entry(&self.txn, self.db, key)
    }

    fn scan(&self, start: &[u8], prefix: &[u8], visit: &mut ScanVisitor<'_>) -> Result<()> {
        scan_entries(&self.txn, self.db, start, prefix, visit)
    }
}

impl<'a> LmdbWriteTxn<'a> {
    pub fn new(txn: RwTransaction<'a>, db: Database) -> Self {
        Self {
            txn: Some(txn),
            db,
            stats: TxnStats::default(),
        }
    }

    fn inner(&self) -> Result<&RwTransaction<'a>> {
        self.txn
            .as_ref()
            .ok_or_else(|| EventideError::InvalidState("Transaction already committed".into()))
    }

    fn inner_mut(&mut self) -> Result<&mut RwTransaction<'a>> {
        self.txn
            .as_mut()
            .ok_or_else(|| EventideError::InvalidState("Transaction already committed".into()))
    }
}

impl<'a> KvRead for LmdbWriteTxn<'a> {
    fn get(&self, key: &[u8]) -> Result<Option<Entry>> {
        get_entry(self.inner()?, self.db, key)
    }

    fn scan(&self, start: &[u8], prefix: &[u8], visit: &mut ScanVisitor<'_>) -> Result<()> {
        scan_entries(self.inner()?, self.db, start, prefix, visit)
    }
}

impl<'a> KvWrite for LmdbWriteTxn<'a> {
    fn set(&mut self, key: &[u8], value: &[u8], meta: u8) -> Result<()> {
        let db = self.db;
        let mut stored = Vec::with_capacity(1 + value.len());
        stored.push(meta);
        stored.extend_from_slice(value);

        self.inner_mut()?
            .put(db, &key, &stored, WriteFlags::empty())
            .map_err(txn_err)?;

        self.stats.keys_written += 1;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        let db = self.db;
        match self.inner_mut()?.del(db, &key, None) {
            Ok(()) => {
                self.stats.keys_deleted += 1;
                Ok(())
            }
            Err(lmdb::Error::NotFound) => Ok(()), // Idempotent
            Err(e) => Err(txn_err(e)),
        }
    }

    fn commit(mut self) -> Result<()> {
        let txn = self
            .txn
            .take()
            .ok_or_else(|| EventideError::InvalidState("Transaction already committed".into()))?;
        txn.commit().map_err(txn_err)?;

        tracing::trace!(
            "Committed transaction: {} keys written, {} keys deleted",
            self.stats.keys_written,
            self.stats.keys_deleted
        );
        Ok(())
    }

    fn abort(mut self) {
        if let Some(txn) = self.txn.take() {
            txn.abort();
        }
    }
}

impl<'a> Drop for LmdbWriteTxn<'a> {
    fn drop(&mut self) {
        if let Some(txn) = self.txn.take() {
            txn.abort();
        }
    }
}

fn txn_err(e: lmdb::Error) -> EventideError {
    EventideError::Transaction(e.to_string())
}

/// Split a stored value into its meta byte and payload
fn split_value<'v>(key: &[u8], stored: &'v [u8]) -> Result<(u8, &'v [u8])> {
    stored
        .split_first()
        .map(|(meta, payload)| (*meta, payload))
        .ok_or_else(|| EventideError::MissingValue(format!("{:02x?}", key)))
}

fn get_entry<T: Transaction>(txn: &T, db: Database, key: &[u8]) -> Result<Option<Entry>> {
    match txn.get(db, &key) {
        Ok(stored) => {
            let (meta, value) = split_value(key, stored)?;
            Ok(Some(Entry {
                meta,
                value: value.to_vec(),
            }))
        }
        Err(lmdb::Error::NotFound) => Ok(None),
        Err(e) => Err(txn_err(e)),
    }
}

fn scan_entries<T: Transaction>(
    txn: &T,
    db: Database,
    start: &[u8],
    prefix: &[u8],
    visit: &mut ScanVisitor<'_>,
) -> Result<()> {
    let cursor = txn.open_ro_cursor(db).map_err(txn_err)?;

    // `iter_from` panics when no key sorts at or after `start`
    let mut next = if start.is_empty() {
        // LMDB rejects zero-length keys
        cursor_step(&cursor, None, lmdb_sys::MDB_FIRST)?
    } else {
        cursor_step(&cursor, Some(start), lmdb_sys::MDB_SET_RANGE)?
    };
    while let Some((key, stored)) = next {
        if !key.starts_with(prefix) {
            break;
        }
        let (meta, value) = split_value(key, stored)?;
        if visit(key, meta, value)? == ScanControl::Stop {
            break;
        }
        next = cursor_step(&cursor, None, lmdb_sys::MDB_NEXT)?;
    }

    Ok(())
}

/// Move the cursor with `op`, `None` once it runs off the end
fn cursor_step<'txn, C: Cursor<'txn>>(
    cursor: &C,
    key: Option<&[u8]>,
    op: c_uint,
) -> Result<Option<(&'txn [u8], &'txn [u8])>> {
    match cursor.get(key, None, op) {
        Ok((Some(key), value)) => Ok(Some((key, value))),
        Ok((None, _)) => Err(EventideError::InvalidState(
            "cursor returned a value without its key".into(),
        )),
        Err(lmdb::Error::NotFound) => Ok(None),
        Err(e) => Err(txn_err(e)),
    }
}
