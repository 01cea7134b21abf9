use crate::config::StoreConfig;
use crate::error::Result;

/// A stored value together with its one-byte entry metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub meta: u8,
    pub value: Vec<u8>,
}

/// Returned by scan visitors to continue or end a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanControl {
    Continue,
    Stop,
}

/// Visitor invoked for each `(key, meta, value)` during a scan
pub type ScanVisitor<'v> = dyn FnMut(&[u8], u8, &[u8]) -> Result<ScanControl> + 'v;

/// Read access to an ordered byte-key space
///
/// Implemented by both read-only and read-write transactions. A read-write
/// transaction observes its own uncommitted writes.
pub trait KvRead {
    /// Point lookup; `Ok(None)` when the key is absent
    fn get(&self, key: &[u8]) -> Result<Option<Entry>>;

    /// Visit keys `>= start` in ascending order while they begin with `prefix`
    ///
    /// `start` should itself begin with `prefix`. The visitor ends the scan
    /// early by returning [`ScanControl::Stop`]; an error from the visitor
    /// ends the scan and is returned as-is.
    fn scan(&self, start: &[u8], prefix: &[u8], visit: &mut ScanVisitor<'_>) -> Result<()>;

    /// Presence test
    fn contains(&self, key: &[u8]) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// Write access inside a transaction
///
/// Note: Not required to be Send, as LMDB transactions are thread-affine
pub trait KvWrite: KvRead {
    /// Insert or overwrite a key with its entry metadata byte
    fn set(&mut self, key: &[u8], value: &[u8], meta: u8) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Commit all buffered writes atomically
    fn commit(self) -> Result<()>
    where
        Self: Sized;

    /// Discard all buffered writes
    fn abort(self)
    where
        Self: Sized;
}

/// Backing store: snapshot-isolated transactions over ordered byte keys
pub trait KvStore: Send + Sync {
    type ReadTxn<'a>: KvRead
    where
        Self: 'a;

    type WriteTxn<'a>: KvWrite
    where
        Self: 'a;

    /// Open (or create) a store
    fn open(cfg: StoreConfig) -> Result<Self>
    where
        Self: Sized;

    /// Begin a read-only snapshot transaction
    fn read_txn(&self) -> Result<Self::ReadTxn<'_>>;

    /// Begin a read-write transaction
    fn write_txn(&self) -> Result<Self::WriteTxn<'_>>;
}
