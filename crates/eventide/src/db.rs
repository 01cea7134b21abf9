//! Unified eventide database handle
//!
//! Wraps the LMDB store and runs closures inside its transactions. Log,
//! item and schema operations all take the transaction they run in, so
//! anything done inside one closure commits or aborts together.

use crate::{KvStore, LmdbReadTxn, LmdbStore, LmdbWriteTxn, Result, StoreConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Eventide database
pub struct EventideDb {
    store: Arc<LmdbStore>,
    path: PathBuf,
}

impl EventideDb {
    /// Open (or create) a database directory with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(StoreConfig::new(path.as_ref().to_path_buf()))
    }

    /// Open with a custom store configuration
    pub fn open_with_config(config: StoreConfig) -> Result<Self> {
        let path = config.path.clone();
        let store = Arc::new(LmdbStore::open(config)?);
        Ok(Self { store, path })
    }

    /// Run `f` in a write transaction, committing on `Ok` and aborting on `Err`
    pub fn update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut LmdbWriteTxn<'_>) -> Result<R>,
    {
        self.store.update(f)
    }

    /// Run `f` against a read-only snapshot
    pub fn view<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&LmdbReadTxn<'_>) -> Result<R>,
    {
        self.store.view(f)
    }

    /// Get reference to the backing store
    pub fn store(&self) -> &Arc<LmdbStore> {
        &self.store
    }

    /// Get the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}
