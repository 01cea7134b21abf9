use eventide_core::{
    error::{EventideError, Result},
    traits::{KvStore, KvWrite},
    StoreConfig, SyncMode,
};
use lmdb::{Database, DatabaseFlags, Environment, EnvironmentFlags};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::txn::{LmdbReadTxn, LmdbWriteTxn};

/// Name of the single LMDB database holding the whole key space
const KV_DB: &str = "kv";

/// LMDB-backed key/value store
///
/// All eventide data (log, items, aliases, views) lives in one ordered
/// LMDB database. Each stored value carries a leading metadata byte.
pub struct LmdbStore {
    pub(crate) env: Arc<Environment>,
    pub(crate) db: Database,
    path: PathBuf,
}

impl LmdbStore {
    /// Path of the store directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside a write transaction
    ///
    /// Commits when `f` returns `Ok`, aborts otherwise.
    pub fn update<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut LmdbWriteTxn<'_>) -> Result<R>,
    {
        let mut txn = self.write_txn()?;
        match f(&mut txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                txn.abort();
                Err(e)
            }
        }
    }

    /// Run `f` against a read-only snapshot
    pub fn view<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&LmdbReadTxn<'_>) -> Result<R>,
    {
        let txn = self.read_txn()?;
        f(&txn)
    }
}

impl KvStore for LmdbStore {
    type ReadTxn<'a> = LmdbReadTxn<'a>;
    type WriteTxn<'a> = LmdbWriteTxn<'a>;

    fn open(cfg: StoreConfig) -> Result<Self> {
        // Create directory if it doesn't exist
        std::fs::create_dir_all(&cfg.path)?;

        // Configure LMDB environment
        let mut env_builder = Environment::new();
        env_builder.set_max_dbs(1);
        env_builder.set_map_size(cfg.map_size);
        env_builder.set_max_readers(cfg.max_readers);

        // Set sync flags based on config
        let flags = match cfg.sync_mode {
            SyncMode::Full => EnvironmentFlags::empty(),
            SyncMode::NoMetaSync => EnvironmentFlags::NO_META_SYNC,
            SyncMode::NoSync => EnvironmentFlags::NO_SYNC,
        };
        env_builder.set_flags(flags);

        let env = env_builder
            .open(&cfg.path)
            .map_err(|e| EventideError::Config(format!("Failed to open LMDB at {:?}: {}", cfg.path, e)))?;

        let db = env
            .create_db(Some(KV_DB), DatabaseFlags::empty())
            .map_err(|e| EventideError::Transaction(e.to_string()))?;

        tracing::info!(
            "Opened LMDB store at {:?} (map_size={}, sync_mode={:?})",
            cfg.path,
            cfg.map_size,
            cfg.sync_mode
        );

        Ok(Self {
            env: Arc::new(env),
            db,
            path: cfg.path,
        })
    }

    fn read_txn(&self) -> Result<LmdbReadTxn<'_>> {
        let txn = self
            .env
            .begin_ro_txn()
            .map_err(|e| EventideError::Transaction(e.to_string()))?;
        Ok(LmdbReadTxn::new(txn, self.db))
    }

    fn write_txn(&self) -> Result<LmdbWriteTxn<'_>> {
        let txn = self
            .env
            .begin_rw_txn()
            .map_err(|e| EventideError::Transaction(e.to_string()))?;
        Ok(LmdbWriteTxn::new(txn, self.db))
    }
}
