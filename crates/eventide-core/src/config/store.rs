use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the backing store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the store directory
    pub path: PathBuf,

    /// Maximum map size for LMDB (in bytes)
    /// Default: 10GB
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Sync mode for durability
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Maximum number of concurrent readers
    /// Default: 126
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SyncMode {
    /// Calls `fsync()` on every commit.
    ///
    /// Committed transactions survive power loss and OS crashes.
    Full,

    /// Skips syncing the meta-page on each commit (default).
    ///
    /// Committed data survives process crashes. An OS crash may lose the
    /// last transaction but leaves the store consistent.
    #[default]
    NoMetaSync,

    /// Never calls `fsync()`; the OS decides when to flush.
    ///
    /// **WARNING**: a power failure can lose an unbounded number of recent
    /// transactions. Use for tests and reproducible imports only.
    NoSync,
}

fn default_map_size() -> usize {
    10 * 1024 * 1024 * 1024 // 10GB
}

fn default_max_readers() -> u32 {
    126
}

impl StoreConfig {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            map_size: default_map_size(),
            sync_mode: SyncMode::default(),
            max_readers: default_max_readers(),
        }
    }

    pub fn with_map_size(mut self, map_size: usize) -> Self {
        self.map_size = map_size;
        self
    }

    pub fn with_sync_mode(mut self, sync_mode: SyncMode) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    pub fn with_max_readers(mut self, max_readers: u32) -> Self {
        self.max_readers = max_readers;
        self
    }
}
