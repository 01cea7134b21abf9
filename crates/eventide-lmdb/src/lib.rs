//! LMDB-backed store implementation
//!
//! Provides the ordered, transactional byte-key space eventide is layered on.
//!
//! Key features:
//! - Snapshot-isolated read transactions, serialized write transactions
//! - Write transactions read their own uncommitted writes
//! - Prefix-bounded forward scans from an arbitrary start key
//! - One metadata byte per entry, stored ahead of the value

pub mod store;
pub mod txn;

pub use store::LmdbStore;
pub use txn::{LmdbReadTxn, LmdbWriteTxn};
