pub mod store;

pub use store::{Entry, KvRead, KvStore, KvWrite, ScanControl, ScanVisitor};
