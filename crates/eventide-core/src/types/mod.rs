pub mod event;
pub mod item;

pub use event::{event_kind, now_nanos, EventId, LogEvent};
pub use item::{item_type, ItemId};
