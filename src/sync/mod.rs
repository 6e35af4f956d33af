pub mod debouncer;
pub mod synchronizer;

pub use debouncer::{Debouncer, Ticket};
pub use synchronizer::{RequestTag, SyncState, Synchronizer};
