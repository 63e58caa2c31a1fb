//! Durable offline staging for undelivered records.

pub mod ports;
pub mod store;

pub use ports::KeyValueStore;
pub use store::OfflineOutbox;
