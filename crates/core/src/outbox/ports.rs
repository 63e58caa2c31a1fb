//! Port interface for the outbox's backing persistence

use nudgekit_domain::StorageError;

/// Simple string key/value persistence (not a database).
///
/// Last-write-wins per key; the outbox layers list-append semantics on top.
/// Implementations are process-wide shared resources and are only accessed
/// through the owning component's serialization.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
