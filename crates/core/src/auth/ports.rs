//! Port interfaces for authentication

use async_trait::async_trait;
use nudgekit_domain::{NudgeKitError, StorageError, TokenPair};

/// Key/value persistence for opaque string secrets, backed by the platform's
/// encrypted credential store.
///
/// No caching happens at this layer; every call touches durable storage.
/// Missing entries are `Ok(None)` on read and a successful no-op on delete.
pub trait TokenStore: Send + Sync {
    /// Persist a secret under the given key.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read a secret, or `None` when no entry exists.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Delete a secret. Deleting a missing entry succeeds.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Single network handshake against the account-validation endpoint.
///
/// The request carries a stable account and app identifier; implementations
/// must not mutate it between attempts.
#[async_trait]
pub trait AccountValidator: Send + Sync {
    /// Perform one validation attempt and decode the issued token pair.
    async fn validate_account(&self) -> Result<TokenPair, NudgeKitError>;
}
