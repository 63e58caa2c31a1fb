//! Keyring-backed secure token storage
//!
//! Implements the [`TokenStore`] port over the platform credential store
//! (macOS Keychain, Windows Credential Manager, Linux keyutils). Secrets are
//! addressed by stable string keys under a single service namespace and
//! persist across process restarts; no caching happens here - that lives in
//! the auth session.

use keyring::Entry;
use nudgekit_core::TokenStore;
use nudgekit_domain::StorageError;
use tracing::debug;

/// Default service namespace for stored secrets.
pub const DEFAULT_SERVICE: &str = "NudgeKit.tokens";

/// Platform credential store adapter.
pub struct KeychainTokenStore {
    service: String,
}

impl Default for KeychainTokenStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl KeychainTokenStore {
    /// Create a store scoped to the given service namespace.
    #[must_use]
    pub fn new(service: &str) -> Self {
        Self { service: service.to_string() }
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key).map_err(|e| StorageError::Keychain(e.to_string()))
    }
}

impl TokenStore for KeychainTokenStore {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(key, "Storing secret");
        self.entry(key)?.set_password(value).map_err(|e| StorageError::Keychain(e.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Keychain(e.to_string())),
        }
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        debug!(key, "Deleting secret");
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Keychain(e.to_string())),
        }
    }
}
