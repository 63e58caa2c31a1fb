//! Shared helpers for infra integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use nudgekit_core::TokenStore;
use nudgekit_domain::StorageError;

/// In-memory stand-in for the platform credential store.
#[derive(Default)]
pub struct MemoryTokenStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn seeded(key: &str, value: &str) -> Self {
        let store = Self::default();
        store.secrets.lock().unwrap().insert(key.to_string(), value.to_string());
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.secrets.lock().unwrap().contains_key(key)
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.secrets.lock().unwrap().get(key).cloned()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.secrets.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.secrets.lock().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.secrets.lock().unwrap().remove(key);
        Ok(())
    }
}
