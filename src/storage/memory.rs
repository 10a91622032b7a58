//! In-memory preference store.
//!
//! Thread-safe reference implementation of [`PreferenceStore`], intended
//! for tests and embedded use.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StorageError;
use crate::storage::traits::PreferenceStore;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory key-value store.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    state: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferenceStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("prefs.get"))?;
        Ok(state.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("prefs.set"))?;
        state.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err("prefs.clear"))?;
        state.remove(key);
        Ok(())
    }
}
