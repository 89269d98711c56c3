//! Key/value persistence seam.
//!
//! The engine stores each collection as one versioned JSON document under a
//! fixed key (see [`super::snapshot`]). Providers only move strings.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::PersistenceError;

/// Every storage backend implements this trait.
pub trait PersistenceProvider: Send {
    /// Short backend name used in logs.
    fn name(&self) -> &str;

    /// Returns `None` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PersistenceProvider for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self.entries.lock().map_err(|_| PersistenceError::Locked)?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self.entries.lock().map_err(|_| PersistenceError::Locked)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
