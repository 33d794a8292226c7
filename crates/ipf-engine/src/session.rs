//! Session Store
//!
//! Enabled flag and selectors, kept for the lifetime of the browsing
//! session. Backends may refuse access (privacy settings, sandboxed
//! frames); the store turns every such failure into a default value.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::SelectorPair;
use crate::reconcile::SessionSnapshot;

/// Storage error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage access denied")]
    Denied,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Key/value storage scoped to the browsing session (`sessionStorage`)
pub trait SessionBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory session storage
///
/// Clones share the same map, so a page reload can be modelled by handing
/// a clone to the next document's context.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    data: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.data.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// End of the browsing session
    pub fn clear(&self) {
        if let Ok(mut data) = self.data.lock() {
            data.clear();
        }
    }
}

impl SessionBackend for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self
            .data
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        data.remove(key);
        Ok(())
    }
}

/// Storage that refuses every access
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockedStorage;

impl SessionBackend for BlockedStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Denied)
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Denied)
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Denied)
    }
}

/// Versioned key names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub enabled: String,
    pub frame_selector: String,
    pub hide_selector: String,
}

impl SessionKeys {
    pub fn versioned(version: &str) -> Self {
        Self {
            enabled: format!("ipf_enabled_{}", version),
            frame_selector: format!("ipf_iframe_selector_{}", version),
            hide_selector: format!("ipf_hide_selector_{}", version),
        }
    }
}

/// Typed view over a session backend that never fails
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
    keys: SessionKeys,
}

impl SessionStore {
    pub fn new(backend: Box<dyn SessionBackend>, keys: SessionKeys) -> Self {
        Self { backend, keys }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Store the flag as `"1"`, or drop the key when disabled
    pub fn set_enabled(&mut self, enabled: bool) {
        let result = if enabled {
            self.backend.set_item(&self.keys.enabled, "1")
        } else {
            self.backend.remove_item(&self.keys.enabled)
        };
        if let Err(e) = result {
            tracing::trace!("Session enabled flag not written: {}", e);
        }
    }

    pub fn get_enabled(&self) -> bool {
        self.read(&self.keys.enabled).as_deref() == Some("1")
    }

    pub fn set_selectors(&mut self, frame: &str, hide: &str) {
        let result = self
            .backend
            .set_item(&self.keys.frame_selector, frame)
            .and_then(|_| self.backend.set_item(&self.keys.hide_selector, hide));
        if let Err(e) = result {
            tracing::trace!("Session selectors not written: {}", e);
        }
    }

    /// Stored selectors; missing values read as empty strings
    pub fn get_selectors(&self) -> SelectorPair {
        SelectorPair {
            frame: self.read(&self.keys.frame_selector).unwrap_or_default(),
            hide: self.read(&self.keys.hide_selector).unwrap_or_default(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            enabled: self.get_enabled(),
            selectors: self.get_selectors(),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::trace!("Session read of {} degraded: {}", key, e);
                None
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
