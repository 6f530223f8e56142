//! In-process session store.

use crate::{Error, Result, SessionStore};
use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe, in-memory map from instance name to session token.
///
/// Several authorization instances can share one store as long as their
/// names differ.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    tokens: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self, instance: &str) -> Result<Option<String>> {
        let tokens = self.tokens.read().map_err(|e| {
            tracing::error!("session store: lock poisoned on read: {e}");
            Error::LockPoisoned
        })?;
        Ok(tokens.get(instance).cloned())
    }

    fn write(&self, instance: &str, token: &str) -> Result<bool> {
        let mut tokens = self.tokens.write().map_err(|e| {
            tracing::error!("session store: lock poisoned on write: {e}");
            Error::LockPoisoned
        })?;
        tokens.insert(instance.to_string(), token.to_string());
        Ok(true)
    }

    fn delete(&self, instance: &str) -> Result<bool> {
        let mut tokens = self.tokens.write().map_err(|e| {
            tracing::error!("session store: lock poisoned on delete: {e}");
            Error::LockPoisoned
        })?;
        tokens.remove(instance);
        Ok(true)
    }
}
