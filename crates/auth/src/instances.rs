//! Named authorization instances.

use std::collections::HashMap;

use storage::{RecordStore, SessionStore};

use crate::{Auth, Error, Result};

/// Name of the instance returned by [`AuthRegistry::default_instance`].
pub const DEFAULT_INSTANCE: &str = "default";

/// An explicit table of [`Auth`] instances keyed by name.
pub struct AuthRegistry<S, R: RecordStore> {
    instances: HashMap<String, Auth<S, R>>,
}

impl<S: SessionStore, R: RecordStore> Default for AuthRegistry<S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SessionStore, R: RecordStore> AuthRegistry<S, R> {
    pub fn new() -> Self {
        Self {
            instances: HashMap::new(),
        }
    }

    /// Register an instance under its own name, returning any instance it replaced.
    pub fn insert(&mut self, auth: Auth<S, R>) -> Option<Auth<S, R>> {
        let name = auth.name().to_string();
        let replaced = self.instances.insert(name.clone(), auth);
        if replaced.is_some() {
            tracing::warn!(instance = %name, "replaced existing auth instance");
        }
        replaced
    }

    pub fn instance(&self, name: &str) -> Result<&Auth<S, R>> {
        self.instances
            .get(name)
            .ok_or_else(|| Error::UnknownInstance(name.to_string()))
    }

    pub fn instance_mut(&mut self, name: &str) -> Result<&mut Auth<S, R>> {
        self.instances
            .get_mut(name)
            .ok_or_else(|| Error::UnknownInstance(name.to_string()))
    }

    pub fn default_instance(&mut self) -> Result<&mut Auth<S, R>> {
        self.instance_mut(DEFAULT_INSTANCE)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// Registered instance names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.instances.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn remove(&mut self, name: &str) -> Option<Auth<S, R>> {
        self.instances.remove(name)
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
