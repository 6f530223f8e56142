//! Effective permission resolution.

use crate::{Package, Rule, UserRepresentation, Verdict};
use serde_json::Value;
use std::collections::HashMap;

/// Per-user forced values, keyed by permission name.
pub type Overrides = HashMap<String, bool>;

/// The merged permissions of one user.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    rules: HashMap<String, Rule>,
}

impl PermissionSet {
    /// Merge packages by precedence, then layer overrides on top.
    ///
    /// Packages are applied in ascending precedence so the highest precedence
    /// writes last; equal precedences keep their given order. Overrides only
    /// replace permissions some package defines and are ignored otherwise.
    pub fn resolve(mut packages: Vec<Package>, overrides: &Overrides) -> Self {
        packages.sort_by_key(Package::precedence);

        let mut rules = HashMap::new();
        for package in &packages {
            for (name, rule) in package.defined_permissions() {
                rules.insert(name.clone(), rule.clone());
            }
        }

        for (permission, value) in overrides {
            if let Some(rule) = rules.get_mut(permission) {
                *rule = Rule::Fixed(*value);
            }
        }

        Self { rules }
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.rules.contains_key(permission)
    }

    pub fn get(&self, permission: &str) -> Option<&Rule> {
        self.rules.get(permission)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Permission names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check a permission for `user`. Unknown permissions are denied.
    pub fn check(&self, user: &dyn UserRepresentation, permission: &str, args: &[Value]) -> Verdict {
        match self.rules.get(permission) {
            Some(rule) => rule.evaluate(user, args),
            None => Verdict::deny(),
        }
    }
}
