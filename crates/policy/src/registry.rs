//! Lookup of package kinds by name.

use crate::{Error, Package, PackageDefinition, PackageKind, Result};
use std::collections::HashMap;

type Factory = Box<dyn Fn() -> Result<Package> + Send + Sync>;

/// Explicit table of known package kinds.
///
/// Each entry is a zero-argument factory. The table is populated at startup
/// and consulted whenever a package is referenced by name.
#[derive(Default)]
pub struct PackageRegistry {
    factories: HashMap<String, Factory>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package kind constructed through its `Default` impl.
    pub fn register<K>(&mut self) -> Result<&mut Self>
    where
        K: PackageKind + Default + 'static,
    {
        let name = K::default().name().to_string();
        self.register_with(name, || Package::new(&K::default()))
    }

    /// Register an arbitrary factory under `name`.
    pub fn register_with<F>(&mut self, name: impl Into<String>, factory: F) -> Result<&mut Self>
    where
        F: Fn() -> Result<Package> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::DuplicatePackage(name));
        }
        self.factories.insert(name, Box::new(factory));
        Ok(self)
    }

    /// Register a declarative package kind.
    pub fn register_definition(&mut self, definition: PackageDefinition) -> Result<&mut Self> {
        let name = definition.name.clone();
        self.register_with(name, move || Package::new(&definition))
    }

    /// Parse and register a declarative package kind from TOML.
    pub fn register_toml(&mut self, toml: &str) -> Result<&mut Self> {
        self.register_definition(PackageDefinition::parse(toml)?)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered kind names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Construct a fresh package of the named kind.
    pub fn build(&self, name: &str) -> Result<Package> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::PackageNotFound(name.to_string()))?;

        let package = factory()?;
        if package.name() != name {
            return Err(Error::PackageBadLineage {
                requested: name.to_string(),
                actual: package.name().to_string(),
            });
        }
        Ok(package)
    }

    /// Turn a reference into a concrete package.
    pub fn resolve(&self, reference: PackageRef) -> Result<Package> {
        match reference {
            PackageRef::Name(name) => self.build(&name),
            PackageRef::Instance(package) => Ok(package),
        }
    }
}

impl std::fmt::Debug for PackageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageRegistry")
            .field("kinds", &self.names())
            .finish()
    }
}

/// A package given either by kind name or as a built instance.
#[derive(Debug, Clone)]
pub enum PackageRef {
    Name(String),
    Instance(Package),
}

impl From<&str> for PackageRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PackageRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<Package> for PackageRef {
    fn from(package: Package) -> Self {
        Self::Instance(package)
    }
}

impl From<&Package> for PackageRef {
    fn from(package: &Package) -> Self {
        Self::Instance(package.clone())
    }
}
