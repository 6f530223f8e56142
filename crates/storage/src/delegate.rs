//! Collaborator traits consumed by the authorization context.
//!
//! Every call is keyed by the name of the authorization instance making it,
//! so one store can serve several independently named instances.

use crate::{Credentials, Result};
use policy::{Overrides, Package, UserId, UserRepresentation};
use std::sync::Arc;

/// Persistence for the per-instance login token.
pub trait SessionStore {
    /// Read the token for `instance`, if one is set.
    fn read(&self, instance: &str) -> Result<Option<String>>;

    /// Store `token` for `instance`. Returns whether the write was accepted.
    fn write(&self, instance: &str, token: &str) -> Result<bool>;

    /// Forget the token for `instance`.
    fn delete(&self, instance: &str) -> Result<bool>;
}

/// Durable storage for users, package assignments and overrides.
///
/// Methods returning `bool` report whether the store changed anything.
/// Package assignment changes always rebuild derived state; override changes
/// rebuild only when the store reports a change.
pub trait RecordStore {
    /// The full user representation handed back to callers.
    type User: UserRepresentation + Clone;

    fn find_user_by_credential_key(&self, instance: &str, username: &str) -> Result<Option<Credentials>>;

    fn fetch_user_representation(&self, instance: &str, user_id: &UserId) -> Result<Option<Self::User>>;

    fn add_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool>;

    fn remove_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool>;

    /// Assigned packages in assignment order.
    fn fetch_packages(&self, instance: &str, user: &dyn UserRepresentation) -> Result<Vec<Package>>;

    /// Packages match by name.
    fn has_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool>;

    fn set_override(
        &self,
        instance: &str,
        user: &dyn UserRepresentation,
        permission: &str,
        value: bool,
    ) -> Result<bool>;

    fn remove_override(&self, instance: &str, user: &dyn UserRepresentation, permission: &str) -> Result<bool>;

    fn fetch_overrides(&self, instance: &str, user: &dyn UserRepresentation) -> Result<Overrides>;

    fn reset_overrides(&self, instance: &str, user: &dyn UserRepresentation) -> Result<bool>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn read(&self, instance: &str) -> Result<Option<String>> {
        (**self).read(instance)
    }

    fn write(&self, instance: &str, token: &str) -> Result<bool> {
        (**self).write(instance, token)
    }

    fn delete(&self, instance: &str) -> Result<bool> {
        (**self).delete(instance)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    type User = T::User;

    fn find_user_by_credential_key(&self, instance: &str, username: &str) -> Result<Option<Credentials>> {
        (**self).find_user_by_credential_key(instance, username)
    }

    fn fetch_user_representation(&self, instance: &str, user_id: &UserId) -> Result<Option<Self::User>> {
        (**self).fetch_user_representation(instance, user_id)
    }

    fn add_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool> {
        (**self).add_package(instance, user, package)
    }

    fn remove_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool> {
        (**self).remove_package(instance, user, package)
    }

    fn fetch_packages(&self, instance: &str, user: &dyn UserRepresentation) -> Result<Vec<Package>> {
        (**self).fetch_packages(instance, user)
    }

    fn has_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool> {
        (**self).has_package(instance, user, package)
    }

    fn set_override(
        &self,
        instance: &str,
        user: &dyn UserRepresentation,
        permission: &str,
        value: bool,
    ) -> Result<bool> {
        (**self).set_override(instance, user, permission, value)
    }

    fn remove_override(&self, instance: &str, user: &dyn UserRepresentation, permission: &str) -> Result<bool> {
        (**self).remove_override(instance, user, permission)
    }

    fn fetch_overrides(&self, instance: &str, user: &dyn UserRepresentation) -> Result<Overrides> {
        (**self).fetch_overrides(instance, user)
    }

    fn reset_overrides(&self, instance: &str, user: &dyn UserRepresentation) -> Result<bool> {
        (**self).reset_overrides(instance, user)
    }
}
