//! The authorization context.

use std::collections::HashMap;
use std::sync::Arc;

use policy::{
    Package, PackageRef, PackageRegistry, PermissionSet, UserId, UserRepresentation, Verdict,
};
use serde_json::Value;
use storage::{RecordStore, SessionStore};

use crate::{password, AuthConfig, Error, Result};

/// Who to sign in with [`Auth::force_login`].
#[derive(Clone, Copy)]
pub enum LoginTarget<'a> {
    /// Look the user up in the record store first.
    Id(&'a UserId),
    /// Trust an already loaded user.
    User(&'a dyn UserRepresentation),
}

impl<'a> From<&'a UserId> for LoginTarget<'a> {
    fn from(id: &'a UserId) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a storage::StoredUser> for LoginTarget<'a> {
    fn from(user: &'a storage::StoredUser) -> Self {
        Self::User(user)
    }
}

impl<'a> From<&'a dyn UserRepresentation> for LoginTarget<'a> {
    fn from(user: &'a dyn UserRepresentation) -> Self {
        Self::User(user)
    }
}

/// One named authorization instance.
///
/// Tracks the signed-in user through a [`SessionStore`], reads and writes
/// package assignments and overrides through a [`RecordStore`], and keeps a
/// per-user cache of resolved [`PermissionSet`]s.
///
/// The cache is only ever rebuilt by mutations made through this instance
/// (adding or removing packages, setting or resetting overrides) or by an
/// explicit [`refresh_permissions_for_user`](Self::refresh_permissions_for_user).
/// A user with no cache entry is denied everything.
pub struct Auth<S, R: RecordStore> {
    name: String,
    sessions: S,
    records: R,
    packages: Arc<PackageRegistry>,
    config: AuthConfig,
    user: Option<R::User>,
    permissions: HashMap<UserId, PermissionSet>,
}

impl<S: SessionStore, R: RecordStore> Auth<S, R> {
    pub fn new(
        name: impl Into<String>,
        sessions: S,
        records: R,
        packages: Arc<PackageRegistry>,
        config: AuthConfig,
    ) -> Self {
        Self {
            name: name.into(),
            sessions,
            records,
            packages,
            config,
            user: None,
            permissions: HashMap::new(),
        }
    }

    /// The instance name. Session and record calls are keyed by it.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn packages(&self) -> &PackageRegistry {
        &self.packages
    }

    // -------------------------------------------------------------------------
    // Passwords
    // -------------------------------------------------------------------------

    /// Hash a password with this instance's configured cost.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        password::hash_password(password, self.config.cost)
    }

    /// Verify a password against a stored hash. A malformed hash never matches.
    pub fn check_password(&self, password: &str, hash: &str) -> bool {
        match password::verify_password(password, hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::warn!(instance = %self.name, error = %e, "stored password hash is malformed");
                false
            }
        }
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Sign in with a username and password.
    ///
    /// Returns `false` for an unknown username or a wrong password, `true`
    /// once the credentials check out and the session write has been issued.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        let Some(credentials) = self
            .records
            .find_user_by_credential_key(&self.name, username)?
        else {
            tracing::warn!(instance = %self.name, username, "login failed: unknown user");
            return Ok(false);
        };

        if !self.check_password(password, &credentials.password_hash) {
            tracing::warn!(instance = %self.name, username, "login failed: wrong password");
            return Ok(false);
        }

        self.user = None;
        if !self.sessions.write(&self.name, credentials.id.as_str())? {
            tracing::warn!(instance = %self.name, user_id = %credentials.id, "session store did not accept login");
        }
        tracing::info!(instance = %self.name, user_id = %credentials.id, "logged in");
        Ok(true)
    }

    /// Whether the session holds a user id.
    pub fn logged_in(&self) -> Result<bool> {
        Ok(self.session_user_id()?.is_some())
    }

    /// Clear the session and the memoized user.
    pub fn logout(&mut self) -> Result<()> {
        self.sessions.delete(&self.name)?;
        self.user = None;
        tracing::info!(instance = %self.name, "logged out");
        Ok(())
    }

    /// Sign in without a password.
    ///
    /// An id is looked up first and fails with [`Error::UserNotFound`] when
    /// the record store does not know it.
    pub fn force_login<'a>(&mut self, target: impl Into<LoginTarget<'a>>) -> Result<bool> {
        let id = match target.into() {
            LoginTarget::Id(id) => {
                let user = self.load_user(id)?;
                let id = user.id().clone();
                self.user = Some(user);
                id
            }
            LoginTarget::User(user) => {
                if self.user.as_ref().is_some_and(|memo| memo.id() != user.id()) {
                    self.user = None;
                }
                user.id().clone()
            }
        };

        if !self.sessions.write(&self.name, id.as_str())? {
            tracing::warn!(instance = %self.name, user_id = %id, "session store did not accept forced login");
        }
        tracing::info!(instance = %self.name, user_id = %id, "forced login");
        Ok(true)
    }

    /// The signed-in user, loaded once per session.
    ///
    /// If the session names a user the record store no longer has, the
    /// session is cleared and `None` is returned.
    pub fn user(&mut self) -> Result<Option<R::User>> {
        let Some(id) = self.session_user_id()? else {
            return Ok(None);
        };

        let memoized = self.user.as_ref().is_some_and(|user| user.id() == &id);
        if !memoized {
            match self.load_user(&id) {
                Ok(user) => self.user = Some(user),
                Err(Error::UserNotFound(_)) => {
                    tracing::warn!(instance = %self.name, user_id = %id, "session user no longer exists");
                    self.logout()?;
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(self.user.clone())
    }

    fn session_user_id(&self) -> Result<Option<UserId>> {
        let token = self.sessions.read(&self.name)?;
        Ok(token.filter(|t| !t.is_empty()).map(UserId::new))
    }

    fn load_user(&self, id: &UserId) -> Result<R::User> {
        self.records
            .fetch_user_representation(&self.name, id)?
            .ok_or_else(|| Error::UserNotFound(id.clone()))
    }

    // -------------------------------------------------------------------------
    // Packages
    // -------------------------------------------------------------------------

    /// Assign a package and rebuild the user's permissions.
    ///
    /// Fails with [`policy::Error::PackageNotFound`] or
    /// [`policy::Error::PackageBadLineage`] when the reference does not
    /// resolve to a package.
    pub fn add_package_to_user(
        &mut self,
        user: &dyn UserRepresentation,
        package: impl Into<PackageRef>,
    ) -> Result<()> {
        let package = self.packages.resolve(package.into())?;
        let added = self.records.add_package(&self.name, user, &package)?;
        tracing::debug!(instance = %self.name, user_id = %user.id(), package = package.name(), added, "package assigned");
        self.refresh_permissions_for_user(user)
    }

    /// Unassign a package and rebuild the user's permissions.
    /// Unresolvable references are ignored.
    pub fn remove_package_from_user(
        &mut self,
        user: &dyn UserRepresentation,
        package: impl Into<PackageRef>,
    ) -> Result<()> {
        let Some(package) = self.resolve_quietly(package.into())? else {
            return Ok(());
        };
        let removed = self.records.remove_package(&self.name, user, &package)?;
        tracing::debug!(instance = %self.name, user_id = %user.id(), package = package.name(), removed, "package unassigned");
        self.refresh_permissions_for_user(user)
    }

    /// The user's packages as the record store holds them.
    pub fn packages_for_user(&self, user: &dyn UserRepresentation) -> Result<Vec<Package>> {
        Ok(self.records.fetch_packages(&self.name, user)?)
    }

    /// Whether the user holds the package. Unresolvable references are `false`.
    pub fn user_has_package(
        &self,
        user: &dyn UserRepresentation,
        package: impl Into<PackageRef>,
    ) -> Result<bool> {
        match self.resolve_quietly(package.into())? {
            Some(package) => Ok(self.records.has_package(&self.name, user, &package)?),
            None => Ok(false),
        }
    }

    fn resolve_quietly(&self, reference: PackageRef) -> Result<Option<Package>> {
        match self.packages.resolve(reference) {
            Ok(package) => Ok(Some(package)),
            Err(policy::Error::PackageNotFound(_) | policy::Error::PackageBadLineage { .. }) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    // -------------------------------------------------------------------------
    // Permissions
    // -------------------------------------------------------------------------

    /// Re-read the user's packages and overrides and rebuild the cached set.
    pub fn refresh_permissions_for_user(&mut self, user: &dyn UserRepresentation) -> Result<()> {
        let packages = self.records.fetch_packages(&self.name, user)?;
        let overrides = self.records.fetch_overrides(&self.name, user)?;
        let package_count = packages.len();

        let permissions = PermissionSet::resolve(packages, &overrides);
        tracing::debug!(
            instance = %self.name,
            user_id = %user.id(),
            packages = package_count,
            overrides = overrides.len(),
            permissions = permissions.len(),
            "permissions rebuilt"
        );
        self.permissions.insert(user.id().clone(), permissions);
        Ok(())
    }

    /// The cached permission set, if one has been built for this user.
    pub fn permissions_for_user(&self, user: &dyn UserRepresentation) -> Option<&PermissionSet> {
        self.permissions.get(user.id())
    }

    /// Pin a permission the user already has to a fixed value.
    ///
    /// Fails with [`Error::UnknownPermission`] unless the user's cached set
    /// defines `permission`.
    pub fn override_permission_for_user(
        &mut self,
        user: &dyn UserRepresentation,
        permission: &str,
        value: bool,
    ) -> Result<()> {
        let known = self
            .permissions
            .get(user.id())
            .is_some_and(|set| set.contains(permission));
        if !known {
            return Err(Error::UnknownPermission {
                permission: permission.to_string(),
                user_id: user.id().clone(),
            });
        }

        if self.records.set_override(&self.name, user, permission, value)? {
            self.refresh_permissions_for_user(user)?;
        }
        Ok(())
    }

    /// Drop a single override. Absent overrides are ignored.
    pub fn remove_override_for_user(
        &mut self,
        user: &dyn UserRepresentation,
        permission: &str,
    ) -> Result<()> {
        if self.records.remove_override(&self.name, user, permission)? {
            self.refresh_permissions_for_user(user)?;
        }
        Ok(())
    }

    /// Drop every override the user has.
    pub fn reset_overrides_for_user(&mut self, user: &dyn UserRepresentation) -> Result<()> {
        if self.records.reset_overrides(&self.name, user)? {
            self.refresh_permissions_for_user(user)?;
        }
        Ok(())
    }

    /// Check a permission for a specific user.
    ///
    /// Never fails: unknown users and unknown permissions are denied.
    pub fn user_can(
        &self,
        user: &dyn UserRepresentation,
        permission: &str,
        args: &[Value],
    ) -> Verdict {
        match self.permissions.get(user.id()) {
            Some(set) => set.check(user, permission, args),
            None => Verdict::deny(),
        }
    }

    /// Check a permission for the signed-in user.
    ///
    /// Denied when nobody is signed in. Store failures are logged and denied.
    pub fn can(&mut self, permission: &str, args: &[Value]) -> Verdict {
        let user = match self.user() {
            Ok(Some(user)) => user,
            Ok(None) => return Verdict::deny(),
            Err(e) => {
                tracing::error!(instance = %self.name, permission, error = %e, "permission check failed closed");
                return Verdict::deny();
            }
        };
        self.user_can(&user, permission, args)
    }
}
