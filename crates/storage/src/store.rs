//! SQLite record store implementation.

use crate::{Credentials, Error, RecordStore, Result, StoredUser};
use chrono::Utc;
use policy::{Overrides, Package, PackageRegistry, UserId, UserRepresentation};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

/// SQLite-backed record store.
///
/// Packages are persisted by name and precedence and rebuilt through the
/// [`PackageRegistry`] on fetch, so only registered kinds can be assigned.
pub struct SqliteRecordStore {
    conn: Connection,
    registry: Arc<PackageRegistry>,
}

impl SqliteRecordStore {
    /// Open or create a record store at the given path.
    pub fn open(path: impl AsRef<Path>, registry: Arc<PackageRegistry>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn, registry };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory record store (useful for testing).
    pub fn in_memory(registry: Arc<PackageRegistry>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, registry };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                instance TEXT NOT NULL,
                id TEXT NOT NULL,
                username TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                profile TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (instance, id),
                UNIQUE (instance, username)
            );
            CREATE TABLE IF NOT EXISTS user_packages (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                instance TEXT NOT NULL,
                user_id TEXT NOT NULL,
                package TEXT NOT NULL,
                precedence INTEGER NOT NULL,
                assigned_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_user_packages_user
                ON user_packages(instance, user_id, seq);
            CREATE TABLE IF NOT EXISTS user_overrides (
                instance TEXT NOT NULL,
                user_id TEXT NOT NULL,
                permission TEXT NOT NULL,
                value INTEGER NOT NULL,
                PRIMARY KEY (instance, user_id, permission)
            );
            "#,
        )?;
        Ok(())
    }

    pub fn registry(&self) -> &PackageRegistry {
        &self.registry
    }

    /// Insert a new user. `password_hash` must already be hashed.
    pub fn create_user(
        &self,
        instance: &str,
        username: &str,
        password_hash: &str,
        profile: serde_json::Value,
    ) -> Result<StoredUser> {
        if self.find_user_by_credential_key(instance, username)?.is_some() {
            return Err(Error::DuplicateUser(username.to_string()));
        }

        let user = StoredUser::new(username, profile);
        self.conn.execute(
            "INSERT INTO users (instance, id, username, password_hash, profile, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                instance,
                user.id.as_str(),
                user.username,
                password_hash,
                serde_json::to_string(&user.profile)?,
                user.created_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(instance, user_id = %user.id, "created user");
        Ok(user)
    }

    /// Delete a user together with their package assignments and overrides.
    pub fn delete_user(&self, instance: &str, user_id: &UserId) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM users WHERE instance = ?1 AND id = ?2",
            params![instance, user_id.as_str()],
        )?;
        self.conn.execute(
            "DELETE FROM user_packages WHERE instance = ?1 AND user_id = ?2",
            params![instance, user_id.as_str()],
        )?;
        self.conn.execute(
            "DELETE FROM user_overrides WHERE instance = ?1 AND user_id = ?2",
            params![instance, user_id.as_str()],
        )?;
        Ok(removed > 0)
    }
}

impl RecordStore for SqliteRecordStore {
    type User = StoredUser;

    fn find_user_by_credential_key(&self, instance: &str, username: &str) -> Result<Option<Credentials>> {
        let credentials = self
            .conn
            .query_row(
                "SELECT id, username, password_hash FROM users WHERE instance = ?1 AND username = ?2",
                params![instance, username],
                |row| {
                    Ok(Credentials {
                        id: UserId::new(row.get::<_, String>(0)?),
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }

    fn fetch_user_representation(&self, instance: &str, user_id: &UserId) -> Result<Option<StoredUser>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, profile, created_at FROM users WHERE instance = ?1 AND id = ?2",
                params![instance, user_id.as_str()],
                |row| {
                    let id: String = row.get(0)?;
                    let username: String = row.get(1)?;
                    let profile: String = row.get(2)?;
                    let created_at: String = row.get(3)?;
                    Ok((id, username, profile, created_at))
                },
            )
            .optional()?;

        let Some((id, username, profile, created_at)) = row else {
            return Ok(None);
        };

        Ok(Some(StoredUser {
            id: UserId::new(id),
            username,
            profile: serde_json::from_str(&profile)?,
            created_at: created_at
                .parse()
                .map_err(|e| Error::Corrupt(format!("created_at for user {user_id}: {e}")))?,
        }))
    }

    fn add_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool> {
        if !self.registry.contains(package.name()) {
            return Err(Error::UnregisteredPackage(package.name().to_string()));
        }

        self.conn.execute(
            "INSERT INTO user_packages (instance, user_id, package, precedence, assigned_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                instance,
                user.id().as_str(),
                package.name(),
                package.precedence(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(true)
    }

    fn remove_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool> {
        // Only the oldest matching assignment goes.
        self.conn.execute(
            "DELETE FROM user_packages WHERE seq = (
                SELECT seq FROM user_packages
                WHERE instance = ?1 AND user_id = ?2 AND package = ?3
                ORDER BY seq LIMIT 1
             )",
            params![instance, user.id().as_str(), package.name()],
        )?;
        Ok(true)
    }

    fn fetch_packages(&self, instance: &str, user: &dyn UserRepresentation) -> Result<Vec<Package>> {
        let mut stmt = self.conn.prepare(
            "SELECT package, precedence FROM user_packages
             WHERE instance = ?1 AND user_id = ?2 ORDER BY seq",
        )?;

        let rows = stmt
            .query_map(params![instance, user.id().as_str()], |row| {
                let name: String = row.get(0)?;
                let precedence: i64 = row.get(1)?;
                Ok((name, precedence))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut packages = Vec::with_capacity(rows.len());
        for (name, precedence) in rows {
            if !self.registry.contains(&name) {
                tracing::warn!(instance, user_id = %user.id(), package = %name, "skipping unregistered package");
                continue;
            }
            packages.push(self.registry.build(&name)?.with_precedence(precedence));
        }
        Ok(packages)
    }

    fn has_package(&self, instance: &str, user: &dyn UserRepresentation, package: &Package) -> Result<bool> {
        let found = self.conn.query_row(
            "SELECT EXISTS (
                SELECT 1 FROM user_packages WHERE instance = ?1 AND user_id = ?2 AND package = ?3
             )",
            params![instance, user.id().as_str(), package.name()],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(found)
    }

    fn set_override(
        &self,
        instance: &str,
        user: &dyn UserRepresentation,
        permission: &str,
        value: bool,
    ) -> Result<bool> {
        self.conn.execute(
            "INSERT INTO user_overrides (instance, user_id, permission, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (instance, user_id, permission) DO UPDATE SET value = excluded.value",
            params![instance, user.id().as_str(), permission, value],
        )?;
        Ok(true)
    }

    fn remove_override(&self, instance: &str, user: &dyn UserRepresentation, permission: &str) -> Result<bool> {
        self.conn.execute(
            "DELETE FROM user_overrides WHERE instance = ?1 AND user_id = ?2 AND permission = ?3",
            params![instance, user.id().as_str(), permission],
        )?;
        Ok(true)
    }

    fn fetch_overrides(&self, instance: &str, user: &dyn UserRepresentation) -> Result<Overrides> {
        let mut stmt = self.conn.prepare(
            "SELECT permission, value FROM user_overrides WHERE instance = ?1 AND user_id = ?2",
        )?;

        let overrides = stmt
            .query_map(params![instance, user.id().as_str()], |row| {
                let permission: String = row.get(0)?;
                let value: bool = row.get(1)?;
                Ok((permission, value))
            })?
            .collect::<rusqlite::Result<Overrides>>()?;
        Ok(overrides)
    }

    fn reset_overrides(&self, instance: &str, user: &dyn UserRepresentation) -> Result<bool> {
        self.conn.execute(
            "DELETE FROM user_overrides WHERE instance = ?1 AND user_id = ?2",
            params![instance, user.id().as_str()],
        )?;
        Ok(true)
    }
}
