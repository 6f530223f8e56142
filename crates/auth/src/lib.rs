//! Role-and-permission authorization.
//!
//! An [`Auth`] instance answers "may this user do X?" by resolving the
//! permission packages a user holds into a single [`policy::PermissionSet`],
//! applying per-user overrides, and evaluating the result.
//!
//! # Overview
//!
//! - **Packages** bundle named rules. A rule is either a fixed boolean or a
//!   predicate over the user and call arguments. Packages with a higher
//!   precedence overwrite rules from lower ones.
//! - **Overrides** pin a permission the user already has to a fixed value.
//! - **Sessions** record which user is signed in to an instance, so
//!   [`Auth::can`] can check the current user.
//!
//! Durable state lives in the [`storage::SessionStore`] and
//! [`storage::RecordStore`] collaborators. Resolved permissions are cached
//! per user and rebuilt only by mutations made through the instance.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use auth::{Auth, AuthConfig};
//! use policy::PackageRegistry;
//! use storage::{MemorySessionStore, SqliteRecordStore};
//!
//! # fn example() -> auth::Result<()> {
//! let mut packages = PackageRegistry::new();
//! packages.register_toml("name = \"member\"\n[rules]\nview_profile = true\n")?;
//! let packages = Arc::new(packages);
//!
//! let records = SqliteRecordStore::in_memory(packages.clone())?;
//! let mut auth = Auth::new(
//!     "default",
//!     MemorySessionStore::new(),
//!     records,
//!     packages,
//!     AuthConfig::default(),
//! );
//!
//! let hash = auth.hash_password("secret")?;
//! let user = auth.records().create_user("default", "alex", &hash, serde_json::json!({}))?;
//! auth.add_package_to_user(&user, "member")?;
//!
//! if auth.login("alex", "secret")? {
//!     assert!(auth.can("view_profile", &[]).is_allowed());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod context;
mod error;
mod instances;
pub mod password;

pub use config::{AuthConfig, ConfigError, DEFAULT_COST};
pub use context::{Auth, LoginTarget};
pub use error::{Error, Result};
pub use instances::{AuthRegistry, DEFAULT_INSTANCE};
