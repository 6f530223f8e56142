//! Storage collaborators for the authorization context.
//!
//! Authorization itself holds no durable state. Everything that must survive
//! a request lives behind two traits defined here:
//!
//! - [`SessionStore`]: the per-instance login token (which user is signed in).
//! - [`RecordStore`]: users, package assignments and permission overrides.
//!
//! # Implementations
//!
//! - [`MemorySessionStore`] keeps tokens in a process-local map.
//! - [`SqliteRecordStore`] persists records to SQLite. Packages are stored by
//!   name and precedence and rebuilt through a [`policy::PackageRegistry`]
//!   when fetched, so only registered package kinds can be assigned.
//!
//! Every call takes the name of the authorization instance making it, so a
//! single store can back several independently named instances.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use policy::PackageRegistry;
//! use storage::{RecordStore, SqliteRecordStore};
//!
//! let mut registry = PackageRegistry::new();
//! registry.register_toml("name = \"member\"\n[rules]\nlogin = true\n")?;
//! let registry = Arc::new(registry);
//!
//! let store = SqliteRecordStore::open("records.db", registry.clone())?;
//! let user = store.create_user("default", "alex", "<argon2 hash>", serde_json::json!({}))?;
//!
//! store.add_package("default", &user, &registry.build("member")?)?;
//! for package in store.fetch_packages("default", &user)? {
//!     println!("{} (precedence {})", package.name(), package.precedence());
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod delegate;
mod error;
mod session;
mod store;
mod user;

pub use delegate::{RecordStore, SessionStore};
pub use error::{Error, Result};
pub use session::MemorySessionStore;
pub use store::SqliteRecordStore;
pub use user::{Credentials, StoredUser};
