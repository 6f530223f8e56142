//! User records.

use chrono::{DateTime, Utc};
use policy::{UserId, UserRepresentation};
use serde::{Deserialize, Serialize};

/// What a credential lookup returns: enough to verify a password and open a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
}

/// A user as persisted by [`SqliteRecordStore`](crate::SqliteRecordStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: UserId,
    pub username: String,
    /// Free-form application data; never read by authorization.
    pub profile: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn new(username: impl Into<String>, profile: serde_json::Value) -> Self {
        Self {
            id: UserId::generate(),
            username: username.into(),
            profile,
            created_at: Utc::now(),
        }
    }
}

impl UserRepresentation for StoredUser {
    fn id(&self) -> &UserId {
        &self.id
    }
}
