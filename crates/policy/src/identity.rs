//! User identity types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque identifier for a user, usable as a cache and storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

/// Minimal capability every user representation must provide.
///
/// Authorization never inspects anything beyond the id; all other user data
/// belongs to whichever record store produced the representation.
pub trait UserRepresentation {
    fn id(&self) -> &UserId;
}

impl UserRepresentation for UserId {
    fn id(&self) -> &UserId {
        self
    }
}

impl<T: UserRepresentation + ?Sized> UserRepresentation for &T {
    fn id(&self) -> &UserId {
        (**self).id()
    }
}
