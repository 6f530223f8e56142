use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("username already taken: {0}")]
    DuplicateUser(String),

    #[error("package '{0}' is not registered and cannot be persisted")]
    UnregisteredPackage(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Policy(#[from] policy::Error),

    /// Failure reported by an external store implementation.
    #[error("backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, Error>;
