use policy::UserId;
use thiserror::Error;

use crate::ConfigError;

/// Authorization errors.
///
/// Absence is not an error here: removing a package nobody holds or checking
/// an unknown permission are ordinary outcomes. Errors are reserved for
/// malformed input, unknown identities and collaborator failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A user id did not resolve to a user.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// An override targeted a permission the user's packages do not define.
    #[error("unknown permission '{permission}' for user {user_id}")]
    UnknownPermission { permission: String, user_id: UserId },

    /// No authorization instance is registered under this name.
    #[error("unknown auth instance: {0}")]
    UnknownInstance(String),

    /// Password hashing failed, or a stored hash could not be parsed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    #[error(transparent)]
    Policy(#[from] policy::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
