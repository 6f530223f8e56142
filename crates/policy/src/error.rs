//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A rule was registered with a value that is neither a boolean nor a predicate.
    #[error("value for permission '{name}' is neither boolean nor predicate")]
    InvalidRuleValue { name: String },

    /// A package name did not resolve to any registered package kind.
    #[error("package not found: {0}")]
    PackageNotFound(String),

    /// A registry entry produced a package of a different kind than requested.
    #[error("package '{requested}' resolved to a package named '{actual}'")]
    PackageBadLineage { requested: String, actual: String },

    /// A package kind was registered twice under the same name.
    #[error("package already registered: {0}")]
    DuplicatePackage(String),

    /// Failed to parse a package definition.
    #[error("failed to parse package definition: {0}")]
    Parse(String),

    /// An I/O error occurred while reading a package definition.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
