//! Package-based permission model.
//!
//! A [`Package`] bundles named [`Rule`]s under a precedence. A user's
//! effective permissions are the [`PermissionSet`] obtained by merging their
//! packages in ascending precedence and then applying per-user overrides.
//! Rules are either fixed booleans or predicates evaluated at check time.

mod error;
mod identity;
mod package;
mod permissions;
mod registry;
mod rule;

pub use error::{Error, Result};
pub use identity::{UserId, UserRepresentation};
pub use package::{Package, PackageBuilder, PackageDefinition, PackageKind};
pub use permissions::{Overrides, PermissionSet};
pub use registry::{PackageRef, PackageRegistry};
pub use rule::{IntoRule, Predicate, Rule, Verdict};
