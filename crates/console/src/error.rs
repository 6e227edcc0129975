//! Console adapter error types.

use thiserror::Error;

/// Adapter errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A console path carried an id that is not a number.
    #[error("invalid route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },

    /// A check was requested with no capability bits, which would pass
    /// vacuously.
    #[error("capability check requires at least one capability")]
    EmptyRequirement,

    /// A membership or grant references a role that does not resolve.
    #[error("unknown role '{slug}' in project {project_id}")]
    UnknownRole { slug: String, project_id: u64 },

    /// A template grant names a built-in role. Grants only apply to
    /// custom roles.
    #[error("template grant for built-in role '{slug}' in project {project_id}")]
    BuiltinGrant { slug: String, project_id: u64 },

    #[error(transparent)]
    Policy(#[from] policy::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
