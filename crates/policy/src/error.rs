//! Policy error types.

use thiserror::Error;

/// Policy errors.
///
/// The evaluator itself never fails; these cover role definitions and
/// parsing of capability names, masks and catalog files.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A role definition failed validation.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// A capability name is not part of the capability domain.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// The role catalog is inconsistent.
    #[error("invalid policy: {0}")]
    Invalid(String),

    /// Failed to parse a mask or catalog file.
    #[error("failed to parse policy: {0}")]
    Parse(String),

    /// An I/O error occurred while reading a catalog.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
