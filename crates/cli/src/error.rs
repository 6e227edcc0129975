//! CLI error types.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The audit database does not exist.
    ///
    /// This typically means auditing is disabled or no route check has run.
    #[error("audit database not found at {path}. Enable [audit] and run 'warden route' first")]
    AuditNotFound { path: PathBuf },

    /// No configured user has the given id.
    #[error("no user with id {id} in config")]
    UnknownUser { id: u64 },

    /// Configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred in the console adapter.
    #[error(transparent)]
    Console(#[from] console::Error),

    /// An error occurred in the storage layer.
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
