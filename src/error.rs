//! Error types for pwsearch
//!
//! Two families of failure are kept apart so callers can render them differently
//! from a plain "not found":
//! - [`Error::Config`] is raised before a session starts and means nothing was searched
//! - [`OracleError`] means the verification collaborator could not answer, which aborts
//!   the running session
//!
//! Exhaustion and cancellation are normal outcomes and are not errors at all; see
//! [`StageResult`](crate::types::StageResult).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pwsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pwsearch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "numeric.max_length")
        key: Option<String>,
    },

    /// The password oracle failed for a reason other than a wrong password
    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build a configuration error for the given key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Process exit code a front-end should use for this error
    ///
    /// Configuration problems (including unreadable config files) map to 4,
    /// oracle failures to 3. Successful outcomes use the codes from
    /// [`SessionResult::exit_code`](crate::types::SessionResult::exit_code).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Oracle(_) => 3,
            Error::Config { .. } | Error::Serialization(_) => 4,
        }
    }
}

/// Failures reported by a [`PasswordOracle`](crate::oracle::PasswordOracle)
///
/// A wrong password is never an `OracleError`; these variants are reserved for
/// conditions where the oracle cannot tell whether the candidate was correct.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The target archive could not be opened or read from disk
    #[error("failed to open {archive}: {reason}")]
    OpenFailed {
        /// The archive that could not be opened
        archive: PathBuf,
        /// The underlying I/O failure
        reason: String,
    },

    /// The target is not a readable archive (corrupt or unsupported format)
    #[error("malformed archive {archive}: {reason}")]
    Malformed {
        /// The archive that failed to parse
        archive: PathBuf,
        /// The reason parsing failed
        reason: String,
    },

    /// An entry inside the archive could not be read
    #[error("unreadable entry {index} in {archive}: {reason}")]
    UnreadableEntry {
        /// The archive containing the entry
        archive: PathBuf,
        /// Index of the entry within the archive
        index: usize,
        /// The reason the entry could not be read
        reason: String,
    },

    /// The blocking verification task did not complete
    #[error("verification task failed for {archive}: {reason}")]
    TaskFailed {
        /// The archive being verified
        archive: PathBuf,
        /// The join error reported by the runtime
        reason: String,
    },
}
