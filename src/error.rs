//! Error types for opsgate.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Gates and the capability config store have no error channel; these variants
//! cover handler decoding, command execution, and the CLI surface.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for opsgate operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// Invalid arguments, unreadable files, or unknown registry names.
    #[error("{0}")]
    UserError(String),

    /// An operation descriptor named an operation the handler does not know.
    ///
    /// The message is part of the node contract and must stay byte-exact.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// The command executor could not run a command at all.
    #[error("{0}")]
    Execution(String),

    /// A workflow definition failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// JSON or YAML (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl OpsError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            OpsError::UserError(_) => exit_codes::USER_ERROR,
            OpsError::UnknownOperation(_) => exit_codes::USER_ERROR,
            OpsError::Serialization(_) => exit_codes::USER_ERROR,
            OpsError::Validation(_) => exit_codes::VALIDATION_FAILURE,
            OpsError::Execution(_) => exit_codes::NODE_FAILURE,
        }
    }
}

impl From<serde_json::Error> for OpsError {
    fn from(e: serde_json::Error) -> Self {
        OpsError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for OpsError {
    fn from(e: serde_yaml::Error) -> Self {
        OpsError::Serialization(e.to_string())
    }
}

/// Result type alias for opsgate operations.
pub type Result<T> = std::result::Result<T, OpsError>;
