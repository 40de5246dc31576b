//! Unified error types for the portreap workspace.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PortreapError {
    /// An external program could not be spawned or waited on.
    #[error("failed to run {program}: {source}")]
    Command {
        /// Name of the program.
        program: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// The process lacks a required privilege.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Description of the denied operation.
        message: String,
    },

    /// The host platform lacks a required capability.
    #[error("unsupported platform: {message}")]
    Unsupported {
        /// Description of the missing capability.
        message: String,
    },

    /// The connection snapshot could not be obtained.
    #[error("snapshot unavailable: {message}")]
    Snapshot {
        /// Description of the failure, including provider diagnostics.
        message: String,
    },

    /// A termination attempt failed or could not be issued.
    #[error("termination of {target} failed: {message}")]
    Termination {
        /// Rendered endpoint pair that was targeted.
        target: String,
        /// Description of the failure, including actuator diagnostics.
        message: String,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PortreapError>;
