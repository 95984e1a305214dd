//! Error handling for the pkgsize CLI.
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Domain-specific errors** (`ConfigError`) carry an actionable hint
//! - Package build failures keep their [`pkgsize_build::Error`] so the
//!   diagnostic code and help text survive to the terminal
//!
//! # Example
//!
//! ```rust,no_run
//! use pkgsize_cli::error::{CliError, Result};
//! use std::path::Path;
//!
//! fn install_dir(path: &Path) -> Result<&Path> {
//!     if !path.is_dir() {
//!         return Err(CliError::FileNotFound(path.to_path_buf()));
//!     }
//!     Ok(path)
//! }
//! ```

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A package could not be measured
    #[error(transparent)]
    Build(#[from] pkgsize_build::Error),

    /// Some packages of a batch could not be measured
    #[error("{failed} of {total} packages could not be measured")]
    PartialFailure {
        /// Number of failed packages
        failed: usize,
        /// Number of packages in the batch
        total: usize,
    },

    /// The run did not finish before the deadline
    #[error("Measurement timed out after {0}s\n\nHint: Raise --timeout-secs or measure fewer packages at once")]
    Timeout(u64),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the given location
    #[error("Config file not found: {}\n\nHint: Create a pkgsize.config.json file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
