//! pkgsize CLI - measure the bundled size of npm packages.
//!
//! This crate is the command-line front end of [`pkgsize_build`]. It turns
//! flags, environment variables and `pkgsize.config.json` into build
//! requests, runs them, and prints size reports.
//!
//! - [`cli`] - Argument definitions
//! - [`commands`] - `measure` and `schema`
//! - [`config`] - Multi-source configuration
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Report formatting and status messages
//!
//! # Example
//!
//! ```rust
//! use pkgsize_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result};
