//! Command implementations for the pkgsize CLI.
//!
//! - [`measure`] - Bundle packages and report their size
//! - [`schema`] - Print the config file JSON schema

pub mod measure;
pub mod schema;

pub use measure::execute as measure_execute;
pub use schema::execute as schema_execute;
