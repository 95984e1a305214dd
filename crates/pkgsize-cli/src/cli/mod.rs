//! Command-line interface definition for pkgsize.
//!
//! # Command Structure
//!
//! - `pkgsize measure` - Bundle installed packages and report their size
//! - `pkgsize schema` - Print the config file JSON schema

mod commands;
pub mod enums;
mod validation;

use clap::Parser;

pub use commands::{Command, MeasureArgs};
pub use enums::*;
pub use validation::{PackageSpec, parse_package};

/// pkgsize - how much does an npm package cost to ship?
#[derive(Parser, Debug)]
#[command(
    name = "pkgsize",
    version,
    about = "Measure the bundled size of npm packages",
    long_about = "pkgsize bundles installed npm packages with Rolldown and reports the\n\
                  minified size, gzip size and optional parse time of the result.\n\
                  Imports the package cannot resolve are externalized and measured without."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
