//! Logging setup for the pkgsize CLI.
//!
//! Logs go to stderr so `--json` output on stdout stays machine readable.
//!
//! The filter is picked in this order:
//! 1. `--verbose`: debug for the pkgsize crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for the pkgsize crates
//!
//! ```rust,no_run
//! use pkgsize_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Measuring react");
//! ```

use pkgsize_build::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// `level` for both pkgsize crates.
fn crate_directives(level: LogLevel) -> String {
    format!("pkgsize_build={level},pkgsize_cli={level}")
}

/// Filter directives for the given flags. `None` defers to `RUST_LOG`.
fn filter_directives(verbose: bool, quiet: bool) -> Option<String> {
    if verbose {
        Some(crate_directives(LogLevel::Debug))
    } else if quiet {
        Some(LogLevel::Error.to_string())
    } else {
        None
    }
}

/// Initialize the tracing subscriber. Later calls are no-ops.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = match filter_directives(verbose, quiet) {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(crate_directives(LogLevel::Info))),
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
