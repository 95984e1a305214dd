//! Terminal output for measurement results.
//!
//! Everything here writes to stderr except [`print_size_report`], which
//! writes the human-readable report to stdout.
//!
//! ```no_run
//! use pkgsize_cli::ui;
//!
//! ui::init_colors(false);
//! ui::failure("foo", &"Missing dependencies: bar");
//! ```

mod format;
mod messages;

pub use format::{format_parse_time, format_size, print_size_report, render_size_report};
pub use messages::failure;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` beats `FORCE_COLOR`; otherwise colors follow whether stderr is
/// a terminal.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr() && !is_ci()
}

/// Apply the color decision globally. `--no-color` always disables colors.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}
