//! Status lines written to stderr.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Report a package that could not be measured.
///
/// ```no_run
/// use pkgsize_cli::ui::failure;
///
/// failure("foo", &"Missing dependencies: bar");
/// ```
pub fn failure(package: &str, error: &dyn Display) {
    eprintln!("{} {}", "✗".red().bold(), format!("{package}: {error}").red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_line() {
        failure("foo", &"Missing dependencies: bar");
    }
}
