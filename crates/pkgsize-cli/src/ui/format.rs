//! Formatting utilities for sizes, parse times and size reports.

use console::style;
use pkgsize_build::{BuildResult, ParseTime};
use std::fmt::Write as _;

/// Format file size in human-readable format.
///
/// ```
/// use pkgsize_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Parse time of a bundle, net of the baseline script.
pub fn format_parse_time(parse: &ParseTime) -> String {
    let net = (parse.script_parse_time - parse.base_parse_time).max(0.0);
    format!("{:.2}ms", net)
}

/// Render the report for one package as plain lines.
pub fn render_size_report(package: &str, result: &BuildResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(package).bold().underlined());

    for asset in &result.assets {
        let _ = write!(
            out,
            "  {} {}.{}  {}  {} gzip",
            style("▸").blue(),
            style(&asset.name).bold(),
            asset.kind,
            format_size(asset.size),
            format_size(asset.gzip),
        );
        if let Some(parse) = &asset.parse {
            let _ = write!(out, "  {} parse", format_parse_time(parse));
        }
        out.push('\n');
    }

    if result.assets.len() > 1 {
        let _ = writeln!(
            out,
            "  {} {}  {} gzip",
            style("Total:").bold(),
            style(format_size(result.total_size())).green(),
            style(format_size(result.total_gzip())).green(),
        );
    }

    if let Some(ignored) = &result.ignored_missing_dependencies {
        let _ = writeln!(
            out,
            "  {} {}",
            style("Externalized missing dependencies:").yellow(),
            ignored.join(", ")
        );
    }

    if let Some(sizes) = &result.dependency_sizes {
        let _ = writeln!(out, "  {}", style("Dependencies:").bold());
        for dep in sizes {
            let _ = writeln!(
                out,
                "    {} {}",
                dep.name,
                style(format_size(dep.approximate_size)).dim()
            );
        }
    }

    out
}

/// Print the report for one package to stdout.
pub fn print_size_report(package: &str, result: &BuildResult) {
    print!("{}", render_size_report(package, result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgsize_build::{AssetStat, DependencySize};

    fn asset(name: &str, size: u64, gzip: u64) -> AssetStat {
        AssetStat {
            name: name.to_string(),
            kind: "js".to_string(),
            size,
            gzip,
            parse: None,
        }
    }

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_kilobytes() {
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(10_240), "10.00 KB");
    }

    #[test]
    fn test_format_size_gigabytes() {
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_parse_time_subtracts_baseline() {
        let parse = ParseTime {
            base_parse_time: 0.25,
            script_parse_time: 1.5,
        };
        assert_eq!(format_parse_time(&parse), "1.25ms");

        let faster = ParseTime {
            base_parse_time: 2.0,
            script_parse_time: 1.0,
        };
        assert_eq!(format_parse_time(&faster), "0.00ms");
    }

    #[test]
    fn test_render_single_asset() {
        console::set_colors_enabled(false);
        let result = BuildResult {
            assets: vec![asset("main", 2048, 700)],
            ..Default::default()
        };

        let report = render_size_report("react", &result);
        assert!(report.starts_with("react\n"));
        assert!(report.contains("main.js  2.00 KB  700 B gzip"));
        assert!(!report.contains("Total:"));
    }

    #[test]
    fn test_render_split_totals_and_extras() {
        console::set_colors_enabled(false);
        let result = BuildResult {
            ignored_missing_dependencies: Some(vec!["bar".to_string()]),
            assets: vec![asset("get", 100, 80), asset("set", 200, 120)],
            dependency_sizes: Some(vec![DependencySize {
                name: "lodash".to_string(),
                approximate_size: 300,
            }]),
        };

        let report = render_size_report("lodash", &result);
        assert!(report.contains("Total: 300 B  200 B gzip"));
        assert!(report.contains("Externalized missing dependencies: bar"));
        assert!(report.contains("lodash 300 B"));
    }

    #[test]
    fn test_render_mentions_ignored_dependencies_once() {
        console::set_colors_enabled(false);
        let result = BuildResult {
            ignored_missing_dependencies: Some(vec!["bar".to_string(), "baz".to_string()]),
            assets: vec![asset("main", 100, 80)],
            dependency_sizes: None,
        };

        let report = render_size_report("foo", &result);
        assert_eq!(report.matches("bar").count(), 1);
        assert!(report.contains("Externalized missing dependencies: bar, baz"));
    }
}
