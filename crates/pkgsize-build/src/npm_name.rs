//! npm package name validation.
//!
//! Follows the registry rules that apply to every published package. Newer
//! restrictions (no capitals, 214 character limit, no core module names) are
//! not enforced since older packages predate them.

/// Names the registry refuses outright.
const BLACKLISTED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Characters `encodeURIComponent` leaves untouched.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(is_url_safe)
}

/// Whether `name` is a syntactically valid npm package name.
///
/// # Examples
///
/// ```
/// use pkgsize_build::is_valid_npm_name;
///
/// assert!(is_valid_npm_name("left-pad"));
/// assert!(is_valid_npm_name("@babel/runtime"));
/// assert!(!is_valid_npm_name("./local"));
/// ```
pub fn is_valid_npm_name(name: &str) -> bool {
    if name.is_empty() || name.trim() != name {
        return false;
    }

    if name.starts_with('.') || name.starts_with('_') {
        return false;
    }

    if BLACKLISTED_NAMES.contains(&name.to_lowercase().as_str()) {
        return false;
    }

    match name.strip_prefix('@') {
        Some(scoped) => match scoped.split_once('/') {
            Some((scope, pkg)) => {
                is_valid_segment(scope)
                    && is_valid_segment(pkg)
                    && !pkg.starts_with('.')
                    && !pkg.starts_with('_')
            }
            None => false,
        },
        None => is_valid_segment(name),
    }
}
