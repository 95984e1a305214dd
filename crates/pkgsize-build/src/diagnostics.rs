//! Classification of compiler diagnostics.
//!
//! Compilers report failures as text. This module maps that text onto the
//! build error taxonomy: which errors are unresolvable imports, which
//! package each of them names, and which errors signal syntax the compiler
//! cannot parse. The patterns live in [`patterns`]; when a diagnostic of a
//! known class no longer matches them, classification fails with
//! [`Error::ClassifierDrift`] instead of guessing.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::compiler::CompilerError;
use crate::{Error, Result};

/// Diagnostic text patterns, versioned together.
pub mod patterns {
    /// Bumped whenever a pattern below changes.
    pub const VERSION: u32 = 1;

    /// Error class of an import the compiler could not resolve.
    pub const MODULE_NOT_FOUND: &str = "ModuleNotFoundError";

    /// Captures the unresolved request from a module-not-found message.
    pub const UNRESOLVED_REQUEST: &str = r"Can't resolve '(.+?)' in";

    /// Scope and name of a scoped package request (`@scope/name/...`).
    pub const SCOPED_PACKAGE: &str = r"@[^/]+/[^/]+";

    /// First segment of an unscoped package request (`name/...`).
    pub const UNSCOPED_PACKAGE: &str = r"[^/]+";

    /// Parser complaint about a `#` the compiler cannot handle (shebangs,
    /// private fields on old parsers).
    pub const UNSUPPORTED_SYNTAX: &str = "Unexpected character '#'";
}

static UNRESOLVED_REQUEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(patterns::UNRESOLVED_REQUEST).expect("valid pattern"));
static SCOPED_PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(patterns::SCOPED_PACKAGE).expect("valid pattern"));
static UNSCOPED_PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(patterns::UNSCOPED_PACKAGE).expect("valid pattern"));

/// Whether `error` reports an unresolvable import.
pub fn is_module_not_found(error: &CompilerError) -> bool {
    error.name == patterns::MODULE_NOT_FOUND
}

/// The request a module-not-found message could not resolve.
pub fn unresolved_request(message: &str) -> Result<&str> {
    UNRESOLVED_REQUEST_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::ClassifierDrift {
            message: "Expected to find a file path in the module not found error, but found none"
                .to_string(),
            diagnostic: message.to_string(),
        })
}

/// Package name of an import request.
///
/// `@babel/runtime/helpers/create` is `@babel/runtime`; `left-pad/index` is
/// `left-pad`.
pub fn package_name_from_request(request: &str) -> Result<&str> {
    let re: &Regex = if request.starts_with('@') {
        &SCOPED_PACKAGE_RE
    } else {
        &UNSCOPED_PACKAGE_RE
    };

    re.find(request)
        .map(|m| m.as_str())
        .ok_or_else(|| Error::ClassifierDrift {
            message: format!("Could not extract a package name from '{request}'"),
            diagnostic: request.to_string(),
        })
}

/// Distinct top-level packages named by module-not-found errors.
///
/// Errors of other classes are ignored. Names are deduplicated, and a name
/// that is a sub-path of another collected name (`x/sub` next to `x`) is
/// dropped. Output keeps first-seen order.
///
/// # Errors
///
/// Returns [`Error::ClassifierDrift`] when a module-not-found error does not
/// match the known message patterns.
pub fn parse_missing_modules(errors: &[CompilerError]) -> Result<Vec<String>> {
    let mut names: IndexSet<&str> = IndexSet::new();

    for error in errors.iter().filter(|e| is_module_not_found(e)) {
        let request = unresolved_request(&error.message)?;
        names.insert(package_name_from_request(request)?);
    }

    let top_level = names
        .iter()
        .filter(|name| {
            !names.iter().any(|other| {
                other != *name
                    && name
                        .strip_prefix(*other)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
        })
        .map(|name| name.to_string())
        .collect();

    Ok(top_level)
}

/// Whether a rendered compiler error reports syntax the compiler rejects.
pub fn is_unsupported_syntax(error_text: &str) -> bool {
    error_text.contains(patterns::UNSUPPORTED_SYNTAX)
}
