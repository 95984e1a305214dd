//! Synthetic entry points.
//!
//! An entry point is a tiny module that imports the package under
//! measurement and uses every binding it imports, so the compiler cannot
//! drop any of them as dead code.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Default file name for a generated entry point.
pub const DEFAULT_ENTRY_FILENAME: &str = "index.js";

/// How to write an entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// Use `import` syntax instead of `require`.
    pub esm: bool,
    /// Named exports to import. `None` or empty imports the whole package.
    pub custom_imports: Option<Vec<String>>,
    /// File name relative to the install directory.
    pub entry_filename: Option<String>,
}

/// Source text of an entry point for `package_name`.
pub fn entry_source(package_name: &str, options: &EntryOptions) -> String {
    let imports = options
        .custom_imports
        .as_deref()
        .filter(|imports| !imports.is_empty());

    match (options.esm, imports) {
        (true, Some(imports)) => {
            let names = imports.join(", ");
            format!("import {{ {names} }} from '{package_name}';\nconsole.log({names});\n")
        }
        (true, None) => format!("import * as p from '{package_name}';\nconsole.log(p);\n"),
        (false, Some(imports)) => {
            let names = imports.join(", ");
            format!("const {{ {names} }} = require('{package_name}');\nconsole.log({names});\n")
        }
        (false, None) => format!("const p = require('{package_name}');\nconsole.log(p);\n"),
    }
}

/// Write an entry point for `package_name` into `install_dir`.
///
/// Returns the path of the written file.
///
/// # Errors
///
/// Returns [`Error::EntryPoint`] when the file cannot be written.
pub fn create_entry_point(
    package_name: &str,
    install_dir: &Path,
    options: &EntryOptions,
) -> Result<PathBuf> {
    let filename = options
        .entry_filename
        .as_deref()
        .unwrap_or(DEFAULT_ENTRY_FILENAME);
    let entry_path = install_dir.join(filename);
    let source = entry_source(package_name, options);

    std::fs::write(&entry_path, source).map_err(|e| Error::EntryPoint {
        message: format!("Failed to write entry point {}", entry_path.display()),
        source: Some(e),
    })?;

    debug!(package = package_name, path = %entry_path.display(), "Wrote entry point");
    Ok(entry_path)
}
