use std::path::PathBuf;

use pkgsize_build::is_valid_npm_name;

/// A package named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    /// Install directory for this package; falls back to `--install-path`.
    pub install_path: Option<PathBuf>,
}

/// Parse `NAME` or `NAME=DIR`.
///
/// # Examples
///
/// Valid: react, @babel/runtime, lodash=/tmp/installs/lodash
/// Invalid: ./local, "", react=
///
/// # Errors
///
/// Returns an error message if the name is not a valid npm package name or
/// the directory is empty.
pub fn parse_package(s: &str) -> Result<PackageSpec, String> {
    let (name, dir) = match s.split_once('=') {
        Some((name, dir)) => (name, Some(dir)),
        None => (s, None),
    };

    if !is_valid_npm_name(name) {
        return Err(format!("'{}' is not a valid npm package name", name));
    }

    let install_path = match dir {
        Some("") => return Err(format!("Missing install directory after '{}='", name)),
        Some(dir) => Some(PathBuf::from(dir)),
        None => None,
    };

    Ok(PackageSpec {
        name: name.to_string(),
        install_path,
    })
}
