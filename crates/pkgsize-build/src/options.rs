//! Build request and option types.
//!
//! Options are resolved to concrete values once, when the request is built;
//! nothing downstream re-applies defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::externals::Externals;

/// Minifier applied to the emitted bundles.
///
/// Both values are accepted for compatibility with existing size reports;
/// the Rolldown compiler minifies with oxc either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Minifier {
    #[default]
    Terser,
    Esbuild,
}

impl std::str::FromStr for Minifier {
    type Err = String;

    /// Parse a minifier name, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use pkgsize_build::Minifier;
    ///
    /// assert_eq!("terser".parse::<Minifier>().unwrap(), Minifier::Terser);
    /// assert_eq!("ESBUILD".parse::<Minifier>().unwrap(), Minifier::Esbuild);
    /// ```
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terser" => Ok(Self::Terser),
            "esbuild" => Ok(Self::Esbuild),
            other => Err(format!(
                "Invalid minifier: '{}'. Expected: terser, esbuild",
                other
            )),
        }
    }
}

impl std::fmt::Display for Minifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terser => write!(f, "terser"),
            Self::Esbuild => write!(f, "esbuild"),
        }
    }
}

/// Options recognised by a package build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildPackageOptions {
    /// Build one entry (and one bundle) per custom import.
    pub split_custom_imports: bool,
    /// Named exports to import instead of the whole package.
    pub custom_imports: Option<Vec<String>>,
    pub minifier: Minifier,
    /// Ask the compiler for a debug build.
    pub debug: bool,
    /// Measure parse time of every bundle.
    pub calc_parse: bool,
    /// Attach a per-dependency size breakdown to the result.
    pub include_dependency_sizes: bool,
}

impl BuildPackageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn split_custom_imports(mut self, split: bool) -> Self {
        self.split_custom_imports = split;
        self
    }

    pub fn custom_imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_imports = Some(imports.into_iter().map(Into::into).collect());
        self
    }

    pub fn minifier(mut self, minifier: Minifier) -> Self {
        self.minifier = minifier;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn calc_parse(mut self, calc_parse: bool) -> Self {
        self.calc_parse = calc_parse;
        self
    }

    pub fn include_dependency_sizes(mut self, include: bool) -> Self {
        self.include_dependency_sizes = include;
        self
    }

    /// Custom imports, treating an empty list the same as none.
    pub fn custom_imports_list(&self) -> Option<&[String]> {
        self.custom_imports
            .as_deref()
            .filter(|imports| !imports.is_empty())
    }
}

/// A single package build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub name: String,
    /// Directory containing the installed package (its `node_modules`).
    pub install_path: PathBuf,
    pub externals: Externals,
    pub options: BuildPackageOptions,
}

impl BuildRequest {
    pub fn new(
        name: impl Into<String>,
        install_path: impl Into<PathBuf>,
        externals: Externals,
        options: BuildPackageOptions,
    ) -> Self {
        Self {
            name: name.into(),
            install_path: install_path.into(),
            externals,
            options,
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    /// Copy of this request with a different externals specification.
    pub fn with_externals(&self, externals: Externals) -> Self {
        Self {
            externals,
            ..self.clone()
        }
    }
}
