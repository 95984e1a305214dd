//! Configuration for pkgsize with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment > File > Defaults

mod defaults;
mod loading;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use pkgsize_build::{BuildPackageOptions, Minifier};

pub use defaults::*;
pub use loading::CONFIG_FILE_NAME;

/// pkgsize configuration - loaded from pkgsize.config.json or CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PkgsizeConfig {
    /// Directory containing node_modules with the packages to measure
    #[serde(default = "default_install_path")]
    pub install_path: PathBuf,

    /// Extra packages to leave out of every bundle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub externals: Vec<String>,

    /// Leave each package's peer dependencies out of its bundle
    #[serde(default = "default_peers")]
    pub peers: bool,

    /// Named exports to import instead of the whole package
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_imports: Vec<String>,

    /// Build one bundle per custom import
    #[serde(default)]
    pub split_custom_imports: bool,

    /// Minifier applied to bundles (terser, esbuild)
    #[serde(default)]
    #[schemars(with = "String")]
    pub minifier: Minifier,

    /// Measure parse time of every bundle
    #[serde(default)]
    pub calc_parse: bool,

    /// Report how many bytes each dependency contributes
    #[serde(default)]
    pub include_dependency_sizes: bool,

    /// Unminified builds with compiler stats logged
    #[serde(default)]
    pub debug: bool,

    /// Maximum number of packages built at once (defaults to CPU count, max 8)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<usize>,

    /// Deadline for the whole run, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl PkgsizeConfig {
    /// Generate JSON Schema for pkgsize.config.json.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(PkgsizeConfig);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Build options for every package measured under this config.
    pub fn build_options(&self) -> BuildPackageOptions {
        BuildPackageOptions {
            split_custom_imports: self.split_custom_imports,
            custom_imports: (!self.custom_imports.is_empty()).then(|| self.custom_imports.clone()),
            minifier: self.minifier,
            debug: self.debug,
            calc_parse: self.calc_parse,
            include_dependency_sizes: self.include_dependency_sizes,
        }
    }
}

impl Default for PkgsizeConfig {
    fn default() -> Self {
        Self::default_config()
    }
}
