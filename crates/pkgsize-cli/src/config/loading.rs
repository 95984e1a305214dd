use crate::cli::MeasureArgs;
use crate::config::PkgsizeConfig;
use crate::config::defaults::*;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use pkgsize_build::Minifier;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "pkgsize.config.json";

const ENV_PREFIX: &str = "PKGSIZE_";

/// Settings given on the command line. Only flags that were actually passed
/// are serialized, so unset flags never mask file or environment values.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    install_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    externals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    peers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_imports: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    split_custom_imports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    minifier: Option<Minifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    calc_parse: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_dependency_sizes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_parallel: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

impl From<&MeasureArgs> for CliOverrides {
    fn from(args: &MeasureArgs) -> Self {
        let flag = |set: bool| set.then_some(true);
        let list = |items: &Vec<String>| (!items.is_empty()).then(|| items.clone());

        Self {
            install_path: args.install_path.clone(),
            externals: list(&args.externals),
            peers: args.no_peers.then_some(false),
            custom_imports: list(&args.imports),
            split_custom_imports: flag(args.split),
            minifier: args.minifier.map(Into::into),
            calc_parse: flag(args.parse),
            include_dependency_sizes: flag(args.dependency_sizes),
            debug: flag(args.debug),
            max_parallel: args.max_parallel,
            timeout_secs: args.timeout_secs,
        }
    }
}

/// `CALC_PARSE` style environment keys to `calcParse` field names.
pub(crate) fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            field.extend(c.to_uppercase());
            upper_next = false;
        } else {
            field.extend(c.to_lowercase());
        }
    }
    field
}

impl PkgsizeConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(args: &MeasureArgs, config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default_config()));

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                default_path.exists().then(|| default_path.to_path_buf())
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "Loading config file");
            figment = figment.merge(Json::file(path));
        }

        // PKGSIZE_CALC_PARSE, PKGSIZE_MAX_PARALLEL, ...
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .map(|key| env_key_to_field(key.as_str()).into())
                .lowercase(false),
        );

        figment = figment.merge(Serialized::defaults(CliOverrides::from(args)));

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", CONFIG_FILE_NAME),
            }
            .into()
        })
    }

    /// Get default configuration values.
    pub(crate) fn default_config() -> Self {
        Self {
            install_path: default_install_path(),
            externals: vec![],
            peers: default_peers(),
            custom_imports: vec![],
            split_custom_imports: false,
            minifier: Minifier::default(),
            calc_parse: false,
            include_dependency_sizes: false,
            debug: false,
            max_parallel: None,
            timeout_secs: None,
        }
    }
}
