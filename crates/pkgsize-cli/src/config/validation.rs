use crate::config::PkgsizeConfig;
use crate::error::{ConfigError, Result};
use pkgsize_build::is_valid_npm_name;

impl PkgsizeConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.split_custom_imports && self.custom_imports.is_empty() {
            return Err(ConfigError::MissingField {
                field: "customImports".to_string(),
                hint: "splitCustomImports needs at least one custom import to split".to_string(),
            }
            .into());
        }

        if self.max_parallel == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "maxParallel".to_string(),
                value: "0".to_string(),
                hint: "Use at least 1, or omit it to use the CPU count".to_string(),
            }
            .into());
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "timeoutSecs".to_string(),
                value: "0".to_string(),
                hint: "Use a positive number of seconds, or omit it for no deadline".to_string(),
            }
            .into());
        }

        if let Some(bad) = self.externals.iter().find(|e| !is_valid_npm_name(e)) {
            return Err(ConfigError::InvalidValue {
                field: "externals".to_string(),
                value: bad.clone(),
                hint: "Externals must be npm package names".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
