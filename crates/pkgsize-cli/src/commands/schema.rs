//! Schema command implementation.

use crate::config::PkgsizeConfig;
use crate::error::Result;

/// Print the JSON schema of `pkgsize.config.json` to stdout.
pub fn execute() -> Result<()> {
    let schema = serde_json::to_string_pretty(&PkgsizeConfig::json_schema())?;
    println!("{schema}");
    Ok(())
}
