use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::MinifierArg;
use crate::cli::validation::{PackageSpec, parse_package};

/// Available pkgsize subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Measure the bundled size of installed packages
    ///
    /// Bundles each package through a synthetic entry point and reports the
    /// raw, gzip and (optionally) parse-time cost of every emitted bundle.
    Measure(MeasureArgs),

    /// Print the JSON schema of pkgsize.config.json
    Schema,
}

/// Arguments for the measure command
#[derive(Args, Debug, Default)]
pub struct MeasureArgs {
    /// Packages to measure
    ///
    /// Each package must already be installed. Use NAME=DIR to measure a
    /// package installed somewhere other than --install-path.
    ///
    /// Examples:
    ///   pkgsize measure react
    ///   pkgsize measure lodash=/tmp/lodash dayjs=/tmp/dayjs
    #[arg(required = true, value_name = "PACKAGE", value_parser = parse_package)]
    pub packages: Vec<PackageSpec>,

    /// Directory containing node_modules with the installed packages
    ///
    /// Entry points are written into this directory.
    #[arg(short = 'i', long, value_name = "DIR")]
    pub install_path: Option<PathBuf>,

    /// Named export to import instead of the whole package (repeatable)
    #[arg(long = "import", value_name = "NAME")]
    pub imports: Vec<String>,

    /// Build one bundle per --import
    #[arg(long, requires = "imports")]
    pub split: bool,

    /// Minifier to apply
    #[arg(long, value_enum)]
    pub minifier: Option<MinifierArg>,

    /// Measure parse time of every bundle
    #[arg(long)]
    pub parse: bool,

    /// Report how many bytes each dependency contributes
    #[arg(long)]
    pub dependency_sizes: bool,

    /// Additional package to leave out of the bundle (repeatable)
    #[arg(short = 'e', long = "external", value_name = "NAME")]
    pub externals: Vec<String>,

    /// Bundle peer dependencies instead of leaving them external
    #[arg(long)]
    pub no_peers: bool,

    /// Print results as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Unminified build with compiler stats in the logs
    #[arg(long)]
    pub debug: bool,

    /// Maximum number of packages built at once
    #[arg(short = 'j', long, value_name = "N")]
    pub max_parallel: Option<usize>,

    /// Give up on the whole run after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Path to a config file (defaults to ./pkgsize.config.json)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
