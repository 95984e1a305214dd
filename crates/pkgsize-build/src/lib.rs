#![cfg_attr(docsrs, feature(doc_cfg))]

//! # pkgsize-build
//!
//! Measures the bundled size of an installed npm package.
//!
//! A build synthesizes an entry module that imports the package (or a set of
//! its named exports), compiles it through a [`Compiler`], and reports the
//! raw size, gzip size and optional parse time of every emitted bundle.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pkgsize_build::{
//!     BuildContext, BuildPackageOptions, BuildRequest, Externals, RolldownCompiler,
//!     build_package_ignoring_missing_deps,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = BuildContext::new(RolldownCompiler::new());
//! let install_path = std::path::Path::new("/tmp/install/react");
//! let request = BuildRequest::new(
//!     "react",
//!     install_path,
//!     Externals::from_manifest("react", install_path),
//!     BuildPackageOptions::default().calc_parse(true),
//! );
//!
//! let result = build_package_ignoring_missing_deps(&ctx, &request).await?;
//! for asset in &result.assets {
//!     println!("{}.{}: {} bytes ({} gzip)", asset.name, asset.kind, asset.size, asset.gzip);
//! }
//! # Ok(()) }
//! ```
//!
//! ## Missing dependencies
//!
//! Packages regularly import modules they do not declare. When the compiler
//! reports such imports, [`build_package_ignoring_missing_deps`] marks them as
//! external and rebuilds once, reporting what it ignored in
//! [`BuildResult::ignored_missing_dependencies`].

pub mod batch;
pub mod compiler;
pub mod dependency_sizes;
pub mod diagnostics;
pub mod entry;
pub mod externals;
pub mod npm_name;
pub mod options;
pub mod orchestrator;
pub mod parse_time;
pub mod retry;
pub mod rolldown_compiler;
pub mod telemetry;

pub use batch::{PackageJob, build_packages_concurrent, default_max_parallel};
pub use compiler::{
    AssetInfo, CompileOutcome, CompileRequest, CompileStats, Compiler, CompilerError, EntryMap,
    MemoryOutputFs, MemoryStats, ModuleInfo, OutputFs, StatsJson, StatsJsonOptions,
};
pub use dependency_sizes::{DependencySize, DependencySizer, ModuleSizeBreakdown};
pub use diagnostics::parse_missing_modules;
pub use entry::{EntryOptions, create_entry_point};
pub use externals::Externals;
pub use npm_name::is_valid_npm_name;
pub use options::{BuildPackageOptions, BuildRequest, Minifier};
pub use orchestrator::{AssetStat, BuildContext, BuildResult, build_package};
pub use parse_time::{OxcParseTimer, ParseTime, ParseTimer};
pub use retry::{MAX_IGNORED_MISSING_DEPENDENCIES, build_package_ignoring_missing_deps};
pub use rolldown_compiler::RolldownCompiler;
pub use telemetry::{BuildTelemetryOptions, NoopTelemetry, Telemetry, TracingTelemetry};

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

/// Error types for package builds.
///
/// Only [`Error::MissingDependency`] is recoverable; every other kind is
/// terminal for the build that produced it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The synthetic entry point could not be written, or the compiler could
    /// not resolve the package it imports.
    #[error("Entry point error: {message}")]
    EntryPoint {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The compiler could not resolve imports made by the package.
    #[error("Missing dependencies: {}", .missing_modules.join(", "))]
    MissingDependency {
        missing_modules: Vec<String>,
        /// Raw compiler error strings.
        errors: Vec<String>,
    },

    /// The generated source contains syntax the compiler's parser rejects.
    #[error("Failed to build this package (unsupported syntax): {}", .errors.join("\n"))]
    CliBuild { errors: Vec<String> },

    /// Any other compiler failure.
    #[error("Build failed: {}", .errors.join("\n"))]
    Build { errors: Vec<String> },

    /// An internal invariant did not hold.
    #[error("Unexpected build error: {message}")]
    UnexpectedBuild {
        message: String,
        detail: Option<String>,
    },

    /// A compiler diagnostic no longer matches the patterns used to classify it.
    #[error("Could not classify compiler diagnostic: {message}")]
    ClassifierDrift { message: String, diagnostic: String },
}

/// Result type alias for package builds.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unexpected(message: impl Into<String>) -> Self {
        Error::UnexpectedBuild {
            message: message.into(),
            detail: None,
        }
    }

    pub(crate) fn unexpected_with(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::UnexpectedBuild {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    /// Missing modules carried by a [`Error::MissingDependency`].
    pub fn missing_modules(&self) -> Option<&[String]> {
        match self {
            Error::MissingDependency {
                missing_modules, ..
            } => Some(missing_modules),
            _ => None,
        }
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EntryPoint { .. } => "EntryPointError",
            Error::MissingDependency { .. } => "MissingDependencyError",
            Error::CliBuild { .. } => "CLIBuildError",
            Error::Build { .. } => "BuildError",
            Error::UnexpectedBuild { .. } => "UnexpectedBuildError",
            Error::ClassifierDrift { .. } => "ClassifierDriftError",
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::EntryPoint { .. } => "ENTRY_POINT_ERROR",
            Error::MissingDependency { .. } => "MISSING_DEPENDENCY",
            Error::CliBuild { .. } => "CLI_BUILD_ERROR",
            Error::Build { .. } => "BUILD_ERROR",
            Error::UnexpectedBuild { .. } => "UNEXPECTED_BUILD_ERROR",
            Error::ClassifierDrift { .. } => "CLASSIFIER_DRIFT",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::EntryPoint { .. } => Some(Box::new(
                "Check that the package is installed under the install path and that the path is writable.",
            )),
            Error::MissingDependency {
                missing_modules, ..
            } => Some(Box::new(format!(
                "The package imports modules that are not installed: {}.\nPass them as externals to measure the package without them.",
                missing_modules.join(", ")
            ))),
            Error::CliBuild { .. } => Some(Box::new(
                "The package ships syntax (such as a shebang) that cannot be bundled.",
            )),
            Error::UnexpectedBuild { detail, .. } => detail
                .as_ref()
                .map(|d| Box::new(d.clone()) as Box<dyn std::fmt::Display>),
            Error::ClassifierDrift { diagnostic, .. } => Some(Box::new(format!(
                "The compiler's message format changed and the classification patterns need updating.\nDiagnostic: {}",
                diagnostic
            ))),
            Error::Build { .. } => None,
        }
    }
}
