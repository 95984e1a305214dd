//! Measure command implementation.
//!
//! Implements `pkgsize measure`, which bundles installed packages through
//! [`pkgsize_build`] and reports the size of the result.

use crate::cli::{MeasureArgs, PackageSpec};
use crate::config::PkgsizeConfig;
use crate::error::{CliError, Result};
use crate::ui;
use pkgsize_build::externals::NODE_BUILT_INS;
use pkgsize_build::{
    BuildContext, BuildRequest, BuildResult, Externals, PackageJob, RolldownCompiler,
    TracingTelemetry, build_packages_concurrent,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome for one package in `--json` output.
#[derive(Debug, Serialize)]
pub struct MeasureReport {
    pub package: String,
    #[serde(flatten)]
    pub result: Option<BuildResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_modules: Option<Vec<String>>,
}

impl MeasureReport {
    fn new(package: String, outcome: &pkgsize_build::Result<BuildResult>) -> Self {
        match outcome {
            Ok(result) => Self {
                package,
                result: Some(result.clone()),
                error: None,
            },
            Err(e) => Self {
                package,
                result: None,
                error: Some(ErrorReport {
                    kind: e.kind(),
                    message: e.to_string(),
                    missing_modules: e.missing_modules().map(<[String]>::to_vec),
                }),
            },
        }
    }
}

/// Execute the measure command.
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Resolve install directories and externals per package
/// 3. Build all packages, retrying once without missing dependencies
/// 4. Print the reports
///
/// Fails with the package's own error when a single package was measured,
/// and with [`CliError::PartialFailure`] when some packages of a batch failed.
pub async fn execute(args: MeasureArgs) -> Result<()> {
    let config = PkgsizeConfig::load(&args, args.config.as_deref())?;
    config.validate()?;

    let jobs = args
        .packages
        .iter()
        .map(|spec| package_job(spec, &config))
        .collect::<Result<Vec<_>>>()?;

    let max_parallel = effective_parallelism(&jobs, config.max_parallel);
    let ctx = BuildContext::new(RolldownCompiler::new()).with_telemetry(TracingTelemetry);

    tracing::debug!(
        packages = jobs.len(),
        max_parallel = ?max_parallel,
        "Starting measurement"
    );

    let run = build_packages_concurrent(&ctx, jobs, max_parallel);
    let outcomes = match config.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), run)
            .await
            .map_err(|_| CliError::Timeout(secs))?,
        None => run.await,
    };

    if args.json {
        let reports: Vec<MeasureReport> = outcomes
            .iter()
            .map(|(name, outcome)| MeasureReport::new(name.clone(), outcome))
            .collect();
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (name, outcome) in &outcomes {
            match outcome {
                Ok(result) => ui::print_size_report(name, result),
                Err(e) => ui::failure(name, e),
            }
        }
    }

    summarize(outcomes)
}

/// Turn per-package outcomes into the command result.
fn summarize(outcomes: Vec<(String, pkgsize_build::Result<BuildResult>)>) -> Result<()> {
    let total = outcomes.len();
    let mut failures: Vec<pkgsize_build::Error> = outcomes
        .into_iter()
        .filter_map(|(_, outcome)| outcome.err())
        .collect();

    match failures.len() {
        0 => Ok(()),
        1 if total == 1 => Err(failures.remove(0).into()),
        failed => Err(CliError::PartialFailure { failed, total }),
    }
}

fn package_job(spec: &PackageSpec, config: &PkgsizeConfig) -> Result<PackageJob> {
    let install_path = absolute_install_path(
        spec.install_path.as_deref().unwrap_or(&config.install_path),
    )?;

    if !install_path.is_dir() {
        return Err(CliError::FileNotFound(install_path));
    }

    let externals = if config.peers {
        Externals::from_manifest(&spec.name, &install_path)
    } else {
        Externals {
            external_packages: Vec::new(),
            external_built_ins: NODE_BUILT_INS.iter().map(|s| s.to_string()).collect(),
        }
    }
    .with_packages(config.externals.iter().cloned());

    Ok(PackageJob::new(BuildRequest::new(
        spec.name.clone(),
        install_path,
        externals,
        config.build_options(),
    )))
}

fn absolute_install_path(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

/// Packages sharing an install directory also share entry file names, so
/// they are measured one at a time.
fn effective_parallelism(jobs: &[PackageJob], configured: Option<usize>) -> Option<usize> {
    let mut dirs: Vec<&Path> = jobs.iter().map(|j| j.request.install_path()).collect();
    dirs.sort();
    dirs.dedup();

    if dirs.len() < jobs.len() {
        if configured.is_some_and(|n| n > 1) {
            tracing::info!("Packages share an install directory; measuring one at a time");
        }
        Some(1)
    } else {
        configured
    }
}
