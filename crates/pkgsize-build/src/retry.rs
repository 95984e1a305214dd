//! Rebuilding with unresolvable imports externalized.

use std::time::Instant;

use tracing::{info, warn};

use crate::npm_name::is_valid_npm_name;
use crate::options::BuildRequest;
use crate::orchestrator::{BuildContext, BuildResult, build_package};
use crate::telemetry::BuildTelemetryOptions;
use crate::{Error, Result};

/// Most missing packages a build may ignore before giving up.
pub const MAX_IGNORED_MISSING_DEPENDENCIES: usize = 6;

/// Missing modules that qualify `error` for a rebuild.
fn retryable_missing_modules(error: &Error) -> Option<&[String]> {
    let missing = error.missing_modules()?;
    let eligible = missing.len() <= MAX_IGNORED_MISSING_DEPENDENCIES
        && missing.iter().all(|name| is_valid_npm_name(name));
    eligible.then_some(missing)
}

/// Build `request`, externalizing missing dependencies once if needed.
///
/// When the first attempt fails with [`Error::MissingDependency`] naming at
/// most [`MAX_IGNORED_MISSING_DEPENDENCIES`] valid package names, those
/// packages are added to the externals and the build runs a second and last
/// time. The returned result then lists them in
/// [`BuildResult::ignored_missing_dependencies`].
///
/// Any other failure, and any failure of the rebuild, is returned unchanged.
pub async fn build_package_ignoring_missing_deps(
    ctx: &BuildContext,
    request: &BuildRequest,
) -> Result<BuildResult> {
    let start = Instant::now();
    let mut telemetry_options = BuildTelemetryOptions {
        options: request.options.clone(),
        build_iteration: 1,
        missing_modules: None,
    };

    let error = match build_package(ctx, request).await {
        Ok(result) => {
            ctx.telemetry.build_package(
                &request.name,
                true,
                start.elapsed(),
                &telemetry_options,
                None,
            );
            return Ok(result);
        }
        Err(e) => e,
    };

    telemetry_options.build_iteration = 2;

    let Some(missing) = retryable_missing_modules(&error) else {
        ctx.telemetry.build_package(
            &request.name,
            false,
            start.elapsed(),
            &telemetry_options,
            Some(&error),
        );
        return Err(error);
    };
    let missing = missing.to_vec();

    info!(
        package = %request.name,
        missing = ?missing,
        "Rebuilding with missing dependencies marked external"
    );

    let widened = request.with_externals(request.externals.with_packages(missing.iter().cloned()));
    telemetry_options.missing_modules = Some(missing.clone());

    match build_package(ctx, &widened).await {
        Ok(mut result) => {
            ctx.telemetry.build_package(
                &request.name,
                true,
                start.elapsed(),
                &telemetry_options,
                None,
            );
            result.ignored_missing_dependencies = Some(missing);
            Ok(result)
        }
        Err(e) => {
            warn!(package = %request.name, error = %e, "Rebuild failed");
            ctx.telemetry.build_package(
                &request.name,
                false,
                start.elapsed(),
                &telemetry_options,
                Some(&e),
            );
            Err(e)
        }
    }
}
