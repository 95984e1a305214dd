//! Build telemetry.
//!
//! Telemetry is fire-and-forget: recorders return nothing and must not
//! block, so a broken sink can never fail a build.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::Error;
use crate::options::BuildPackageOptions;

/// Options recorded with a build attempt.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildTelemetryOptions {
    #[serde(flatten)]
    pub options: BuildPackageOptions,
    pub build_iteration: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_modules: Option<Vec<String>>,
}

/// Recorder for build events.
///
/// Every method defaults to doing nothing.
pub trait Telemetry: Send + Sync {
    /// One compiler invocation finished.
    fn compile_package(
        &self,
        _name: &str,
        _success: bool,
        _duration: Duration,
        _options: &BuildPackageOptions,
        _error: Option<&Error>,
    ) {
    }

    /// Stats summary extraction finished.
    fn parse_stats(&self, _name: &str, _success: bool, _duration: Duration) {}

    /// Gzip and parse-time measurement of all assets finished.
    fn assets_gzip_parse_time(&self, _name: &str, _duration: Duration) {}

    /// A whole build (including any retry) finished.
    fn build_package(
        &self,
        _name: &str,
        _success: bool,
        _duration: Duration,
        _options: &BuildTelemetryOptions,
        _error: Option<&Error>,
    ) {
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {}

/// Emits every event as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn compile_package(
        &self,
        name: &str,
        success: bool,
        duration: Duration,
        options: &BuildPackageOptions,
        error: Option<&Error>,
    ) {
        match error {
            None => info!(
                package = name,
                success,
                duration_ms = duration.as_millis() as u64,
                minifier = %options.minifier,
                "compile_package"
            ),
            Some(e) => warn!(
                package = name,
                success,
                duration_ms = duration.as_millis() as u64,
                minifier = %options.minifier,
                error = %e,
                "compile_package"
            ),
        }
    }

    fn parse_stats(&self, name: &str, success: bool, duration: Duration) {
        info!(
            package = name,
            success,
            duration_ms = duration.as_millis() as u64,
            "parse_stats"
        );
    }

    fn assets_gzip_parse_time(&self, name: &str, duration: Duration) {
        info!(
            package = name,
            duration_ms = duration.as_millis() as u64,
            "assets_gzip_parse_time"
        );
    }

    fn build_package(
        &self,
        name: &str,
        success: bool,
        duration: Duration,
        options: &BuildTelemetryOptions,
        error: Option<&Error>,
    ) {
        let options_json = serde_json::to_string(options).unwrap_or_default();
        match error {
            None => info!(
                package = name,
                success,
                duration_ms = duration.as_millis() as u64,
                build_iteration = options.build_iteration,
                options = %options_json,
                "build_package"
            ),
            Some(e) => warn!(
                package = name,
                success,
                duration_ms = duration.as_millis() as u64,
                build_iteration = options.build_iteration,
                options = %options_json,
                error_kind = e.kind(),
                error = %e,
                "build_package"
            ),
        }
    }
}
