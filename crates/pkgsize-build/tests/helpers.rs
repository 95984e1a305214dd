//! Shared test utilities for pkgsize-build tests
//!
//! Builds run against a scripted [`FakeCompiler`] so every compiler outcome
//! can be produced without a real bundler.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use pkgsize_build::{
    BuildContext, BuildPackageOptions, BuildRequest, BuildTelemetryOptions, CompileOutcome,
    CompileRequest, Compiler, CompilerError, Error, Externals, MemoryStats, Minifier, Telemetry,
};
use tempfile::TempDir;

/// What the fake compiler saw for one invocation.
#[derive(Debug, Clone)]
pub struct RecordedCompile {
    pub entries: Vec<(String, PathBuf)>,
    /// Entry file contents at compile time, in entry order.
    pub sources: Vec<String>,
    pub package_name: String,
    pub external_packages: Vec<String>,
    pub debug: bool,
    pub minifier: Minifier,
}

/// Compiler returning pre-scripted outcomes, one per call.
#[derive(Clone, Default)]
pub struct FakeCompiler {
    outcomes: Arc<Mutex<VecDeque<CompileOutcome>>>,
    calls: Arc<Mutex<Vec<RecordedCompile>>>,
}

impl FakeCompiler {
    pub fn new(outcomes: impl IntoIterator<Item = CompileOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            calls: Arc::default(),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCompile> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Compiler for FakeCompiler {
    async fn compile(&self, request: CompileRequest<'_>) -> CompileOutcome {
        let entries: Vec<(String, PathBuf)> = request
            .entries
            .iter()
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();
        let sources = entries
            .iter()
            .map(|(_, path)| std::fs::read_to_string(path).unwrap_or_default())
            .collect();

        self.calls.lock().push(RecordedCompile {
            entries,
            sources,
            package_name: request.package_name.to_string(),
            external_packages: request.externals.external_packages.clone(),
            debug: request.debug,
            minifier: request.minifier,
        });

        self.outcomes.lock().pop_front().unwrap_or_default()
    }
}

/// A `build_package` telemetry record.
#[derive(Debug, Clone)]
pub struct BuildEvent {
    pub name: String,
    pub success: bool,
    pub build_iteration: u32,
    pub missing_modules: Option<Vec<String>>,
    pub error_kind: Option<&'static str>,
}

/// A `compile_package` telemetry record.
#[derive(Debug, Clone)]
pub struct CompileEvent {
    pub name: String,
    pub success: bool,
    pub error_kind: Option<&'static str>,
}

/// Telemetry sink that keeps every event for inspection.
#[derive(Clone, Default)]
pub struct RecordingTelemetry {
    pub builds: Arc<Mutex<Vec<BuildEvent>>>,
    pub compiles: Arc<Mutex<Vec<CompileEvent>>>,
    pub parse_stats: Arc<Mutex<Vec<bool>>>,
    pub gzip_parse: Arc<Mutex<usize>>,
}

impl Telemetry for RecordingTelemetry {
    fn compile_package(
        &self,
        name: &str,
        success: bool,
        _duration: Duration,
        _options: &BuildPackageOptions,
        error: Option<&Error>,
    ) {
        self.compiles.lock().push(CompileEvent {
            name: name.to_string(),
            success,
            error_kind: error.map(Error::kind),
        });
    }

    fn parse_stats(&self, _name: &str, success: bool, _duration: Duration) {
        self.parse_stats.lock().push(success);
    }

    fn assets_gzip_parse_time(&self, _name: &str, _duration: Duration) {
        *self.gzip_parse.lock() += 1;
    }

    fn build_package(
        &self,
        name: &str,
        success: bool,
        _duration: Duration,
        options: &BuildTelemetryOptions,
        error: Option<&Error>,
    ) {
        self.builds.lock().push(BuildEvent {
            name: name.to_string(),
            success,
            build_iteration: options.build_iteration,
            missing_modules: options.missing_modules.clone(),
            error_kind: error.map(Error::kind),
        });
    }
}

/// Context wired to `compiler` and a recording telemetry sink.
pub fn test_context(compiler: &FakeCompiler) -> (BuildContext, RecordingTelemetry) {
    let telemetry = RecordingTelemetry::default();
    let ctx = BuildContext::new(compiler.clone()).with_telemetry(telemetry.clone());
    (ctx, telemetry)
}

/// Empty install directory.
pub fn install_dir() -> TempDir {
    TempDir::new().expect("temp dir")
}

pub fn request(name: &str, install: &TempDir, options: BuildPackageOptions) -> BuildRequest {
    BuildRequest::new(name, install.path(), Externals::default(), options)
}

/// Stats for a clean build of `main`.
pub fn main_bundle(contents: &str) -> MemoryStats {
    MemoryStats::new().with_asset("main.bundle.js", &["main"], contents)
}

/// Stats reporting `requests` as unresolvable.
pub fn unresolved(requests: &[&str]) -> MemoryStats {
    requests.iter().fold(MemoryStats::new(), |stats, request| {
        stats.with_error(CompilerError::new(
            "ModuleNotFoundError",
            format!("Module not found: Error: Can't resolve '{request}' in '/tmp/install'"),
        ))
    })
}
