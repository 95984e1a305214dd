//! One package build, end to end.
//!
//! [`build_package`] writes the entry points, runs the compiler once and turns
//! what the compiler reported into either a list of [`AssetStat`]s or a
//! classified [`Error`].

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use flate2::Compression;
use flate2::write::GzEncoder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::compiler::{
    AssetInfo, CompileOutcome, CompileRequest, CompileStats, Compiler, EntryMap, StatsJson,
    StatsJsonOptions,
};
use crate::dependency_sizes::{DependencySize, DependencySizer, ModuleSizeBreakdown};
use crate::diagnostics::{is_unsupported_syntax, parse_missing_modules};
use crate::entry::{EntryOptions, create_entry_point};
use crate::options::{BuildPackageOptions, BuildRequest};
use crate::parse_time::{OxcParseTimer, ParseTime, ParseTimer};
use crate::telemetry::{NoopTelemetry, Telemetry};
use crate::{Error, Result};

/// Name of the single entry used when imports are not split.
pub const MAIN_ENTRY: &str = "main";

/// Chunk holding the bundler runtime; never reported as an asset.
const RUNTIME_CHUNK: &str = "runtime";

const LICENSE_SUFFIX: &str = "LICENSE.txt";

static BUNDLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\.bundle\.(.+)$").expect("valid pattern"));

/// Collaborators a build runs against.
#[derive(Clone)]
pub struct BuildContext {
    pub compiler: Arc<dyn Compiler>,
    pub telemetry: Arc<dyn Telemetry>,
    pub dependency_sizer: Arc<dyn DependencySizer>,
    pub parse_timer: Arc<dyn ParseTimer>,
}

impl BuildContext {
    /// Context with no telemetry, module-based dependency sizes and oxc
    /// parse timing.
    pub fn new(compiler: impl Compiler + 'static) -> Self {
        Self {
            compiler: Arc::new(compiler),
            telemetry: Arc::new(NoopTelemetry),
            dependency_sizer: Arc::new(ModuleSizeBreakdown),
            parse_timer: Arc::new(OxcParseTimer::default()),
        }
    }

    pub fn with_telemetry(mut self, telemetry: impl Telemetry + 'static) -> Self {
        self.telemetry = Arc::new(telemetry);
        self
    }

    pub fn with_dependency_sizer(mut self, sizer: impl DependencySizer + 'static) -> Self {
        self.dependency_sizer = Arc::new(sizer);
        self
    }

    pub fn with_parse_timer(mut self, timer: impl ParseTimer + 'static) -> Self {
        self.parse_timer = Arc::new(timer);
        self
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext").finish_non_exhaustive()
    }
}

/// Size report for one emitted bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetStat {
    /// Entry name (`main`, or the custom import in split mode).
    pub name: String,
    /// File extension, e.g. `js` or `css`.
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub gzip: u64,
    pub parse: Option<ParseTime>,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    /// Packages that were externalized after the first attempt failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignored_missing_dependencies: Option<Vec<String>>,
    pub assets: Vec<AssetStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_sizes: Option<Vec<DependencySize>>,
}

impl BuildResult {
    /// Sum of raw sizes over all assets.
    pub fn total_size(&self) -> u64 {
        self.assets.iter().map(|a| a.size).sum()
    }

    pub fn total_gzip(&self) -> u64 {
        self.assets.iter().map(|a| a.gzip).sum()
    }
}

/// Write the entry points for `request`.
///
/// Returns `None` in split mode when there are no custom imports to split.
pub fn build_entry_map(
    name: &str,
    install_path: &Path,
    options: &BuildPackageOptions,
) -> Result<Option<EntryMap>> {
    let mut entries = EntryMap::new();

    if options.split_custom_imports {
        let Some(imports) = options.custom_imports_list() else {
            return Ok(None);
        };

        for import in imports {
            let path = create_entry_point(
                name,
                install_path,
                &EntryOptions {
                    esm: true,
                    custom_imports: Some(vec![import.clone()]),
                    entry_filename: Some(format!("{import}.js")),
                },
            )?;
            entries.insert(import.clone(), path);
        }
    } else {
        let path = create_entry_point(
            name,
            install_path,
            &EntryOptions {
                esm: false,
                custom_imports: options.custom_imports.clone(),
                entry_filename: None,
            },
        )?;
        entries.insert(MAIN_ENTRY.to_string(), path);
    }

    Ok(Some(entries))
}

/// Build `request` once and report its assets.
///
/// # Errors
///
/// - [`Error::EntryPoint`] when an entry cannot be written or the compiler
///   cannot resolve the package itself
/// - [`Error::MissingDependency`] when the package imports modules that are
///   not installed
/// - [`Error::CliBuild`] when the compiler rejects the package's syntax
/// - [`Error::Build`] for any other compiler failure
/// - [`Error::ClassifierDrift`] / [`Error::UnexpectedBuild`] when the
///   compiler's report cannot be interpreted
pub async fn build_package(ctx: &BuildContext, request: &BuildRequest) -> Result<BuildResult> {
    let BuildRequest {
        name,
        install_path,
        externals,
        options,
    } = request;

    let Some(entries) = build_entry_map(name, install_path, options)? else {
        debug!(package = %name, "Split build without custom imports, nothing to compile");
        return Ok(BuildResult::default());
    };

    debug!(
        package = %name,
        entries = entries.len(),
        externals = externals.external_packages.len(),
        "Compiling package"
    );

    let compile_start = Instant::now();
    let outcome = ctx
        .compiler
        .compile(CompileRequest {
            entries: &entries,
            package_name: name,
            externals,
            debug: options.debug,
            minifier: options.minifier,
        })
        .await;
    let compile_duration = compile_start.elapsed();

    let invocation_error = match &outcome {
        CompileOutcome {
            error: Some(e),
            stats: None,
        } => Some(Error::Build {
            errors: vec![format!("{e:#}")],
        }),
        _ => None,
    };
    ctx.telemetry.compile_package(
        name,
        invocation_error.is_none(),
        compile_duration,
        options,
        invocation_error.as_ref(),
    );
    if let Some(err) = invocation_error {
        warn!(package = %name, error = %err, "Compiler failed to run");
        return Err(err);
    }

    let CompileOutcome { error, stats } = outcome;
    let Some(stats) = stats else {
        return Err(Error::unexpected(
            "Compiler returned neither stats nor an error",
        ));
    };

    let stats_start = Instant::now();
    let json = stats.to_json(&StatsJsonOptions::size_report());
    ctx.telemetry
        .parse_stats(name, json.is_some(), stats_start.elapsed());
    let Some(json) = json else {
        return Err(Error::unexpected(
            "Expected compiler stats summary to be available, but it was not",
        ));
    };

    if options.debug {
        debug!(
            package = %name,
            stats = %serde_json::to_string(&json).unwrap_or_default(),
            "Compiler stats"
        );
    }

    if stats.has_errors() {
        return Err(classify_failure(name, stats.as_ref(), &json)?);
    }

    if let Some(e) = error {
        warn!(
            package = %name,
            error = %format!("{e:#}"),
            "Compiler reported an error alongside clean stats"
        );
    }

    let assets = collect_assets(ctx, name, options, stats.as_ref(), &json)?;

    let dependency_sizes = if options.include_dependency_sizes {
        Some(
            ctx.dependency_sizer
                .dependency_sizes(name, &json, options.minifier)?,
        )
    } else {
        None
    };

    info!(
        package = %name,
        assets = assets.len(),
        duration_ms = compile_duration.as_millis() as u64,
        "Built package"
    );

    Ok(BuildResult {
        ignored_missing_dependencies: None,
        assets,
        dependency_sizes,
    })
}

/// Map compilation errors onto the error taxonomy.
///
/// Returns `Ok(error)` with the classified build error, or `Err` when the
/// errors themselves could not be classified.
fn classify_failure(name: &str, stats: &dyn CompileStats, json: &StatsJson) -> Result<Error> {
    let missing_modules = parse_missing_modules(stats.errors())?;

    if !missing_modules.is_empty() {
        if missing_modules.len() == 1 && missing_modules[0] == name {
            return Ok(Error::EntryPoint {
                message: format!("Could not resolve the entry point of '{name}'"),
                source: None,
            });
        }

        debug!(package = %name, missing = ?missing_modules, "Missing dependencies");
        return Ok(Error::MissingDependency {
            missing_modules,
            errors: json.errors.clone(),
        });
    }

    if json.errors.iter().any(|e| is_unsupported_syntax(e)) {
        return Ok(Error::CliBuild {
            errors: json.errors.clone(),
        });
    }

    Ok(Error::Build {
        errors: json.errors.clone(),
    })
}

/// Runtime chunks and license files are bundler by-products.
fn is_main_asset(asset: &AssetInfo) -> bool {
    !asset.chunk_names.iter().any(|c| c == RUNTIME_CHUNK) && !asset.name.ends_with(LICENSE_SUFFIX)
}

/// Split `<name>.bundle.<ext>` into its name and extension.
pub fn split_bundle_name(filename: &str) -> Result<(&str, &str)> {
    let caps = BUNDLE_NAME_RE.captures(filename).ok_or_else(|| {
        Error::unexpected_with(
            format!("Found a bundle that does not match the <name>.bundle.<ext> convention: {filename}"),
            "A new rule is needed to handle this asset type",
        )
    })?;

    match (caps.get(1), caps.get(2)) {
        (Some(name), Some(ext)) => Ok((name.as_str(), ext.as_str())),
        _ => Err(Error::unexpected(format!(
            "Incomplete bundle name match for {filename}"
        ))),
    }
}

/// Gzip-compressed size of `contents` at maximum compression.
pub fn gzip_size(contents: &[u8]) -> std::io::Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(contents)?;
    Ok(encoder.finish()?.len() as u64)
}

fn collect_assets(
    ctx: &BuildContext,
    name: &str,
    options: &BuildPackageOptions,
    stats: &dyn CompileStats,
    json: &StatsJson,
) -> Result<Vec<AssetStat>> {
    let start = Instant::now();
    let output = stats.output_fs();

    let assets = json
        .assets
        .iter()
        .filter(|asset| is_main_asset(asset))
        .map(|asset| {
            let (entry_name, extension) = split_bundle_name(&asset.name)?;
            let contents = output.read(&asset.name).map_err(|e| {
                Error::unexpected_with(
                    format!("Could not read compiled asset {}", asset.name),
                    e.to_string(),
                )
            })?;
            let gzip = gzip_size(&contents).map_err(|e| {
                Error::unexpected_with(format!("Could not gzip {}", asset.name), e.to_string())
            })?;
            let parse = if options.calc_parse {
                ctx.parse_timer.parse_time(&contents)
            } else {
                None
            };

            Ok(AssetStat {
                name: entry_name.to_string(),
                kind: extension.to_string(),
                size: asset.size,
                gzip,
                parse,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    ctx.telemetry.assets_gzip_parse_time(name, start.elapsed());
    Ok(assets)
}
