//! [`Compiler`] backed by Rolldown.
//!
//! Bundles are generated in memory (`generate()`, never `write()`), so nothing
//! but the entry points touches the install directory.
//!
//! Rolldown diagnostics are not a stable API. Like the rest of this crate they
//! are read through their `Debug` rendering and translated into
//! [`CompilerError`]s; unresolved imports become `ModuleNotFoundError`s in the
//! `Can't resolve '<request>' in '<dir>'` form the classifier expects.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use path_clean::PathClean;
use rolldown::{
    BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem, IsExternal, OutputFormat,
    Platform, RawMinifyOptions,
};
use rolldown_common::{Output, StrOrBytes};
use tracing::debug;

use crate::compiler::{CompileOutcome, CompileRequest, Compiler, CompilerError, MemoryStats};
use crate::diagnostics::patterns::MODULE_NOT_FOUND;
use crate::externals::Externals;

/// Filename template for entry and shared chunks; the orchestrator splits
/// emitted names on `.bundle.`.
const CHUNK_FILENAMES: &str = "[name].bundle.js";
const ASSET_FILENAMES: &str = "[name].bundle[extname]";

/// Chunk name Rolldown gives its helper runtime.
const ROLLDOWN_RUNTIME_CHUNK: &str = "rolldown-runtime";

/// Error name for diagnostics that are not unresolved imports.
const BUILD_ERROR: &str = "BuildError";

/// Compiles entry maps with Rolldown for the browser platform.
#[derive(Debug, Clone, Default)]
pub struct RolldownCompiler;

impl RolldownCompiler {
    pub fn new() -> Self {
        Self
    }

    fn options(&self, request: &CompileRequest<'_>, cwd: &Path) -> BundlerOptions {
        let input = request
            .entries
            .iter()
            .map(|(name, path)| InputItem {
                name: Some(name.clone()),
                import: path.to_string_lossy().into_owned(),
            })
            .collect();

        BundlerOptions {
            input: Some(input),
            cwd: Some(cwd.to_path_buf()),
            external: Some(is_external(request.externals.clone())),
            platform: Some(Platform::Browser),
            format: Some(OutputFormat::Esm),
            entry_filenames: Some(CHUNK_FILENAMES.to_string().into()),
            chunk_filenames: Some(CHUNK_FILENAMES.to_string().into()),
            asset_filenames: Some(ASSET_FILENAMES.to_string().into()),
            // Both minifier choices map to oxc; debug builds stay readable
            minify: (!request.debug).then(|| RawMinifyOptions::from(true)),
            ..Default::default()
        }
    }
}

type ExternalCheck = Pin<Box<dyn Future<Output = anyhow::Result<bool>> + Send + 'static>>;

/// External predicate for Rolldown. Also matches sub-path imports (`bar/get`
/// for `bar`) and `node:` built-ins.
fn is_external(externals: Externals) -> IsExternal {
    IsExternal::Fn(Some(Arc::new(
        move |specifier: &str, _importer: Option<&str>, _is_resolved: bool| -> ExternalCheck {
            let external = externals.is_external(specifier);
            Box::pin(async move { Ok(external) })
        },
    )))
}

/// Directory the entries were written to.
fn entry_dir(request: &CompileRequest<'_>) -> PathBuf {
    request
        .entries
        .values()
        .next()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf().clean())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[async_trait]
impl Compiler for RolldownCompiler {
    async fn compile(&self, request: CompileRequest<'_>) -> CompileOutcome {
        let cwd = entry_dir(&request);
        let options = self.options(&request, &cwd);

        let mut bundler = match RolldownBundlerBuilder::default()
            .with_options(options)
            .build()
        {
            Ok(bundler) => bundler,
            Err(e) => {
                return CompileOutcome::from_error(anyhow::anyhow!(
                    "Failed to configure Rolldown: {e:?}"
                ));
            }
        };

        let mut stats = MemoryStats::new();

        match bundler.generate().await {
            Ok(bundle) => {
                for warning in &bundle.warnings {
                    let text = format!("{warning:?}");
                    if let Some(specifier) = unresolved_specifier(&text) {
                        stats = stats.with_error(module_not_found(&specifier, &cwd));
                    }
                }

                for output in &bundle.assets {
                    stats = record_output(stats, output);
                }
            }
            Err(e) => {
                for error in translate_errors(&format!("{e:?}"), &cwd) {
                    stats = stats.with_error(error);
                }
            }
        }

        debug!(
            package = request.package_name,
            assets = stats.assets.len(),
            modules = stats.modules.len(),
            errors = stats.errors.len(),
            "Rolldown finished"
        );

        CompileOutcome::from_stats(stats)
    }
}

fn record_output(stats: MemoryStats, output: &Output) -> MemoryStats {
    match output {
        Output::Chunk(chunk) => {
            let chunk_name = chunk.name.to_string();
            let chunk_name = if chunk_name == ROLLDOWN_RUNTIME_CHUNK {
                "runtime"
            } else {
                chunk_name.as_str()
            };

            let mut stats = stats.with_asset(
                chunk.filename.to_string(),
                &[chunk_name],
                chunk.code.as_bytes(),
            );
            // Rolldown does not report module depth
            for (id, module) in chunk.modules.keys.iter().zip(chunk.modules.values.iter()) {
                let size = module.code().map(|c| c.len() as u64).unwrap_or(0);
                stats = stats.with_module(id.to_string(), size, None);
            }
            stats
        }
        Output::Asset(asset) => {
            let names: Vec<&str> = asset.names.iter().map(String::as_str).collect();
            let bytes: Vec<u8> = match &asset.source {
                StrOrBytes::Str(s) => s.as_bytes().to_vec(),
                StrOrBytes::Bytes(b) => b.clone(),
            };
            stats.with_asset(asset.filename.to_string(), &names, bytes)
        }
    }
}

fn module_not_found(specifier: &str, cwd: &Path) -> CompilerError {
    CompilerError::new(
        MODULE_NOT_FOUND,
        format!(
            "Module not found: Error: Can't resolve '{}' in '{}'",
            specifier,
            cwd.display()
        ),
    )
}

/// Split a batched Rolldown error and translate each diagnostic.
fn translate_errors(error_str: &str, cwd: &Path) -> Vec<CompilerError> {
    let parts: Vec<&str> = error_str
        .split("BuildDiagnostic")
        .map(str::trim)
        .filter(|s| *s != "Batched" && s.chars().any(char::is_alphanumeric))
        .collect();

    let parts = if parts.is_empty() {
        vec![error_str]
    } else {
        parts
    };

    parts
        .into_iter()
        .map(|part| match unresolved_specifier(part) {
            Some(specifier) => module_not_found(&specifier, cwd),
            None => CompilerError::new(BUILD_ERROR, part.to_string()),
        })
        .collect()
}

/// Specifier of an unresolved-import diagnostic.
fn unresolved_specifier(text: &str) -> Option<String> {
    if !(text.contains("UnresolvedImport")
        || text.contains("UNRESOLVED_IMPORT")
        || text.contains("Could not resolve"))
    {
        return None;
    }

    extract_quoted_string_after(text, "specifier")
        .or_else(|| extract_quoted_string_after(text, "Could not resolve"))
        .filter(|s| !s.is_empty())
}

fn extract_quoted_string_after(text: &str, keyword: &str) -> Option<String> {
    let pos = text.find(keyword)?;
    extract_quoted_string(&text[pos + keyword.len()..])
}

fn extract_quoted_string(text: &str) -> Option<String> {
    // Earliest quote wins
    let (start, quote) = text
        .char_indices()
        .find(|(_, c)| matches!(c, '"' | '\'' | '`'))?;
    let after = &text[start + quote.len_utf8()..];
    let end = after.find(quote)?;
    Some(after[..end].to_string())
}
