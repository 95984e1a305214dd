//! The compiler seam.
//!
//! A [`Compiler`] turns an entry map into compiled bundles. It reports either
//! an invocation error (the compiler itself could not run), a stats object
//! (which may carry compilation errors), or both. Compiled output lives in an
//! in-memory [`OutputFs`] owned by the stats object, so it is scoped to a
//! single build.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::externals::Externals;
use crate::options::Minifier;

/// Entry name to generated entry file.
pub type EntryMap = IndexMap<String, PathBuf>;

/// Everything a compiler needs for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct CompileRequest<'a> {
    pub entries: &'a EntryMap,
    pub package_name: &'a str,
    pub externals: &'a Externals,
    pub debug: bool,
    pub minifier: Minifier,
}

/// A compilation error as reported by the compiler.
///
/// `name` identifies the error class (`ModuleNotFoundError` for unresolvable
/// imports); `message` is the compiler's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerError {
    pub name: String,
    pub message: String,
}

impl CompilerError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Size and chunk membership of one emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    pub name: String,
    pub size: u64,
    pub chunk_names: Vec<String>,
}

/// A module that ended up in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    /// Module identifier, usually its path.
    pub name: String,
    pub size: u64,
    /// Distance from the nearest entry; `None` when unknown.
    pub depth: Option<u32>,
}

/// What to include in a [`StatsJson`]. Modules are ordered by depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsJsonOptions {
    pub assets: bool,
    pub modules: bool,
    pub chunks: bool,
    pub warnings: bool,
    pub max_modules: usize,
}

impl StatsJsonOptions {
    /// Per-asset and per-module detail, capped at 500 modules sorted by depth.
    pub fn size_report() -> Self {
        Self {
            assets: true,
            modules: true,
            chunks: false,
            warnings: false,
            max_modules: 500,
        }
    }
}

impl Default for StatsJsonOptions {
    fn default() -> Self {
        Self::size_report()
    }
}

/// Serializable summary of a compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsJson {
    pub assets: Vec<AssetInfo>,
    pub modules: Vec<ModuleInfo>,
    /// Compilation errors, rendered as strings.
    pub errors: Vec<String>,
}

/// Read access to compiled output.
pub trait OutputFs: Send + Sync {
    fn read(&self, filename: &str) -> std::io::Result<Vec<u8>>;
}

/// In-memory output filesystem.
#[derive(Debug, Default)]
pub struct MemoryOutputFs {
    files: RwLock<FxHashMap<String, Vec<u8>>>,
}

impl MemoryOutputFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, filename: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.write().insert(filename.into(), contents.into());
    }
}

impl OutputFs for MemoryOutputFs {
    fn read(&self, filename: &str) -> std::io::Result<Vec<u8>> {
        self.files.read().get(filename).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{filename} not found in compiler output"),
            )
        })
    }
}

/// Result of a compilation that ran.
pub trait CompileStats: Send + Sync {
    /// Compilation errors, in the order the compiler reported them.
    fn errors(&self) -> &[CompilerError];

    fn has_errors(&self) -> bool {
        !self.errors().is_empty()
    }

    /// Summary of the compilation, or `None` if it cannot be produced.
    fn to_json(&self, options: &StatsJsonOptions) -> Option<StatsJson>;

    fn output_fs(&self) -> &dyn OutputFs;
}

/// [`CompileStats`] backed by plain vectors and a [`MemoryOutputFs`].
#[derive(Debug, Default)]
pub struct MemoryStats {
    pub assets: Vec<AssetInfo>,
    pub modules: Vec<ModuleInfo>,
    pub errors: Vec<CompilerError>,
    pub output: MemoryOutputFs,
}

impl MemoryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an emitted file and store its contents.
    pub fn with_asset(
        mut self,
        filename: impl Into<String>,
        chunk_names: &[&str],
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        let filename = filename.into();
        let contents = contents.into();
        self.assets.push(AssetInfo {
            name: filename.clone(),
            size: contents.len() as u64,
            chunk_names: chunk_names.iter().map(|s| s.to_string()).collect(),
        });
        self.output.write(filename, contents);
        self
    }

    pub fn with_module(mut self, name: impl Into<String>, size: u64, depth: Option<u32>) -> Self {
        self.modules.push(ModuleInfo {
            name: name.into(),
            size,
            depth,
        });
        self
    }

    pub fn with_error(mut self, error: CompilerError) -> Self {
        self.errors.push(error);
        self
    }
}

impl CompileStats for MemoryStats {
    fn errors(&self) -> &[CompilerError] {
        &self.errors
    }

    fn to_json(&self, options: &StatsJsonOptions) -> Option<StatsJson> {
        let assets = if options.assets {
            self.assets.clone()
        } else {
            Vec::new()
        };

        let modules = if options.modules {
            let mut modules = self.modules.clone();
            // Unknown depth sorts last
            modules.sort_by_key(|m| m.depth.unwrap_or(u32::MAX));
            modules.truncate(options.max_modules);
            modules
        } else {
            Vec::new()
        };

        Some(StatsJson {
            assets,
            modules,
            errors: self.errors.iter().map(ToString::to_string).collect(),
        })
    }

    fn output_fs(&self) -> &dyn OutputFs {
        &self.output
    }
}

/// What a compiler invocation produced.
#[derive(Default)]
pub struct CompileOutcome {
    /// The compiler itself failed to run.
    pub error: Option<anyhow::Error>,
    pub stats: Option<Box<dyn CompileStats>>,
}

impl CompileOutcome {
    pub fn from_stats(stats: impl CompileStats + 'static) -> Self {
        Self {
            error: None,
            stats: Some(Box::new(stats)),
        }
    }

    pub fn from_error(error: anyhow::Error) -> Self {
        Self {
            error: Some(error),
            stats: None,
        }
    }
}

impl fmt::Debug for CompileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileOutcome")
            .field("error", &self.error)
            .field("stats", &self.stats.as_ref().map(|s| s.errors().len()))
            .finish()
    }
}

/// A bundler that can compile an entry map.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, request: CompileRequest<'_>) -> CompileOutcome;
}
