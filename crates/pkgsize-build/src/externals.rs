//! Packages the compiler must leave unresolved.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Node.js core modules. Treated as provided by the runtime.
pub const NODE_BUILT_INS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Externals specification passed to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Externals {
    /// npm packages that are assumed to be present at runtime.
    pub external_packages: Vec<String>,
    /// Runtime built-in modules.
    pub external_built_ins: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    peer_dependencies: indexmap::IndexMap<String, serde_json::Value>,
}

impl Externals {
    pub fn new<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            external_packages: packages.into_iter().map(Into::into).collect(),
            external_built_ins: Vec::new(),
        }
    }

    /// Externals for a package as installed under `install_path`.
    ///
    /// Peer dependencies are externalized, as are Node built-ins. A package
    /// without a readable manifest gets no external packages.
    pub fn from_manifest(package_name: &str, install_path: &Path) -> Self {
        let manifest_path = install_path
            .join("node_modules")
            .join(package_name)
            .join("package.json");

        let peers = match std::fs::read_to_string(&manifest_path) {
            Ok(contents) => match serde_json::from_str::<PackageManifest>(&contents) {
                Ok(manifest) => manifest.peer_dependencies.into_keys().collect(),
                Err(e) => {
                    debug!(path = %manifest_path.display(), error = %e, "Unparseable package manifest");
                    Vec::new()
                }
            },
            Err(e) => {
                debug!(path = %manifest_path.display(), error = %e, "No package manifest");
                Vec::new()
            }
        };

        Self {
            external_packages: peers,
            external_built_ins: NODE_BUILT_INS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// New externals with `packages` appended to the external packages.
    ///
    /// `self` is left untouched.
    pub fn with_packages<I, S>(&self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut external_packages = self.external_packages.clone();
        external_packages.extend(packages.into_iter().map(Into::into));
        Self {
            external_packages,
            external_built_ins: self.external_built_ins.clone(),
        }
    }

    /// Every specifier the compiler should leave unresolved.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.external_packages
            .iter()
            .chain(self.external_built_ins.iter())
            .map(String::as_str)
    }

    /// Whether `specifier` (a bare import, possibly with a sub-path) is external.
    pub fn is_external(&self, specifier: &str) -> bool {
        let specifier = specifier.strip_prefix("node:").unwrap_or(specifier);
        self.all().any(|name| {
            specifier == name
                || specifier
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}
