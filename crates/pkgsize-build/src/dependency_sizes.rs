//! Per-dependency size breakdown.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::compiler::StatsJson;
use crate::options::Minifier;

/// Bytes contributed by one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySize {
    pub name: String,
    pub approximate_size: u64,
}

/// Computes which dependency contributed how many bytes to a build.
pub trait DependencySizer: Send + Sync {
    fn dependency_sizes(
        &self,
        package_name: &str,
        stats: &StatsJson,
        minifier: Minifier,
    ) -> Result<Vec<DependencySize>>;
}

/// Sums the rendered module sizes in a stats summary per package.
///
/// A module is attributed to the package owning its innermost
/// `node_modules/` segment. Modules outside `node_modules` (the synthetic
/// entry) are not counted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleSizeBreakdown;

/// Package owning `module_path`, if it lives in `node_modules`.
pub fn package_of_module(module_path: &str) -> Option<&str> {
    let normalized_start = module_path.rfind("node_modules/")? + "node_modules/".len();
    let rest = &module_path[normalized_start..];

    let end = if rest.starts_with('@') {
        let scope_end = rest.find('/')?;
        rest[scope_end + 1..]
            .find('/')
            .map(|i| scope_end + 1 + i)
            .unwrap_or(rest.len())
    } else {
        rest.find('/').unwrap_or(rest.len())
    };

    let name = &rest[..end];
    (!name.is_empty()).then_some(name)
}

impl DependencySizer for ModuleSizeBreakdown {
    fn dependency_sizes(
        &self,
        _package_name: &str,
        stats: &StatsJson,
        _minifier: Minifier,
    ) -> Result<Vec<DependencySize>> {
        let mut sizes: IndexMap<String, u64> = IndexMap::new();
        for module in &stats.modules {
            let path = module.name.replace('\\', "/");
            if let Some(name) = package_of_module(&path) {
                *sizes.entry(name.to_string()).or_insert(0) += module.size;
            }
        }

        let mut breakdown: Vec<DependencySize> = sizes
            .into_iter()
            .map(|(name, approximate_size)| DependencySize {
                name,
                approximate_size,
            })
            .collect();
        // Stable sort keeps first-seen order among equal sizes
        breakdown.sort_by(|a, b| b.approximate_size.cmp(&a.approximate_size));
        Ok(breakdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ModuleInfo;

    fn module(name: &str, size: u64) -> ModuleInfo {
        ModuleInfo {
            name: name.to_string(),
            size,
            depth: Some(1),
        }
    }

    #[test]
    fn test_package_of_module() {
        assert_eq!(
            package_of_module("/tmp/x/node_modules/lodash/get.js"),
            Some("lodash")
        );
        assert_eq!(
            package_of_module("./node_modules/@babel/runtime/helpers/esm/extends.js"),
            Some("@babel/runtime")
        );
        assert_eq!(
            package_of_module("/a/node_modules/react-dom/node_modules/scheduler/index.js"),
            Some("scheduler")
        );
        assert_eq!(package_of_module("/tmp/x/index.js"), None);
    }

    #[test]
    fn test_breakdown_groups_and_sorts() {
        let stats = StatsJson {
            assets: vec![],
            modules: vec![
                module("/i/index.js", 50),
                module("/i/node_modules/react/index.js", 100),
                module("/i/node_modules/object-assign/index.js", 300),
                module("/i/node_modules/react/cjs/react.js", 250),
            ],
            errors: vec![],
        };

        let sizes = ModuleSizeBreakdown
            .dependency_sizes("react", &stats, Minifier::Terser)
            .unwrap();
        assert_eq!(
            sizes,
            vec![
                DependencySize {
                    name: "react".to_string(),
                    approximate_size: 350,
                },
                DependencySize {
                    name: "object-assign".to_string(),
                    approximate_size: 300,
                },
            ]
        );
    }

    #[test]
    fn test_windows_separators() {
        let stats = StatsJson {
            modules: vec![module("C:\\i\\node_modules\\left-pad\\index.js", 10)],
            ..Default::default()
        };
        let sizes = ModuleSizeBreakdown
            .dependency_sizes("left-pad", &stats, Minifier::Esbuild)
            .unwrap();
        assert_eq!(sizes[0].name, "left-pad");
    }
}
