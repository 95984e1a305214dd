//! Builds real packages from a `node_modules` fixture with Rolldown.
//!
//! These tests verify that:
//! 1. A self-contained package bundles into a single measured asset
//! 2. A deep import of an uninstalled package is reported by its package name
//! 3. The rebuild externalizes sub-path imports of the ignored package

use std::fs;
use std::path::Path;

use pkgsize_build::{
    BuildContext, BuildPackageOptions, BuildRequest, Error, Externals, RolldownCompiler,
    build_package, build_package_ignoring_missing_deps,
};
use tempfile::TempDir;

/// Deep-imports `bar`, which is never installed.
const PICKER_INDEX: &str = "const get = require('bar/get');
module.exports = function pick(o) { return get(o, 'a'); };
";

/// Install `name` with the given `index.js` under `<dir>/node_modules`.
fn install_package(dir: &Path, name: &str, index: &str) {
    let package_dir = dir.join("node_modules").join(name);
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(
        package_dir.join("package.json"),
        format!(r#"{{"name": "{name}", "version": "1.0.0", "main": "index.js"}}"#),
    )
    .unwrap();
    fs::write(package_dir.join("index.js"), index).unwrap();
}

fn rolldown_request(name: &str, install: &TempDir) -> BuildRequest {
    BuildRequest::new(
        name,
        install.path(),
        Externals::from_manifest(name, install.path()),
        BuildPackageOptions::default(),
    )
}

#[tokio::test(flavor = "multi_thread")]
async fn bundles_installed_package() {
    let install = TempDir::new().unwrap();
    install_package(
        install.path(),
        "answer",
        "module.exports = function answer() { return 42; };\n",
    );
    let ctx = BuildContext::new(RolldownCompiler::new());

    let result = build_package_ignoring_missing_deps(&ctx, &rolldown_request("answer", &install))
        .await
        .unwrap();

    assert_eq!(result.assets.len(), 1);
    assert_eq!(result.assets[0].name, "main");
    assert_eq!(result.assets[0].kind, "js");
    assert!(result.assets[0].size > 0);
    assert!(result.assets[0].gzip > 0);
    assert!(result.ignored_missing_dependencies.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn deep_import_of_missing_package_is_reported_by_package_name() {
    let install = TempDir::new().unwrap();
    install_package(install.path(), "picker", PICKER_INDEX);
    let ctx = BuildContext::new(RolldownCompiler::new());

    let err = build_package(&ctx, &rolldown_request("picker", &install))
        .await
        .unwrap_err();

    match err {
        Error::MissingDependency {
            missing_modules, ..
        } => assert_eq!(missing_modules, vec!["bar"]),
        other => panic!("expected MissingDependency, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn rebuild_externalizes_deep_imports_of_missing_package() {
    let install = TempDir::new().unwrap();
    install_package(install.path(), "picker", PICKER_INDEX);
    let ctx = BuildContext::new(RolldownCompiler::new());

    let result = build_package_ignoring_missing_deps(&ctx, &rolldown_request("picker", &install))
        .await
        .unwrap();

    assert_eq!(
        result.ignored_missing_dependencies,
        Some(vec!["bar".to_string()])
    );
    assert_eq!(result.assets.len(), 1);
    assert!(result.assets[0].size > 0);
}
