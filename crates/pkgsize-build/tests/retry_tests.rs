//! Tests for rebuilding with missing dependencies externalized.

mod helpers;

use helpers::*;
use pkgsize_build::{
    BuildPackageOptions, BuildRequest, CompileOutcome, Error, Externals,
    MAX_IGNORED_MISSING_DEPENDENCIES, build_package_ignoring_missing_deps,
};

#[tokio::test]
async fn first_attempt_success_is_returned_unchanged() {
    let install = install_dir();
    let compiler = FakeCompiler::new([CompileOutcome::from_stats(main_bundle("var foo;"))]);
    let (ctx, telemetry) = test_context(&compiler);

    let result = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .expect("build should succeed");

    assert_eq!(compiler.call_count(), 1);
    assert!(result.ignored_missing_dependencies.is_none());
    assert_eq!(result.assets.len(), 1);

    let builds = telemetry.builds.lock();
    assert_eq!(builds.len(), 1);
    assert!(builds[0].success);
    assert_eq!(builds[0].build_iteration, 1);
    assert!(builds[0].missing_modules.is_none());
}

#[tokio::test]
async fn missing_dependency_is_externalized_and_rebuilt() {
    let install = install_dir();
    let compiler = FakeCompiler::new([
        CompileOutcome::from_stats(unresolved(&["bar"])),
        CompileOutcome::from_stats(main_bundle("var foo;")),
    ]);
    let (ctx, telemetry) = test_context(&compiler);

    let result = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .expect("rebuild should succeed");

    let calls = compiler.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].external_packages.is_empty());
    assert_eq!(calls[1].external_packages, vec!["bar"]);

    assert_eq!(
        result.ignored_missing_dependencies,
        Some(vec!["bar".to_string()])
    );
    assert_eq!(result.assets[0].name, "main");

    let builds = telemetry.builds.lock();
    assert_eq!(builds.len(), 1);
    assert!(builds[0].success);
    assert_eq!(builds[0].build_iteration, 2);
    assert_eq!(builds[0].missing_modules, Some(vec!["bar".to_string()]));
}

#[tokio::test]
async fn rebuild_keeps_existing_externals() {
    let install = install_dir();
    let compiler = FakeCompiler::new([
        CompileOutcome::from_stats(unresolved(&["bar"])),
        CompileOutcome::from_stats(main_bundle("x")),
    ]);
    let (ctx, _) = test_context(&compiler);

    let request = BuildRequest::new(
        "foo",
        install.path(),
        Externals::new(["react"]),
        BuildPackageOptions::default(),
    );
    build_package_ignoring_missing_deps(&ctx, &request)
        .await
        .expect("rebuild should succeed");

    assert_eq!(compiler.calls()[1].external_packages, vec!["react", "bar"]);
    assert_eq!(request.externals.external_packages, vec!["react"]);
}

#[tokio::test]
async fn exactly_the_limit_is_retried() {
    let install = install_dir();
    let names = ["a", "b", "c", "d", "e", "f"];
    assert_eq!(names.len(), MAX_IGNORED_MISSING_DEPENDENCIES);
    let compiler = FakeCompiler::new([
        CompileOutcome::from_stats(unresolved(&names)),
        CompileOutcome::from_stats(main_bundle("x")),
    ]);
    let (ctx, _) = test_context(&compiler);

    let result = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .expect("rebuild should succeed");

    assert_eq!(compiler.call_count(), 2);
    assert_eq!(compiler.calls()[0].external_packages, Vec::<String>::new());
    assert_eq!(compiler.calls()[1].external_packages, names);
    assert_eq!(
        result.ignored_missing_dependencies,
        Some(names.iter().map(|n| n.to_string()).collect())
    );
}

#[tokio::test]
async fn too_many_missing_dependencies_are_not_retried() {
    let install = install_dir();
    let compiler = FakeCompiler::new([CompileOutcome::from_stats(unresolved(&[
        "a", "b", "c", "d", "e", "f", "g",
    ]))]);
    let (ctx, telemetry) = test_context(&compiler);

    let err = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .unwrap_err();

    assert_eq!(compiler.call_count(), 1);
    assert_eq!(err.missing_modules().map(<[_]>::len), Some(7));

    let builds = telemetry.builds.lock();
    assert_eq!(builds.len(), 1);
    assert!(!builds[0].success);
    assert_eq!(builds[0].build_iteration, 2);
    assert_eq!(builds[0].error_kind, Some("MissingDependencyError"));
}

#[tokio::test]
async fn invalid_package_names_are_not_retried() {
    let install = install_dir();
    let compiler = FakeCompiler::new([CompileOutcome::from_stats(unresolved(&[
        "bar",
        "./local-file",
    ]))]);
    let (ctx, _) = test_context(&compiler);

    let err = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .unwrap_err();

    assert_eq!(compiler.call_count(), 1);
    assert!(matches!(err, Error::MissingDependency { .. }));
}

#[tokio::test]
async fn failed_rebuild_propagates_second_error() {
    let install = install_dir();
    let compiler = FakeCompiler::new([
        CompileOutcome::from_stats(unresolved(&["bar"])),
        CompileOutcome::from_stats(unresolved(&["baz"])),
    ]);
    let (ctx, telemetry) = test_context(&compiler);

    let err = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .unwrap_err();

    // Never a third attempt
    assert_eq!(compiler.call_count(), 2);
    assert_eq!(err.missing_modules(), Some(&["baz".to_string()][..]));

    let builds = telemetry.builds.lock();
    assert_eq!(builds.len(), 1);
    assert!(!builds[0].success);
    assert_eq!(builds[0].build_iteration, 2);
    assert_eq!(builds[0].missing_modules, Some(vec!["bar".to_string()]));
}

#[tokio::test]
async fn non_recoverable_errors_propagate_unchanged() {
    let install = install_dir();
    let compiler = FakeCompiler::new([CompileOutcome::from_error(anyhow::anyhow!("boom"))]);
    let (ctx, telemetry) = test_context(&compiler);

    let err = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .unwrap_err();

    assert_eq!(compiler.call_count(), 1);
    assert_eq!(err.kind(), "BuildError");
    assert_eq!(telemetry.builds.lock()[0].error_kind, Some("BuildError"));
}

#[tokio::test]
async fn entry_point_error_is_not_retried() {
    let install = install_dir();
    let compiler = FakeCompiler::new([CompileOutcome::from_stats(unresolved(&["foo"]))]);
    let (ctx, _) = test_context(&compiler);

    let err = build_package_ignoring_missing_deps(
        &ctx,
        &request("foo", &install, BuildPackageOptions::default()),
    )
    .await
    .unwrap_err();

    assert_eq!(compiler.call_count(), 1);
    assert_eq!(err.kind(), "EntryPointError");
}
