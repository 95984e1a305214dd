//! Measuring several packages at once.

use crate::options::BuildRequest;
use crate::orchestrator::{BuildContext, BuildResult};
use crate::retry::build_package_ignoring_missing_deps;
use crate::{Error, Result};

/// One package to measure as part of a batch.
#[derive(Debug, Clone)]
pub struct PackageJob {
    pub request: BuildRequest,
}

impl PackageJob {
    pub fn new(request: BuildRequest) -> Self {
        Self { request }
    }

    pub fn name(&self) -> &str {
        &self.request.name
    }
}

/// Default parallelism: one build per core, at most eight.
pub fn default_max_parallel() -> usize {
    #[cfg(not(target_family = "wasm"))]
    {
        num_cpus::get().clamp(1, 8)
    }
    #[cfg(target_family = "wasm")]
    {
        1
    }
}

/// Measure every job, at most `max_parallel` at a time.
///
/// Each job goes through [`build_package_ignoring_missing_deps`]. Results are
/// returned in job order, paired with the package name. A job that panics is
/// reported as [`Error::UnexpectedBuild`].
#[cfg(not(target_family = "wasm"))]
pub async fn build_packages_concurrent(
    ctx: &BuildContext,
    jobs: Vec<PackageJob>,
    max_parallel: Option<usize>,
) -> Vec<(String, Result<BuildResult>)> {
    use std::sync::Arc;

    use rustc_hash::FxHashMap;
    use tokio::sync::Semaphore;
    use tokio::task::JoinSet;

    let max_parallel = max_parallel
        .unwrap_or_else(default_max_parallel)
        .max(1);

    let mut join_set = JoinSet::new();
    let semaphore = Arc::new(Semaphore::new(max_parallel));
    let mut task_index = FxHashMap::default();
    let names: Vec<String> = jobs.iter().map(|j| j.name().to_string()).collect();

    for (index, job) in jobs.into_iter().enumerate() {
        let ctx = ctx.clone();
        let permits = Arc::clone(&semaphore);

        let handle = join_set.spawn(async move {
            let _permit = permits.acquire_owned().await.map_err(|e| {
                Error::unexpected_with("Build scheduler shut down", e.to_string())
            })?;
            build_package_ignoring_missing_deps(&ctx, &job.request).await
        });
        task_index.insert(handle.id(), index);
    }

    let mut slots: Vec<Option<Result<BuildResult>>> = (0..names.len()).map(|_| None).collect();
    while let Some(joined) = join_set.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(join_err) => (
                join_err.id(),
                Err(Error::unexpected_with(
                    "Build task panicked",
                    join_err.to_string(),
                )),
            ),
        };
        if let Some(&index) = task_index.get(&id) {
            slots[index] = Some(result);
        }
    }

    names
        .into_iter()
        .zip(slots)
        .map(|(name, slot)| {
            let result = slot
                .unwrap_or_else(|| Err(Error::unexpected("Build task finished without a result")));
            (name, result)
        })
        .collect()
}

/// Sequential fallback for single-threaded targets.
#[cfg(target_family = "wasm")]
pub async fn build_packages_concurrent(
    ctx: &BuildContext,
    jobs: Vec<PackageJob>,
    _max_parallel: Option<usize>,
) -> Vec<(String, Result<BuildResult>)> {
    let mut results = Vec::with_capacity(jobs.len());
    for job in jobs {
        let result = build_package_ignoring_missing_deps(ctx, &job.request).await;
        results.push((job.request.name, result));
    }
    results
}
