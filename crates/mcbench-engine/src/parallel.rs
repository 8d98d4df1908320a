//! Bulk-synchronous fan-out/fan-in over independent trials.

use rayon::prelude::*;

use mcbench_core::errors::{ErrorInfo, McError};
use mcbench_core::rng::trial_seed;

use crate::config::RunPlan;
use crate::registry::Registry;
use crate::runner::{run_trial, ResultBundle};

/// Runs every trial of the plan across a worker pool and joins the results
/// in trial-id order.
///
/// Trials share no mutable state beyond the read-only plan and registry, so
/// output is independent of worker count and completion order. Collecting
/// into `Result` short-circuits on the first failing trial; results of
/// in-flight siblings are discarded and no partial bundle is returned.
pub fn run_all(registry: &Registry, plan: &RunPlan) -> Result<ResultBundle, McError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.workers().unwrap_or(0))
        .build()
        .map_err(|err| {
            McError::Trial(ErrorInfo::new("thread-pool", err.to_string()))
        })?;

    let results: Result<Vec<(usize, _)>, McError> = pool.install(|| {
        (0..plan.n_experiments())
            .into_par_iter()
            .map(|trial_id| {
                run_trial(registry, plan, trial_seed(plan.base_seed(), trial_id))
                    .map(|trial| (trial_id, trial))
            })
            .collect()
    });

    let mut ordered = results?;
    ordered.sort_by_key(|(trial_id, _)| *trial_id);
    Ok(ordered.into_iter().map(|(_, trial)| trial).collect())
}
