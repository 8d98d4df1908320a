//! Single-trial execution.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use mcbench_core::data::{Estimate, MetricValue};
use mcbench_core::rng::{derive_substream_seed, RngHandle};
use mcbench_core::McError;

use crate::config::RunPlan;
use crate::registry::Registry;

/// Outputs of one trial: estimates keyed by `[dgp][method]` and metric
/// values keyed by `[dgp][method][metric]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrialResult {
    /// Parameter estimate per (dgp, method).
    pub param_estimates: IndexMap<String, IndexMap<String, Estimate>>,
    /// Metric value per (dgp, method, metric).
    pub metric_results: IndexMap<String, IndexMap<String, IndexMap<String, MetricValue>>>,
}

/// Ordered sequence of trial results, index = trial-id offset. The unit
/// persisted to and loaded from the cache.
pub type ResultBundle = Vec<TrialResult>;

/// Runs one trial under the given seed.
///
/// The seed must derive solely from `base_seed + trial_id`; every DGP and
/// method receives its own SipHash-derived substream of it, so collaborators
/// cannot perturb each other's draws and repeated calls with the same seed
/// reproduce bit-identically wherever they execute. Any collaborator error
/// propagates unmodified and aborts the whole batch.
pub fn run_trial(
    registry: &Registry,
    plan: &RunPlan,
    seed: u64,
) -> Result<TrialResult, McError> {
    let config = plan.config();
    let mut result = TrialResult::default();

    for (dgp_idx, dgp_name) in config.dgps.iter().enumerate() {
        let dgp_seed = derive_substream_seed(seed, dgp_idx as u64);
        let mut dgp_rng = RngHandle::from_seed(dgp_seed);
        let (data, truth) = registry
            .dgp(dgp_name)?
            .generate(&config.dgp_opts, &mut dgp_rng)?;

        let estimates = result
            .param_estimates
            .entry(dgp_name.clone())
            .or_default();
        let metrics = result.metric_results.entry(dgp_name.clone()).or_default();

        for (method_idx, method_name) in config.methods.iter().enumerate() {
            let mut method_rng =
                RngHandle::from_seed(derive_substream_seed(dgp_seed, 1 + method_idx as u64));
            let estimate = registry.method(method_name)?.estimate(
                &data,
                &config.method_opts,
                &mut method_rng,
            )?;

            let per_method = metrics.entry(method_name.clone()).or_default();
            for metric_name in &config.metrics {
                let value = registry
                    .metric(metric_name)?
                    .evaluate(&estimate, &truth)?;
                per_method.insert(metric_name.clone(), value);
            }
            estimates.insert(method_name.clone(), estimate);
        }
    }

    Ok(result)
}
