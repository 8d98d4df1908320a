//! Reshaping per-trial records into trial-indexed sequences.

use indexmap::IndexMap;

use mcbench_core::data::{Estimate, MetricValue};
use mcbench_core::errors::{ErrorInfo, McError};

use crate::runner::TrialResult;

/// Aggregated results: for each (dgp, method) a trial-ordered sequence of
/// parameter estimates, and for each (dgp, method, metric) a trial-ordered
/// sequence of metric values. Every sequence has length `n_experiments`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregated {
    /// `params[dgp][method][trial]`.
    pub params: IndexMap<String, IndexMap<String, Vec<Estimate>>>,
    /// `metrics[dgp][method][metric][trial]`.
    pub metrics: IndexMap<String, IndexMap<String, IndexMap<String, Vec<MetricValue>>>>,
}

fn missing(kind: &str, dgp: &str, method: &str, metric: Option<&str>, trial: usize) -> McError {
    let mut info = ErrorInfo::new(
        kind,
        format!("trial result lacks an expected {} entry", match metric {
            Some(_) => "(dgp, method, metric)",
            None => "(dgp, method)",
        }),
    )
    .with_context("dgp", dgp)
    .with_context("method", method)
    .with_context("trial", trial.to_string())
    .with_hint("the bundle may come from a different configuration with a colliding run identity");
    if let Some(metric) = metric {
        info = info.with_context("metric", metric);
    }
    McError::Aggregation(info)
}

/// Reshapes a bundle into trial-indexed sequences keyed by the configured
/// collaborator names.
///
/// Partial results are not tolerated: any trial missing an expected entry is
/// a fatal aggregation error. This also detects a mismatch between the
/// configuration used for aggregation and the one that produced a cached
/// bundle.
pub fn aggregate(
    bundle: &[TrialResult],
    dgps: &[String],
    methods: &[String],
    metrics: &[String],
) -> Result<Aggregated, McError> {
    let mut out = Aggregated::default();

    for dgp in dgps {
        let param_row = out.params.entry(dgp.clone()).or_default();
        let metric_row = out.metrics.entry(dgp.clone()).or_default();
        for method in methods {
            let mut estimates = Vec::with_capacity(bundle.len());
            for (trial, result) in bundle.iter().enumerate() {
                let estimate = result
                    .param_estimates
                    .get(dgp)
                    .and_then(|per_dgp| per_dgp.get(method))
                    .ok_or_else(|| missing("missing-estimate", dgp, method, None, trial))?;
                estimates.push(estimate.clone());
            }
            param_row.insert(method.clone(), estimates);

            let per_metric = metric_row.entry(method.clone()).or_default();
            for metric in metrics {
                let mut values = Vec::with_capacity(bundle.len());
                for (trial, result) in bundle.iter().enumerate() {
                    let value = result
                        .metric_results
                        .get(dgp)
                        .and_then(|per_dgp| per_dgp.get(method))
                        .and_then(|per_method| per_method.get(metric))
                        .ok_or_else(|| {
                            missing("missing-metric", dgp, method, Some(metric), trial)
                        })?;
                    values.push(value.clone());
                }
                per_metric.insert(metric.clone(), values);
            }
        }
    }

    Ok(out)
}
