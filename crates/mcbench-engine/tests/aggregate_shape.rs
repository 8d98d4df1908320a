use std::path::PathBuf;
use std::sync::Arc;

use rand::RngCore;
use tempfile::tempdir;

use mcbench_core::{
    derive_substream_seed, trial_seed, DataSet, Dgp, Estimate, McError, Method, Metric,
    MetricValue, OptValue, Options, RngHandle,
};
use mcbench_engine::{Config, MonteCarlo, Registry};

struct ProbeDgp;

impl Dgp for ProbeDgp {
    fn generate(
        &self,
        _opts: &Options,
        rng: &mut RngHandle,
    ) -> Result<(DataSet, Estimate), McError> {
        let x = rng.next_u64() as f64;
        Ok((
            DataSet {
                features: vec![vec![x]],
                outcomes: vec![x],
            },
            vec![x],
        ))
    }
}

struct EchoMethod;

impl Method for EchoMethod {
    fn estimate(
        &self,
        data: &DataSet,
        _opts: &Options,
        _rng: &mut RngHandle,
    ) -> Result<Estimate, McError> {
        Ok(vec![data.outcomes[0]])
    }
}

struct HalfMethod;

impl Method for HalfMethod {
    fn estimate(
        &self,
        data: &DataSet,
        _opts: &Options,
        _rng: &mut RngHandle,
    ) -> Result<Estimate, McError> {
        Ok(vec![data.outcomes[0] / 2.0])
    }
}

struct AbsError;

impl Metric for AbsError {
    fn evaluate(&self, estimate: &Estimate, truth: &Estimate) -> Result<MetricValue, McError> {
        Ok(MetricValue::Scalar((estimate[0] - truth[0]).abs()))
    }
}

struct Identity;

impl Metric for Identity {
    fn evaluate(&self, estimate: &Estimate, _truth: &Estimate) -> Result<MetricValue, McError> {
        Ok(MetricValue::Vector(estimate.clone()))
    }
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_dgp("probe", Arc::new(ProbeDgp));
    registry.register_method("echo", Arc::new(EchoMethod));
    registry.register_method("half", Arc::new(HalfMethod));
    registry.register_metric("abs_err", Arc::new(AbsError));
    registry.register_metric("identity", Arc::new(Identity));
    registry
}

fn opts(pairs: &[(&str, OptValue)]) -> Options {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn config(target_dir: PathBuf, n: i64, seed: i64) -> Config {
    Config {
        dgps: vec!["probe".into()],
        methods: vec!["echo".into(), "half".into()],
        metrics: vec!["abs_err".into(), "identity".into()],
        plots: Vec::new(),
        sweep_plots: None,
        dgp_opts: opts(&[]),
        method_opts: opts(&[]),
        mc_opts: opts(&[
            ("n_experiments", OptValue::Int(n)),
            ("seed", OptValue::Int(seed)),
        ]),
        target_dir,
        reload_results: false,
    }
}

/// First draw of the probe DGP's substream for a given trial.
fn expected_probe(base: u64, trial: usize) -> f64 {
    let seed = derive_substream_seed(trial_seed(base, trial), 0);
    RngHandle::from_seed(seed).next_u64() as f64
}

#[test]
fn sequences_have_length_n_in_trial_order() {
    let dir = tempdir().unwrap();
    let registry = registry();
    let n = 5usize;
    let base = 900u64;

    let aggregated = MonteCarlo::new(&registry, config(dir.path().to_path_buf(), n as i64, base as i64))
        .unwrap()
        .run()
        .unwrap();

    for method in ["echo", "half"] {
        let estimates = &aggregated.params["probe"][method];
        assert_eq!(estimates.len(), n);
        for metric in ["abs_err", "identity"] {
            assert_eq!(aggregated.metrics["probe"][method][metric].len(), n);
        }
    }

    for trial in 0..n {
        let x = expected_probe(base, trial);
        assert_eq!(aggregated.params["probe"]["echo"][trial], vec![x]);
        assert_eq!(aggregated.params["probe"]["half"][trial], vec![x / 2.0]);
        assert_eq!(
            aggregated.metrics["probe"]["echo"]["abs_err"][trial],
            MetricValue::Scalar(0.0)
        );
        assert_eq!(
            aggregated.metrics["probe"]["half"]["identity"][trial],
            MetricValue::Vector(vec![x / 2.0])
        );
    }
}

#[test]
fn aggregation_rejects_bundles_missing_entries() {
    use mcbench_engine::aggregate;
    use mcbench_engine::TrialResult;

    let bundle = vec![TrialResult::default()];
    let err = aggregate(
        &bundle,
        &["probe".to_string()],
        &["echo".to_string()],
        &[],
    )
    .unwrap_err();
    match err {
        McError::Aggregation(info) => {
            assert_eq!(info.code, "missing-estimate");
            assert_eq!(info.context["dgp"], "probe");
            assert_eq!(info.context["trial"], "0");
        }
        other => panic!("expected aggregation error, got {other:?}"),
    }
}
