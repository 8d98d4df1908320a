use std::path::PathBuf;
use std::sync::Arc;

use rand::RngCore;
use tempfile::tempdir;

use mcbench_core::{
    derive_substream_seed, trial_seed, DataSet, Dgp, ErrorInfo, Estimate, McError, Method, Metric,
    MetricValue, OptValue, Options, RngHandle,
};
use mcbench_engine::{cache, Config, MonteCarlo, Registry};

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

/// Fails exactly on the dataset generated by one poisoned trial.
struct PoisonedMethod {
    poison: f64,
}

impl Method for PoisonedMethod {
    fn estimate(
        &self,
        data: &DataSet,
        _opts: &Options,
        _rng: &mut RngHandle,
    ) -> Result<Estimate, McError> {
        if data.outcomes[0] == self.poison {
            return Err(McError::Trial(
                ErrorInfo::new("diverged", "estimator failed to converge")
                    .with_context("method", "poisoned"),
            ));
        }
        Ok(vec![data.outcomes[0]])
    }
}

struct First;

impl Metric for First {
    fn evaluate(&self, estimate: &Estimate, _truth: &Estimate) -> Result<MetricValue, McError> {
        Ok(MetricValue::Scalar(estimate[0]))
    }
}

fn opts(pairs: &[(&str, OptValue)]) -> Options {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn config(target_dir: PathBuf) -> Config {
    Config {
        dgps: vec!["probe".into()],
        methods: vec!["poisoned".into()],
        metrics: vec!["first".into()],
        plots: Vec::new(),
        sweep_plots: None,
        dgp_opts: opts(&[]),
        method_opts: opts(&[]),
        mc_opts: opts(&[
            ("n_experiments", OptValue::Int(10)),
            ("seed", OptValue::Int(333)),
        ]),
        target_dir,
        reload_results: false,
    }
}

fn probe_value(base: u64, trial: usize) -> f64 {
    let seed = derive_substream_seed(trial_seed(base, trial), 0);
    RngHandle::from_seed(seed).next_u64() as f64
}

#[test]
fn method_failure_in_one_trial_aborts_the_batch() {
    let dir = tempdir().unwrap();
    let mut registry = Registry::new();
    registry.register_dgp("probe", Arc::new(ProbeDgp));
    registry.register_method(
        "poisoned",
        Arc::new(PoisonedMethod {
            poison: probe_value(333, 3),
        }),
    );
    registry.register_metric("first", Arc::new(First));

    let mc = MonteCarlo::new(&registry, config(dir.path().to_path_buf())).unwrap();
    let err = mc.run().unwrap_err();

    // The originating error surfaces unmodified.
    match err {
        McError::Trial(info) => assert_eq!(info.code, "diverged"),
        other => panic!("expected trial error, got {other:?}"),
    }

    // No partial bundle was persisted for trials 0-2.
    assert!(!cache::results_path(mc.plan()).exists());
}
