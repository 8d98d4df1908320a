//! Reference collaborators: a sparse linear DGP, least-squares estimators,
//! elementary error metrics, and CSV table "plots".
//!
//! These live behind the same narrow interfaces as any user-supplied
//! collaborator; the engine never depends on them.

use std::sync::Arc;

use nalgebra::{DMatrix, DVector};
use rand::Rng;
use rand_distr::StandardNormal;

use mcbench_core::{
    DataSet, Dgp, ErrorInfo, Estimate, McError, Method, Metric, MetricValue, OptValue, Options,
    RngHandle,
};
use mcbench_engine::{
    Aggregated, Config, Plot, PlotFilter, Registry, RunPlan, SweepPlot, SweepSetting,
};

fn opt_usize(opts: &Options, key: &str, default: usize) -> usize {
    opts.get(key).and_then(OptValue::as_usize).unwrap_or(default)
}

fn opt_f64(opts: &Options, key: &str, default: f64) -> f64 {
    opts.get(key).and_then(OptValue::as_f64).unwrap_or(default)
}

/// Sparse linear model: `y = x . theta + sigma_epsilon * eps`, with the first
/// `kappa_theta` coefficients equal to one and standard normal features.
pub struct LinearDgp;

impl Dgp for LinearDgp {
    fn generate(
        &self,
        opts: &Options,
        rng: &mut RngHandle,
    ) -> Result<(DataSet, Estimate), McError> {
        let n_samples = opt_usize(opts, "n_samples", 100);
        let dim_x = opt_usize(opts, "dim_x", 10);
        let kappa_theta = opt_usize(opts, "kappa_theta", 2).min(dim_x);
        let sigma_epsilon = opt_f64(opts, "sigma_epsilon", 1.0);

        let mut theta = vec![0.0; dim_x];
        for coef in theta.iter_mut().take(kappa_theta) {
            *coef = 1.0;
        }

        let mut features = Vec::with_capacity(n_samples);
        let mut outcomes = Vec::with_capacity(n_samples);
        for _ in 0..n_samples {
            let row: Vec<f64> = (0..dim_x).map(|_| rng.sample(StandardNormal)).collect();
            let noise: f64 = rng.sample(StandardNormal);
            let signal: f64 = row.iter().zip(&theta).map(|(x, t)| x * t).sum();
            outcomes.push(signal + sigma_epsilon * noise);
            features.push(row);
        }

        Ok((DataSet { features, outcomes }, theta))
    }
}

/// Solves the normal equations `(x'x + penalty * I) theta = x'y` by LU
/// decomposition. Pivoting is relative, so uniformly small feature scales do
/// not trip the singularity check.
fn solve_normal_equations(data: &DataSet, penalty: f64) -> Result<Estimate, McError> {
    let x = DMatrix::from_fn(data.n_samples(), data.n_features(), |i, j| {
        data.features[i][j]
    });
    let y = DVector::from_column_slice(&data.outcomes);
    let mut gram = x.transpose() * &x;
    for i in 0..gram.nrows() {
        gram[(i, i)] += penalty;
    }
    let moment = x.transpose() * y;
    let solution = gram.lu().solve(&moment).ok_or_else(|| {
        McError::Trial(
            ErrorInfo::new("singular-design", "normal equations are singular")
                .with_hint("increase n_samples or add an l2_penalty"),
        )
    })?;
    Ok(solution.iter().copied().collect())
}

/// Ordinary least squares via the normal equations.
pub struct OlsMethod;

impl Method for OlsMethod {
    fn estimate(
        &self,
        data: &DataSet,
        _opts: &Options,
        _rng: &mut RngHandle,
    ) -> Result<Estimate, McError> {
        solve_normal_equations(data, 0.0)
    }
}

/// Ridge regression; reads `l2_penalty` from `method_opts`.
pub struct RidgeMethod;

impl Method for RidgeMethod {
    fn estimate(
        &self,
        data: &DataSet,
        opts: &Options,
        _rng: &mut RngHandle,
    ) -> Result<Estimate, McError> {
        let penalty = opt_f64(opts, "l2_penalty", 1.0);
        solve_normal_equations(data, penalty)
    }
}

/// Sum of absolute coefficient errors.
pub struct L1Error;

impl Metric for L1Error {
    fn evaluate(&self, estimate: &Estimate, truth: &Estimate) -> Result<MetricValue, McError> {
        let total = estimate
            .iter()
            .zip(truth)
            .map(|(e, t)| (e - t).abs())
            .sum();
        Ok(MetricValue::Scalar(total))
    }
}

/// Euclidean coefficient error.
pub struct L2Error;

impl Metric for L2Error {
    fn evaluate(&self, estimate: &Estimate, truth: &Estimate) -> Result<MetricValue, McError> {
        let sq: f64 = estimate
            .iter()
            .zip(truth)
            .map(|(e, t)| (e - t) * (e - t))
            .sum();
        Ok(MetricValue::Scalar(sq.sqrt()))
    }
}

/// Per-coordinate signed error.
pub struct Bias;

impl Metric for Bias {
    fn evaluate(&self, estimate: &Estimate, truth: &Estimate) -> Result<MetricValue, McError> {
        Ok(MetricValue::Vector(
            estimate.iter().zip(truth).map(|(e, t)| e - t).collect(),
        ))
    }
}

fn scalarize(value: &MetricValue) -> f64 {
    match value {
        MetricValue::Scalar(v) => *v,
        MetricValue::Vector(vs) => {
            if vs.is_empty() {
                0.0
            } else {
                vs.iter().sum::<f64>() / vs.len() as f64
            }
        }
    }
}

fn mean_std(values: &[MetricValue]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let scalars: Vec<f64> = values.iter().map(scalarize).collect();
    let mean = scalars.iter().sum::<f64>() / scalars.len() as f64;
    let var = scalars.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / scalars.len() as f64;
    (mean, var.sqrt())
}

fn plot_error(err: impl ToString) -> McError {
    McError::Plot(ErrorInfo::new("table-write", err.to_string()))
}

/// Writes one `(dgp, method, metric, mean, std)` row per aggregate cell into
/// `summary_<identity>.csv` under the run's target directory.
pub struct SummaryTablePlot;

impl Plot for SummaryTablePlot {
    fn render(&self, aggregated: &Aggregated, plan: &RunPlan) -> Result<(), McError> {
        let path = plan
            .config()
            .target_dir
            .join(format!("summary_{}.csv", plan.run_identity()));
        let mut writer = csv::Writer::from_path(&path).map_err(plot_error)?;
        writer
            .write_record(["dgp", "method", "metric", "mean", "std"])
            .map_err(plot_error)?;
        for (dgp, per_method) in &aggregated.metrics {
            for (method, per_metric) in per_method {
                for (metric, values) in per_metric {
                    let (mean, std) = mean_std(values);
                    let mean = mean.to_string();
                    let std = std.to_string();
                    writer
                        .write_record([
                            dgp.as_str(),
                            method.as_str(),
                            metric.as_str(),
                            mean.as_str(),
                            std.as_str(),
                        ])
                        .map_err(plot_error)?;
                }
            }
        }
        writer.flush().map_err(plot_error)?;
        Ok(())
    }
}

fn setting_label(setting: &SweepSetting, subset: Option<&[String]>) -> String {
    setting
        .iter()
        .filter(|(key, _)| subset.map_or(true, |keys| keys.contains(key)))
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(";")
}

fn point_passes(setting: &SweepSetting, filter: &PlotFilter) -> bool {
    if let Some(select) = &filter.select_vals {
        for (dim, allowed) in select {
            if let Some((_, value)) = setting.iter().find(|(key, _)| key == dim) {
                if !allowed.contains(value) {
                    return false;
                }
            }
        }
    }
    if let Some(drop) = &filter.filter_vals {
        for (dim, rejected) in drop {
            if let Some((_, value)) = setting.iter().find(|(key, _)| key == dim) {
                if rejected.contains(value) {
                    return false;
                }
            }
        }
    }
    true
}

/// Writes one `(setting, dgp, method, metric, mean)` row per surviving sweep
/// point into `sweep_summary.csv` under the target directory.
pub struct SweepTablePlot;

impl SweepPlot for SweepTablePlot {
    fn render(
        &self,
        settings: &[SweepSetting],
        points: &[Aggregated],
        config: &Config,
        filter: &PlotFilter,
    ) -> Result<(), McError> {
        let path = config.target_dir.join("sweep_summary.csv");
        let mut writer = csv::Writer::from_path(&path).map_err(plot_error)?;
        writer
            .write_record(["setting", "dgp", "method", "metric", "mean"])
            .map_err(plot_error)?;
        for (setting, point) in settings.iter().zip(points) {
            if !point_passes(setting, filter) {
                continue;
            }
            let label = setting_label(setting, filter.param_subset.as_deref());
            for (dgp, per_method) in &point.metrics {
                for (method, per_metric) in per_method {
                    for (metric, values) in per_metric {
                        let (mean, _) = mean_std(values);
                        let mean = mean.to_string();
                        writer
                            .write_record([
                                label.as_str(),
                                dgp.as_str(),
                                method.as_str(),
                                metric.as_str(),
                                mean.as_str(),
                            ])
                            .map_err(plot_error)?;
                    }
                }
            }
        }
        writer.flush().map_err(plot_error)?;
        Ok(())
    }
}

/// Registry of every built-in collaborator, keyed by the names configuration
/// files reference.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_dgp("linear", Arc::new(LinearDgp));
    registry.register_method("ols", Arc::new(OlsMethod));
    registry.register_method("ridge", Arc::new(RidgeMethod));
    registry.register_metric("l1_error", Arc::new(L1Error));
    registry.register_metric("l2_error", Arc::new(L2Error));
    registry.register_metric("bias", Arc::new(Bias));
    registry.register_plot("summary_table", Arc::new(SummaryTablePlot));
    registry.register_sweep_plot("sweep_table", Arc::new(SweepTablePlot));
    registry
}
