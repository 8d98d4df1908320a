//! Collaborator contracts: data-generating processes, methods, and metrics.

use serde::{Deserialize, Serialize};

use crate::errors::McError;
use crate::options::Options;
use crate::rng::RngHandle;

/// Regression-shaped dataset exchanged between DGPs and estimation methods.
///
/// The engine treats the dataset as opaque; only the collaborators agree on
/// its meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Observation-major design matrix.
    pub features: Vec<Vec<f64>>,
    /// Outcome per observation.
    pub outcomes: Vec<f64>,
}

impl DataSet {
    /// Number of observations.
    pub fn n_samples(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of features per observation.
    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }
}

/// Parameter vector produced by a DGP (ground truth) or a method (estimate).
pub type Estimate = Vec<f64>;

/// Value produced by an evaluation metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricValue {
    /// Single scalar score.
    Scalar(f64),
    /// Per-coordinate score vector.
    Vector(Vec<f64>),
}

/// Data-generating process: produces a synthetic dataset together with the
/// ground-truth parameter it was generated from.
///
/// Implementations must be pure up to the supplied RNG: two calls with the
/// same options and an identically seeded handle return identical output.
pub trait Dgp: Send + Sync {
    /// Generates one `(data, true_param)` instance.
    fn generate(&self, opts: &Options, rng: &mut RngHandle)
        -> Result<(DataSet, Estimate), McError>;
}

/// Estimation method: fits a parameter estimate to a dataset.
///
/// Randomized methods (sample splitting, subsampling) must draw exclusively
/// from the supplied handle, never from a global generator.
pub trait Method: Send + Sync {
    /// Computes a parameter estimate for the dataset.
    fn estimate(
        &self,
        data: &DataSet,
        opts: &Options,
        rng: &mut RngHandle,
    ) -> Result<Estimate, McError>;
}

/// Evaluation metric comparing an estimate to the ground truth.
pub trait Metric: Send + Sync {
    /// Scores the estimate against the true parameter.
    fn evaluate(&self, estimate: &Estimate, truth: &Estimate) -> Result<MetricValue, McError>;
}
