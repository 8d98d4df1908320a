#![deny(missing_docs)]
#![doc = "Core types and collaborator contracts for the mcbench Monte Carlo harness."]

pub mod data;
pub mod errors;
pub mod options;
pub mod rng;

pub use data::{DataSet, Dgp, Estimate, Method, Metric, MetricValue};
pub use errors::{ErrorInfo, McError};
pub use options::{require_u64, require_usize, OptValue, Options};
pub use rng::{derive_substream_seed, trial_seed, RngHandle};
