#![deny(missing_docs)]
#![doc = "Orchestration engine for the mcbench Monte Carlo comparison harness: \
deterministic per-trial seeding, parallel fan-out/fan-in, disk-backed \
memoization, multi-key aggregation, and Cartesian sweep composition."]

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod identity;
pub mod parallel;
pub mod registry;
pub mod run;
pub mod runner;
pub mod sweep;

pub use aggregate::{aggregate, Aggregated};
pub use cache::{CacheEntry, CacheManifest};
pub use config::{Config, PlotFilter, RunPlan, SweepPlotSpec};
pub use registry::{Plot, Registry, SweepPlot};
pub use run::MonteCarlo;
pub use runner::{run_trial, ResultBundle, TrialResult};
pub use sweep::{run_sweep, SweepOutcome, SweepSetting};
