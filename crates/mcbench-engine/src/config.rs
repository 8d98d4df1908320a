//! Run configuration and its validated, identity-carrying derivation.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use mcbench_core::errors::{ErrorInfo, McError};
use mcbench_core::options::{require_u64, require_usize, OptValue, Options};

use crate::identity;
use crate::registry::Registry;

/// Sections every configuration must carry, in validation order.
const REQUIRED_SECTIONS: [&str; 9] = [
    "dgps",
    "dgp_opts",
    "method_opts",
    "mc_opts",
    "metrics",
    "methods",
    "plots",
    "target_dir",
    "reload_results",
];

/// Value-selection triple forwarded unchanged to sweep-plot collaborators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlotFilter {
    /// Restrict plotted parameters to this subset.
    #[serde(default)]
    pub param_subset: Option<Vec<String>>,
    /// Keep only sweep points whose dimension takes one of these values.
    #[serde(default)]
    pub select_vals: Option<IndexMap<String, Vec<OptValue>>>,
    /// Drop sweep points whose dimension takes one of these values.
    #[serde(default)]
    pub filter_vals: Option<IndexMap<String, Vec<OptValue>>>,
}

/// One entry of the `sweep_plots` section: a bare registry name or a name
/// with an attached filter triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SweepPlotSpec {
    /// Plot referenced by name, no narrowing.
    Name(String),
    /// Plot with a value-selection filter.
    Filtered {
        /// Registry name of the plot.
        name: String,
        /// Narrowing options handed through to the collaborator.
        #[serde(flatten)]
        filter: PlotFilter,
    },
}

impl SweepPlotSpec {
    /// Registry name of the referenced plot.
    pub fn name(&self) -> &str {
        match self {
            SweepPlotSpec::Name(name) => name,
            SweepPlotSpec::Filtered { name, .. } => name,
        }
    }

    /// Filter triple for the plot; empty for bare names.
    pub fn filter(&self) -> PlotFilter {
        match self {
            SweepPlotSpec::Name(_) => PlotFilter::default(),
            SweepPlotSpec::Filtered { filter, .. } => filter.clone(),
        }
    }
}

/// Declarative run configuration.
///
/// Collaborator sections hold registry names; the option sections are
/// insertion-ordered mappings whose iteration order feeds the run identity.
/// A configuration is immutable once constructed; sweep points derive fresh
/// copies instead of mutating a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Names of the data-generating processes to run.
    pub dgps: Vec<String>,
    /// Names of the estimation methods to compare.
    pub methods: Vec<String>,
    /// Names of the evaluation metrics.
    pub metrics: Vec<String>,
    /// Names of single-run plot collaborators.
    pub plots: Vec<String>,
    /// Sweep-plot entries; required only in sweep mode.
    #[serde(default)]
    pub sweep_plots: Option<Vec<SweepPlotSpec>>,
    /// Options forwarded to every DGP. List values are sweep dimensions.
    pub dgp_opts: Options,
    /// Options forwarded to every method.
    pub method_opts: Options,
    /// Engine options; must contain `n_experiments` and `seed`, may contain
    /// `workers`.
    pub mc_opts: Options,
    /// Directory holding cache files and plot artefacts.
    pub target_dir: PathBuf,
    /// Whether an existing cache file short-circuits recomputation.
    pub reload_results: bool,
}

impl Config {
    /// Builds a configuration from a loosely typed document, failing with a
    /// config error that names the first missing required section.
    pub fn from_value(value: &Value) -> Result<Self, McError> {
        let object = value.as_object().ok_or_else(|| {
            McError::Config(ErrorInfo::new(
                "config-shape",
                "configuration must be a mapping",
            ))
        })?;
        for section in REQUIRED_SECTIONS {
            if !object.contains_key(section) {
                return Err(McError::Config(
                    ErrorInfo::new(
                        "missing-section",
                        format!("config must contain `{section}`"),
                    )
                    .with_context("section", section),
                ));
            }
        }
        serde_json::from_value(value.clone()).map_err(|err| {
            McError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })
    }

    /// Checks the `mc_opts` sub-keys the engine depends on.
    ///
    /// Runs before any trial or cache access; no side effects.
    pub fn validate(&self) -> Result<(), McError> {
        require_usize(&self.mc_opts, "mc_opts", "n_experiments")?;
        require_u64(&self.mc_opts, "mc_opts", "seed")?;
        Ok(())
    }
}

/// A validated configuration together with its derived run identity.
///
/// The identity is computed once at construction and never mutated; this is
/// the only form the engine executes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    config: Config,
    run_identity: String,
    n_experiments: usize,
    base_seed: u64,
    workers: Option<usize>,
}

impl RunPlan {
    /// Validates the configuration against the registry and derives the run
    /// identity.
    pub fn new(config: Config, registry: &Registry) -> Result<Self, McError> {
        config.validate()?;
        registry.check_names(&config)?;
        let n_experiments = require_usize(&config.mc_opts, "mc_opts", "n_experiments")?;
        let base_seed = require_u64(&config.mc_opts, "mc_opts", "seed")?;
        let workers = config
            .mc_opts
            .get("workers")
            .and_then(OptValue::as_usize);
        let run_identity =
            identity::run_identity(&config.mc_opts, &config.dgp_opts, &config.method_opts);
        Ok(Self {
            config,
            run_identity,
            n_experiments,
            base_seed,
            workers,
        })
    }

    /// The underlying configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Deterministic, filesystem-safe cache key for this configuration.
    pub fn run_identity(&self) -> &str {
        &self.run_identity
    }

    /// Number of independent trials to run.
    pub fn n_experiments(&self) -> usize {
        self.n_experiments
    }

    /// Base seed; trial `i` seeds from `base_seed + i`.
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Worker-thread override from `mc_opts.workers`, if any.
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }
}
