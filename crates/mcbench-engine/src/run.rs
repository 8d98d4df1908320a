//! The single-configuration engine: validate, cache-or-compute, aggregate,
//! dispatch plots.

use mcbench_core::McError;

use crate::aggregate::{aggregate, Aggregated};
use crate::cache;
use crate::config::{Config, RunPlan};
use crate::parallel;
use crate::registry::Registry;

/// One Monte Carlo study over a single validated configuration.
pub struct MonteCarlo<'r> {
    registry: &'r Registry,
    plan: RunPlan,
}

impl std::fmt::Debug for MonteCarlo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonteCarlo")
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl<'r> MonteCarlo<'r> {
    /// Validates the configuration and derives its run identity.
    ///
    /// Fails before any trial or cache access when a required key is missing
    /// or a named collaborator is not registered.
    pub fn new(registry: &'r Registry, config: Config) -> Result<Self, McError> {
        let plan = RunPlan::new(config, registry)?;
        Ok(Self { registry, plan })
    }

    /// The validated plan this study executes.
    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Runs the study to completion and dispatches the configured plots.
    pub fn run(&self) -> Result<Aggregated, McError> {
        let aggregated = self.run_without_plots()?;
        for name in &self.plan.config().plots {
            self.registry.plot(name)?.render(&aggregated, &self.plan)?;
        }
        Ok(aggregated)
    }

    /// Runs the study without plot dispatch (used per sweep point).
    ///
    /// A cache hit under this plan's identity short-circuits recomputation
    /// and is trusted unconditionally; otherwise every trial runs and the
    /// fresh bundle overwrites the cache file before aggregation.
    pub fn run_without_plots(&self) -> Result<Aggregated, McError> {
        let bundle = match cache::load(&self.plan)? {
            Some(bundle) => bundle,
            None => {
                let bundle = parallel::run_all(self.registry, &self.plan)?;
                cache::store(&self.plan, &bundle)?;
                bundle
            }
        };
        let config = self.plan.config();
        aggregate(&bundle, &config.dgps, &config.methods, &config.metrics)
    }
}
