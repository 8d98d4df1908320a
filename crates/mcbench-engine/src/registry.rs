//! Typed, name-keyed registry of collaborators.
//!
//! Configurations reference DGPs, methods, metrics, and plots by name;
//! dispatch is an explicit map lookup against one of the fixed collaborator
//! signatures, never dynamic attribute resolution.

use std::sync::Arc;

use indexmap::IndexMap;

use mcbench_core::data::{Dgp, Method, Metric};
use mcbench_core::errors::{ErrorInfo, McError};

use crate::aggregate::Aggregated;
use crate::config::{Config, PlotFilter, RunPlan};
use crate::sweep::SweepSetting;

/// Single-run plot collaborator: renders one aggregated result set.
pub trait Plot: Send + Sync {
    /// Renders the aggregate; artefact placement is up to the collaborator.
    fn render(&self, aggregated: &Aggregated, plan: &RunPlan) -> Result<(), McError>;
}

/// Sweep plot collaborator: renders the full collection of per-point
/// aggregates, optionally narrowed by the caller-supplied filter triple.
pub trait SweepPlot: Send + Sync {
    /// Renders the sweep; `settings[i]` describes `points[i]`.
    fn render(
        &self,
        settings: &[SweepSetting],
        points: &[Aggregated],
        config: &Config,
        filter: &PlotFilter,
    ) -> Result<(), McError>;
}

/// Name-keyed collaborator registry.
#[derive(Default, Clone)]
pub struct Registry {
    dgps: IndexMap<String, Arc<dyn Dgp>>,
    methods: IndexMap<String, Arc<dyn Method>>,
    metrics: IndexMap<String, Arc<dyn Metric>>,
    plots: IndexMap<String, Arc<dyn Plot>>,
    sweep_plots: IndexMap<String, Arc<dyn SweepPlot>>,
}

fn unknown(kind: &str, name: &str) -> McError {
    McError::Config(
        ErrorInfo::new("unknown-name", format!("no {kind} named `{name}` is registered"))
            .with_context("kind", kind)
            .with_context("name", name),
    )
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a data-generating process under `name`.
    pub fn register_dgp(&mut self, name: impl Into<String>, dgp: Arc<dyn Dgp>) {
        self.dgps.insert(name.into(), dgp);
    }

    /// Registers an estimation method under `name`.
    pub fn register_method(&mut self, name: impl Into<String>, method: Arc<dyn Method>) {
        self.methods.insert(name.into(), method);
    }

    /// Registers an evaluation metric under `name`.
    pub fn register_metric(&mut self, name: impl Into<String>, metric: Arc<dyn Metric>) {
        self.metrics.insert(name.into(), metric);
    }

    /// Registers a single-run plot under `name`.
    pub fn register_plot(&mut self, name: impl Into<String>, plot: Arc<dyn Plot>) {
        self.plots.insert(name.into(), plot);
    }

    /// Registers a sweep plot under `name`.
    pub fn register_sweep_plot(&mut self, name: impl Into<String>, plot: Arc<dyn SweepPlot>) {
        self.sweep_plots.insert(name.into(), plot);
    }

    /// Looks up a DGP by name.
    pub fn dgp(&self, name: &str) -> Result<&Arc<dyn Dgp>, McError> {
        self.dgps.get(name).ok_or_else(|| unknown("dgp", name))
    }

    /// Looks up a method by name.
    pub fn method(&self, name: &str) -> Result<&Arc<dyn Method>, McError> {
        self.methods.get(name).ok_or_else(|| unknown("method", name))
    }

    /// Looks up a metric by name.
    pub fn metric(&self, name: &str) -> Result<&Arc<dyn Metric>, McError> {
        self.metrics.get(name).ok_or_else(|| unknown("metric", name))
    }

    /// Looks up a single-run plot by name.
    pub fn plot(&self, name: &str) -> Result<&Arc<dyn Plot>, McError> {
        self.plots.get(name).ok_or_else(|| unknown("plot", name))
    }

    /// Looks up a sweep plot by name.
    pub fn sweep_plot(&self, name: &str) -> Result<&Arc<dyn SweepPlot>, McError> {
        self.sweep_plots
            .get(name)
            .ok_or_else(|| unknown("sweep_plot", name))
    }

    /// Verifies that every collaborator a configuration names resolves here.
    pub fn check_names(&self, config: &Config) -> Result<(), McError> {
        for name in &config.dgps {
            self.dgp(name)?;
        }
        for name in &config.methods {
            self.method(name)?;
        }
        for name in &config.metrics {
            self.metric(name)?;
        }
        for name in &config.plots {
            self.plot(name)?;
        }
        if let Some(sweep_plots) = &config.sweep_plots {
            for spec in sweep_plots {
                self.sweep_plot(spec.name())?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("dgps", &self.dgps.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("metrics", &self.metrics.keys().collect::<Vec<_>>())
            .field("plots", &self.plots.keys().collect::<Vec<_>>())
            .field("sweep_plots", &self.sweep_plots.keys().collect::<Vec<_>>())
            .finish()
    }
}
