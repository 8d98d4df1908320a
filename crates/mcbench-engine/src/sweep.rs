//! Cartesian sweeps over sequence-valued DGP options.

use mcbench_core::errors::{ErrorInfo, McError};
use mcbench_core::options::OptValue;

use crate::aggregate::Aggregated;
use crate::config::Config;
use crate::registry::Registry;
use crate::run::MonteCarlo;

/// Ordered `(dimension, value)` assignment describing one sweep point.
pub type SweepSetting = Vec<(String, OptValue)>;

/// Settings and per-point aggregates collected by [`run_sweep`].
///
/// `settings[i]` is the assignment that produced `points[i]`; each
/// [`Aggregated`] carries that point's parameter and metric sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepOutcome {
    /// One assignment per Cartesian point, in enumeration order.
    pub settings: Vec<SweepSetting>,
    /// The independently computed aggregate of each point.
    pub points: Vec<Aggregated>,
}

/// Enumerates the Cartesian product of the sweep dimensions in lexicographic
/// order, the last-discovered dimension varying fastest. No dimensions yields
/// a single empty setting; an empty dimension yields no settings.
fn cartesian(dims: &[(String, Vec<OptValue>)]) -> Vec<SweepSetting> {
    if dims.iter().any(|(_, values)| values.is_empty()) {
        return Vec::new();
    }
    let mut out = Vec::new();
    let mut cursor = vec![0usize; dims.len()];
    loop {
        out.push(
            dims.iter()
                .zip(&cursor)
                .map(|((key, values), &idx)| (key.clone(), values[idx].clone()))
                .collect(),
        );
        let mut pos = dims.len();
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            cursor[pos] += 1;
            if cursor[pos] < dims[pos].1.len() {
                break;
            }
            cursor[pos] = 0;
        }
    }
}

/// Runs the single-run engine once per point of the sweep grid.
///
/// Sequence-valued `dgp_opts` entries are the sweep dimensions, discovered in
/// the mapping's iteration order; scalar entries are held fixed everywhere.
/// Each point derives a fresh configuration with the swept entries overridden
/// (no shared mutable configuration, so overrides cannot leak across points)
/// and runs validate → cache-or-compute → aggregate to completion before the
/// next point starts. Afterwards every configured sweep plot receives the
/// full collection together with its filter triple, passed through unchanged.
pub fn run_sweep(registry: &Registry, config: &Config) -> Result<SweepOutcome, McError> {
    let sweep_plots = config.sweep_plots.clone().ok_or_else(|| {
        McError::Config(
            ErrorInfo::new("missing-section", "config must contain `sweep_plots`")
                .with_context("section", "sweep_plots"),
        )
    })?;

    let dims: Vec<(String, Vec<OptValue>)> = config
        .dgp_opts
        .iter()
        .filter_map(|(key, value)| value.as_list().map(|list| (key.clone(), list.to_vec())))
        .collect();

    let mut outcome = SweepOutcome::default();
    for setting in cartesian(&dims) {
        let mut derived = config.clone();
        for (key, value) in &setting {
            // Overriding an existing key keeps its position, so the derived
            // identity stays aligned with the declared option order.
            derived.dgp_opts.insert(key.clone(), value.clone());
        }
        let aggregated = MonteCarlo::new(registry, derived)?.run_without_plots()?;
        outcome.settings.push(setting);
        outcome.points.push(aggregated);
    }

    for spec in &sweep_plots {
        registry.sweep_plot(spec.name())?.render(
            &outcome.settings,
            &outcome.points,
            config,
            &spec.filter(),
        )?;
    }

    Ok(outcome)
}
