//! Disk-backed memoization of result bundles, keyed by run identity.
//!
//! A run either fully trusts an existing cache file or fully recomputes and
//! overwrites it; the file is never partially updated. No locking protects
//! concurrent writers racing on the same identity — an acknowledged hazard.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mcbench_core::errors::{ErrorInfo, McError};
use mcbench_core::options::Options;

use crate::config::RunPlan;
use crate::runner::ResultBundle;

/// Compact description of the configuration sections that fed the identity,
/// embedded in every cache entry so a later aggregation mismatch can be
/// diagnosed as a key collision rather than silent wrong data. There is no
/// staleness detection beyond key-string equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Stringified `mc_opts` pairs in iteration order.
    pub mc_opts: Vec<(String, String)>,
    /// Stringified `dgp_opts` pairs in iteration order.
    pub dgp_opts: Vec<(String, String)>,
    /// Stringified `method_opts` pairs in iteration order.
    pub method_opts: Vec<(String, String)>,
}

fn stringify(opts: &Options) -> Vec<(String, String)> {
    opts.iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

impl CacheManifest {
    /// Captures the identity-contributing sections of a plan.
    pub fn from_plan(plan: &RunPlan) -> Self {
        let config = plan.config();
        Self {
            mc_opts: stringify(&config.mc_opts),
            dgp_opts: stringify(&config.dgp_opts),
            method_opts: stringify(&config.method_opts),
        }
    }
}

/// On-disk cache payload: identity, manifest, and the full ordered bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Identity string the entry was stored under.
    pub run_identity: String,
    /// Sections used to build that identity.
    pub manifest: CacheManifest,
    /// Per-trial results in trial-id order.
    pub bundle: ResultBundle,
}

/// Cache file path for a plan.
pub fn results_path(plan: &RunPlan) -> PathBuf {
    plan.config()
        .target_dir
        .join(format!("results_{}.bin", plan.run_identity()))
}

fn cache_error(code: &str, err: impl ToString, path: &Path) -> McError {
    McError::Cache(
        ErrorInfo::new(code, err.to_string())
            .with_context("path", path.display().to_string()),
    )
}

/// Loads the bundle cached for this plan's identity.
///
/// Returns `Ok(None)` when reloading is disabled or no file exists. A file
/// that exists but cannot be decoded is a fatal cache error; there is no
/// silent fallback to recomputation. Hits are trusted unconditionally, so a
/// semantically different configuration with a colliding identity silently
/// reuses a stale bundle.
pub fn load(plan: &RunPlan) -> Result<Option<ResultBundle>, McError> {
    if !plan.config().reload_results {
        return Ok(None);
    }
    let path = results_path(plan);
    if !path.exists() {
        return Ok(None);
    }
    let bytes = fs::read(&path).map_err(|err| cache_error("cache-read", err, &path))?;
    let entry: CacheEntry =
        bincode::deserialize(&bytes).map_err(|err| cache_error("cache-decode", err, &path))?;
    if entry.run_identity != plan.run_identity() {
        return Err(McError::Cache(
            ErrorInfo::new(
                "cache-identity-mismatch",
                "cache file was stored under a different run identity",
            )
            .with_context("path", path.display().to_string())
            .with_context("stored", entry.run_identity)
            .with_context("expected", plan.run_identity())
            .with_hint("the file was moved or renamed; delete it to recompute"),
        ));
    }
    Ok(Some(entry.bundle))
}

/// Stores a freshly computed bundle, overwriting whatever existed at the
/// identity-derived path. Creates `target_dir` recursively if absent.
pub fn store(plan: &RunPlan, bundle: &ResultBundle) -> Result<(), McError> {
    let path = results_path(plan);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| cache_error("cache-mkdir", err, parent))?;
    }
    let entry = CacheEntry {
        run_identity: plan.run_identity().to_string(),
        manifest: CacheManifest::from_plan(plan),
        bundle: bundle.clone(),
    };
    let bytes = bincode::serialize(&entry)
        .map_err(|err| cache_error("cache-encode", err, &path))?;
    fs::write(&path, bytes).map_err(|err| cache_error("cache-write", err, &path))
}
