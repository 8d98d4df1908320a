//! Deterministic, filesystem-safe run-identity strings.
//!
//! The identity concatenates every `(key, value)` pair of `mc_opts`,
//! `dgp_opts`, and `method_opts` in each mapping's own iteration order. Keys
//! are not sorted, so identity is sensitive to insertion order. Sections not
//! listed here (notably `metrics`) do not contribute: two configurations
//! differing only in those sections collide on identity and share a cache
//! file. This is a deliberate, documented cache-key limitation.

use mcbench_core::options::Options;

/// Replaces characters unsafe in file paths with `-`.
pub fn filesafe(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Identity fragment for a single option mapping.
pub fn fragment(opts: &Options) -> String {
    opts.iter()
        .map(|(key, value)| format!("{}_{}", filesafe(key), filesafe(&value.to_string())))
        .collect::<Vec<_>>()
        .join("_")
}

/// Full run identity over the three contributing option sections.
pub fn run_identity(mc_opts: &Options, dgp_opts: &Options, method_opts: &Options) -> String {
    [fragment(mc_opts), fragment(dgp_opts), fragment(method_opts)].join("_")
}
