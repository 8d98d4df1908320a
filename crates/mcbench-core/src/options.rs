//! Ordered option mappings shared by configurations and collaborators.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, McError};

/// A single configuration option value.
///
/// Scalars configure a fixed setting; a `List` under `dgp_opts` marks a sweep
/// dimension whose values span one axis of the Cartesian grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptValue {
    /// Boolean flag.
    Bool(bool),
    /// Integer setting (counts, dimensions, seeds).
    Int(i64),
    /// Floating point setting (variances, penalties).
    Float(f64),
    /// Free-form string setting.
    Str(String),
    /// Sequence of values; a sweep dimension when it appears in `dgp_opts`.
    List(Vec<OptValue>),
}

/// Insertion-ordered option mapping.
///
/// Iteration order is the mapping's own insertion order; the run-identity
/// builder deliberately does not sort keys, so callers that care about
/// identity stability across runs must populate options in a fixed order.
pub type Options = IndexMap<String, OptValue>;

impl OptValue {
    /// Returns the value as an unsigned integer when it is a non-negative int.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            OptValue::Int(v) if *v >= 0 => Some(*v as u64),
            _ => None,
        }
    }

    /// Returns the value as a count when it is a non-negative integer that
    /// fits the platform word.
    pub fn as_usize(&self) -> Option<usize> {
        self.as_u64().and_then(|v| usize::try_from(v).ok())
    }

    /// Returns the value as a float, coercing integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptValue::Int(v) => Some(*v as f64),
            OptValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the underlying sequence when the value is a list.
    pub fn as_list(&self) -> Option<&[OptValue]> {
        match self {
            OptValue::List(values) => Some(values),
            _ => None,
        }
    }

    /// True when the value is a sequence (a sweep dimension in `dgp_opts`).
    pub fn is_list(&self) -> bool {
        matches!(self, OptValue::List(_))
    }
}

impl Display for OptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptValue::Bool(v) => write!(f, "{v}"),
            OptValue::Int(v) => write!(f, "{v}"),
            OptValue::Float(v) => write!(f, "{v}"),
            OptValue::Str(v) => write!(f, "{v}"),
            OptValue::List(values) => {
                // Lists compress to their numeric range so a sweep-level
                // mapping still yields a bounded identity string.
                let numeric: Option<Vec<f64>> =
                    values.iter().map(OptValue::as_f64).collect();
                match numeric {
                    Some(nums) if !nums.is_empty() => {
                        let min = nums.iter().copied().fold(f64::INFINITY, f64::min);
                        let max = nums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                        write!(f, "{min}_to_{max}")
                    }
                    _ => match (values.first(), values.last()) {
                        (Some(first), Some(last)) => write!(f, "{first}_to_{last}"),
                        _ => write!(f, "empty"),
                    },
                }
            }
        }
    }
}

/// Fetches a required count from an option mapping.
pub fn require_usize(opts: &Options, section: &str, key: &str) -> Result<usize, McError> {
    opts.get(key).and_then(OptValue::as_usize).ok_or_else(|| {
        McError::Config(
            ErrorInfo::new(
                "missing-opt",
                format!("`{section}` must contain a non-negative integer `{key}`"),
            )
            .with_context("section", section)
            .with_context("key", key),
        )
    })
}

/// Fetches a required unsigned integer from an option mapping.
pub fn require_u64(opts: &Options, section: &str, key: &str) -> Result<u64, McError> {
    opts.get(key).and_then(OptValue::as_u64).ok_or_else(|| {
        McError::Config(
            ErrorInfo::new(
                "missing-opt",
                format!("`{section}` must contain a non-negative integer `{key}`"),
            )
            .with_context("section", section)
            .with_context("key", key),
        )
    })
}
