use crate::core::instances::TimeSeriesInstance;
use crate::distances::{Dtw, Euclidean, Independent, Lcss};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A distance between two series given as their dimensions.
///
/// `limit` is an early-abandon threshold: once the running distance provably
/// exceeds it an implementation may stop and return any value above `limit`.
/// Passing `f64::INFINITY` disables abandoning.
pub trait Distance {
    fn distance_between(&self, a: &[Vec<f64>], b: &[Vec<f64>], limit: f64) -> f64;

    fn distance(&self, a: &TimeSeriesInstance, b: &TimeSeriesInstance, limit: f64) -> f64 {
        self.distance_between(a.dimensions(), b.dimensions(), limit)
    }
}

/// A concrete, parameterised distance measure resolved for one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
pub enum DistanceMeasure {
    Euclidean(Euclidean),
    Dtw(Dtw),
    Lcss(Lcss),
    Independent(Independent),
}

impl DistanceMeasure {
    /// Wraps the measure so each dimension is compared on its own.
    pub fn independent(self) -> Self {
        match self {
            already @ DistanceMeasure::Independent(_) => already,
            other => DistanceMeasure::Independent(Independent::new(other)),
        }
    }
}

impl Distance for DistanceMeasure {
    fn distance_between(&self, a: &[Vec<f64>], b: &[Vec<f64>], limit: f64) -> f64 {
        match self {
            DistanceMeasure::Euclidean(m) => m.distance_between(a, b, limit),
            DistanceMeasure::Dtw(m) => m.distance_between(a, b, limit),
            DistanceMeasure::Lcss(m) => m.distance_between(a, b, limit),
            DistanceMeasure::Independent(m) => m.distance_between(a, b, limit),
        }
    }
}

impl fmt::Display for DistanceMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMeasure::Euclidean(_) => write!(f, "euclidean"),
            DistanceMeasure::Dtw(m) => write!(f, "dtw(window={:.3})", m.window()),
            DistanceMeasure::Lcss(m) => {
                write!(f, "lcss(epsilon={:.3}, window={:.3})", m.epsilon(), m.window())
            }
            DistanceMeasure::Independent(m) => write!(f, "independent({})", m.inner()),
        }
    }
}
