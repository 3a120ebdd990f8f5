use crate::core::instances::TimeSeriesInstance;
use crate::distances::{DistanceMeasure, Dtw, Euclidean, Lcss};
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// A family of distance measures with its parameter ranges, sampled once per
/// candidate split.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DistanceMeasureSpace {
    Euclidean,
    /// Unconstrained warping.
    DtwFullWindow,
    /// Warping window drawn uniformly from `[0, 1]`.
    DtwRestrictedWindow,
    /// Epsilon drawn from `[0.2 sd, sd]` of the node's values, window from `[0, 0.25]`.
    LcssRestricted,
}

impl DistanceMeasureSpace {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Euclidean,
            Self::DtwFullWindow,
            Self::DtwRestrictedWindow,
            Self::LcssRestricted,
        ]
    }

    /// Draws a concrete measure. `instances` is only walked by spaces whose
    /// ranges depend on the data.
    pub fn sample<'a, R, I>(&self, instances: I, rng: &mut R) -> DistanceMeasure
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = Cow<'a, TimeSeriesInstance>>,
    {
        match self {
            Self::Euclidean => DistanceMeasure::Euclidean(Euclidean),
            Self::DtwFullWindow => DistanceMeasure::Dtw(Dtw::full_window()),
            Self::DtwRestrictedWindow => DistanceMeasure::Dtw(Dtw::new(rng.random_range(0.0..=1.0))),
            Self::LcssRestricted => {
                let sd = standard_deviation(instances);
                let epsilon = rng.random_range(0.2 * sd..=sd);
                let window = rng.random_range(0.0..=0.25);
                DistanceMeasure::Lcss(Lcss::new(epsilon, window))
            }
        }
    }
}

/// Population standard deviation over every value of every dimension.
fn standard_deviation<'a, I>(instances: I) -> f64
where
    I: IntoIterator<Item = Cow<'a, TimeSeriesInstance>>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for inst in instances {
        for value in inst.dimensions().iter().flatten() {
            count += 1;
            sum += value;
            sum_sq += value * value;
        }
    }
    if count == 0 {
        return 0.0;
    }
    let mean = sum / count as f64;
    (sum_sq / count as f64 - mean * mean).max(0.0).sqrt()
}
