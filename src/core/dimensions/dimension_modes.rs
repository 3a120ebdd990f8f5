use rand::Rng;
use rand::seq::IndexedRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// How dimensions of multivariate data are sampled for a split.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
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
pub enum DimensionSamplingMode {
    /// One random dimension.
    #[default]
    Single,
    /// A random, non-empty subset of dimensions.
    Multiple,
    /// Every dimension, in order.
    All,
    /// Every dimension, shuffled.
    Shuffle,
}

/// How the sampled dimensions are converted before distances are taken.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
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
pub enum DimensionConversionMode {
    #[default]
    None,
    /// Dimensions laid end to end as one long series.
    Concatenate,
    /// Dimensions interleaved time step by time step as one long series.
    Stratify,
    /// Either `Concatenate` or `Stratify`, drawn per split.
    Random,
}

impl DimensionConversionMode {
    /// Replaces `Random` with a concrete conversion.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        match self {
            Self::Random => *[Self::Concatenate, Self::Stratify]
                .choose(rng)
                .unwrap_or(&Self::Concatenate),
            other => other,
        }
    }
}

/// Whether a distance measure sees all dimensions at once or one at a time.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
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
pub enum DistanceMode {
    #[default]
    Dependent,
    /// Distances are computed per dimension and summed.
    Independent,
    /// Either `Dependent` or `Independent`, drawn per split.
    Random,
}

impl DistanceMode {
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        match self {
            Self::Random => *[Self::Dependent, Self::Independent]
                .choose(rng)
                .unwrap_or(&Self::Dependent),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TreeError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn parses_kebab_case_names() {
        assert_eq!(
            DimensionSamplingMode::from_str("shuffle").unwrap(),
            DimensionSamplingMode::Shuffle
        );
        assert_eq!(
            DimensionConversionMode::from_str("stratify").unwrap(),
            DimensionConversionMode::Stratify
        );
        assert_eq!(
            DistanceMode::from_str("independent").unwrap(),
            DistanceMode::Independent
        );
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        let err: TreeError = DimensionSamplingMode::from_str("sideways")
            .unwrap_err()
            .into();
        assert!(matches!(err, TreeError::Configuration(_)));
    }

    #[test]
    fn random_modes_resolve_to_concrete_modes() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let c = DimensionConversionMode::Random.resolve(&mut rng);
            assert!(matches!(
                c,
                DimensionConversionMode::Concatenate | DimensionConversionMode::Stratify
            ));
            let d = DistanceMode::Random.resolve(&mut rng);
            assert!(matches!(d, DistanceMode::Dependent | DistanceMode::Independent));
        }
        assert_eq!(
            DimensionConversionMode::None.resolve(&mut rng),
            DimensionConversionMode::None
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mode in DimensionSamplingMode::iter() {
            let name = mode.to_string();
            assert_eq!(DimensionSamplingMode::from_str(&name).unwrap(), mode);
        }
    }
}
