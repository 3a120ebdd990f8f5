use crate::core::dimensions::{DimensionConversionMode, DimensionSamplingMode, DistanceMode};
use crate::distances::DistanceMeasureSpace;

/// Settings shared by every split a tree builds.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitOptions {
    pub distance_spaces: Vec<DistanceMeasureSpace>,
    pub dimension_sampling_mode: DimensionSamplingMode,
    pub dimension_conversion_mode: DimensionConversionMode,
    pub distance_mode: DistanceMode,
    pub early_abandon_distances: bool,
    pub early_exemplar_check: bool,
    pub partition_examination_reordering: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            distance_spaces: DistanceMeasureSpace::defaults(),
            dimension_sampling_mode: DimensionSamplingMode::default(),
            dimension_conversion_mode: DimensionConversionMode::default(),
            distance_mode: DistanceMode::default(),
            early_abandon_distances: false,
            early_exemplar_check: false,
            partition_examination_reordering: false,
        }
    }
}
