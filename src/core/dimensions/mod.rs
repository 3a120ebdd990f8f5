mod dimension_modes;
mod dimension_transform;

pub use dimension_modes::{DimensionConversionMode, DimensionSamplingMode, DistanceMode};
pub use dimension_transform::DimensionTransform;
