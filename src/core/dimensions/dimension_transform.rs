use crate::core::dimensions::{DimensionConversionMode, DimensionSamplingMode};
use crate::core::instances::TimeSeriesInstance;
use rand::Rng;
use rand::seq::{SliceRandom, index};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Dimension slicing and conversion settled for one split.
///
/// Univariate instances pass through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTransform {
    dimension_indices: Option<Vec<usize>>,
    conversion: DimensionConversionMode,
}

impl Default for DimensionTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl DimensionTransform {
    pub fn identity() -> Self {
        Self {
            dimension_indices: None,
            conversion: DimensionConversionMode::None,
        }
    }

    pub fn new(dimension_indices: Option<Vec<usize>>, conversion: DimensionConversionMode) -> Self {
        Self {
            dimension_indices,
            conversion,
        }
    }

    /// Draws the dimensions to keep and the conversion to apply for data with
    /// `num_dimensions` dimensions. Univariate data always gets the identity.
    pub fn sample<R: Rng + ?Sized>(
        sampling: DimensionSamplingMode,
        conversion: DimensionConversionMode,
        num_dimensions: usize,
        rng: &mut R,
    ) -> Self {
        if num_dimensions <= 1 {
            return Self::identity();
        }
        let dimension_indices = match sampling {
            DimensionSamplingMode::All => None,
            DimensionSamplingMode::Single => Some(vec![rng.random_range(0..num_dimensions)]),
            DimensionSamplingMode::Multiple => {
                let amount = rng.random_range(0..num_dimensions) + 1;
                Some(index::sample(rng, num_dimensions, amount).into_vec())
            }
            DimensionSamplingMode::Shuffle => {
                let mut indices: Vec<usize> = (0..num_dimensions).collect();
                indices.shuffle(rng);
                Some(indices)
            }
        };
        Self {
            dimension_indices,
            conversion: conversion.resolve(rng),
        }
    }

    pub fn dimension_indices(&self) -> Option<&[usize]> {
        self.dimension_indices.as_deref()
    }

    pub fn conversion(&self) -> DimensionConversionMode {
        self.conversion
    }

    pub fn apply<'a>(&self, instance: &'a TimeSeriesInstance) -> Cow<'a, TimeSeriesInstance> {
        if !instance.is_multivariate() {
            return Cow::Borrowed(instance);
        }
        let sliced = match &self.dimension_indices {
            Some(indices) => Cow::Owned(instance.h_slice(indices)),
            None => Cow::Borrowed(instance),
        };
        match self.conversion {
            DimensionConversionMode::Concatenate => {
                let values = sliced.dimensions().iter().flatten().copied().collect();
                Cow::Owned(TimeSeriesInstance::from_parts(vec![values], sliced.label()))
            }
            DimensionConversionMode::Stratify => {
                let length = sliced.length();
                let mut values = Vec::with_capacity(length * sliced.num_dimensions());
                for t in 0..length {
                    for dimension in sliced.dimensions() {
                        values.push(dimension[t]);
                    }
                }
                Cow::Owned(TimeSeriesInstance::from_parts(vec![values], sliced.label()))
            }
            // random is resolved in `sample`; an unresolved one behaves as none
            DimensionConversionMode::None | DimensionConversionMode::Random => sliced,
        }
    }
}
