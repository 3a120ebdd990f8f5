use crate::error::TreeError;
use serde::{Deserialize, Serialize};

/// A (possibly multivariate) time series with an optional class label.
///
/// Every dimension holds the same number of observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesInstance {
    dimensions: Vec<Vec<f64>>,
    label: Option<usize>,
}

impl TimeSeriesInstance {
    pub fn new(dimensions: Vec<Vec<f64>>, label: Option<usize>) -> Result<Self, TreeError> {
        let Some(first) = dimensions.first() else {
            return Err(TreeError::InvalidData(
                "instance must have at least one dimension".into(),
            ));
        };
        let length = first.len();
        if dimensions.iter().any(|d| d.len() != length) {
            return Err(TreeError::InvalidData(
                "all dimensions of an instance must have the same length".into(),
            ));
        }
        Ok(Self { dimensions, label })
    }

    pub fn univariate(values: Vec<f64>, label: Option<usize>) -> Self {
        Self {
            dimensions: vec![values],
            label,
        }
    }

    pub fn label(&self) -> Option<usize> {
        self.label
    }

    pub fn num_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    pub fn is_multivariate(&self) -> bool {
        self.dimensions.len() > 1
    }

    pub fn length(&self) -> usize {
        self.dimensions.first().map_or(0, Vec::len)
    }

    pub fn dimension(&self, index: usize) -> Option<&[f64]> {
        self.dimensions.get(index).map(Vec::as_slice)
    }

    pub fn dimensions(&self) -> &[Vec<f64>] {
        &self.dimensions
    }

    /// Keeps only the given dimensions, in the given order.
    pub fn h_slice(&self, dimension_indices: &[usize]) -> Self {
        let dimensions = dimension_indices
            .iter()
            .filter_map(|&i| self.dimensions.get(i).cloned())
            .collect();
        Self {
            dimensions,
            label: self.label,
        }
    }

    pub(crate) fn from_parts(dimensions: Vec<Vec<f64>>, label: Option<usize>) -> Self {
        Self { dimensions, label }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_dimensions() {
        let err = TimeSeriesInstance::new(vec![vec![1.0, 2.0], vec![1.0]], Some(0));
        assert!(matches!(err, Err(TreeError::InvalidData(_))));
    }

    #[test]
    fn rejects_empty_instance() {
        assert!(TimeSeriesInstance::new(vec![], None).is_err());
    }

    #[test]
    fn h_slice_reorders_and_keeps_label() {
        let inst =
            TimeSeriesInstance::new(vec![vec![1.0], vec![2.0], vec![3.0]], Some(2)).unwrap();
        let sliced = inst.h_slice(&[2, 0]);
        assert_eq!(sliced.dimensions(), &[vec![3.0], vec![1.0]]);
        assert_eq!(sliced.label(), Some(2));
        assert!(sliced.is_multivariate());
    }

    #[test]
    fn univariate_accessors() {
        let inst = TimeSeriesInstance::univariate(vec![0.5, 1.5, 2.5], Some(1));
        assert!(!inst.is_multivariate());
        assert_eq!(inst.length(), 3);
        assert_eq!(inst.dimension(0), Some(&[0.5, 1.5, 2.5][..]));
        assert_eq!(inst.dimension(1), None);
    }
}
