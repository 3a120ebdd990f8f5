use crate::distances::{Distance, DistanceMeasure};
use serde::{Deserialize, Serialize};
use std::slice;

/// Applies a measure to each dimension separately and sums the results.
///
/// The abandon limit shrinks by what earlier dimensions already contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Independent {
    inner: Box<DistanceMeasure>,
}

impl Independent {
    pub fn new(inner: DistanceMeasure) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    pub fn inner(&self) -> &DistanceMeasure {
        &self.inner
    }
}

impl Distance for Independent {
    fn distance_between(&self, a: &[Vec<f64>], b: &[Vec<f64>], limit: f64) -> f64 {
        let mut total = 0.0;
        for (da, db) in a.iter().zip(b) {
            total += self.inner.distance_between(
                slice::from_ref(da),
                slice::from_ref(db),
                limit - total,
            );
            if total > limit {
                return total;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distances::Dtw;

    #[test]
    fn sums_per_dimension_distances() {
        // dimension 1 is a shifted copy, which dtw can only align per dimension
        let a = vec![vec![0.0, 1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 0.0]];
        let b = vec![vec![0.0, 0.0, 1.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]];
        let dtw = DistanceMeasure::Dtw(Dtw::full_window());
        let independent = Independent::new(dtw.clone());
        assert_eq!(independent.distance_between(&a, &b, f64::INFINITY), 0.0);
        assert!(dtw.distance_between(&a, &b, f64::INFINITY) > 0.0);
    }

    #[test]
    fn stops_once_limit_is_exceeded() {
        let a = vec![vec![0.0], vec![0.0], vec![0.0]];
        let b = vec![vec![3.0], vec![3.0], vec![3.0]];
        let independent = Independent::new(DistanceMeasure::Euclidean(Default::default()));
        let d = independent.distance_between(&a, &b, 10.0);
        assert_eq!(d, 18.0);
    }
}
