use crate::distances::Distance;
use serde::{Deserialize, Serialize};

/// Squared Euclidean distance summed over all dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euclidean;

impl Distance for Euclidean {
    fn distance_between(&self, a: &[Vec<f64>], b: &[Vec<f64>], limit: f64) -> f64 {
        let mut sum = 0.0;
        for (da, db) in a.iter().zip(b) {
            for (x, y) in da.iter().zip(db) {
                let diff = x - y;
                sum += diff * diff;
            }
            if sum > limit {
                return sum;
            }
        }
        sum
    }
}
