use crate::distances::Distance;
use crate::distances::dtw::series_length;
use serde::{Deserialize, Serialize};
use std::mem;

/// Longest common subsequence distance, `1 - lcss / min(n, m)`.
///
/// Two points match when every dimension is within `epsilon`, and only if they
/// lie within `window` (a fraction of the longer series) of each other. The
/// measure is bounded in `[0, 1]` and does not abandon early.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lcss {
    epsilon: f64,
    window: f64,
}

impl Lcss {
    pub fn new(epsilon: f64, window: f64) -> Self {
        Self {
            epsilon: epsilon.max(0.0),
            window: window.clamp(0.0, 1.0),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    fn matches(&self, a: &[Vec<f64>], b: &[Vec<f64>], i: usize, j: usize) -> bool {
        a.iter()
            .zip(b)
            .all(|(da, db)| (da[i] - db[j]).abs() <= self.epsilon)
    }
}

impl Distance for Lcss {
    fn distance_between(&self, a: &[Vec<f64>], b: &[Vec<f64>], _limit: f64) -> f64 {
        let n = series_length(a);
        let m = series_length(b);
        if n == 0 || m == 0 {
            return if n == m { 0.0 } else { 1.0 };
        }
        let band = ((self.window * n.max(m) as f64).floor() as usize).max(n.abs_diff(m));

        let mut prev = vec![0usize; m + 1];
        let mut curr = vec![0usize; m + 1];
        for i in 1..=n {
            curr[0] = 0;
            for j in 1..=m {
                curr[j] = if i.abs_diff(j) <= band && self.matches(a, b, i - 1, j - 1) {
                    prev[j - 1] + 1
                } else {
                    prev[j].max(curr[j - 1])
                };
            }
            mem::swap(&mut prev, &mut curr);
        }
        1.0 - prev[m] as f64 / n.min(m) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_series_have_zero_distance() {
        let a = vec![vec![1.0, 2.0, 3.0]];
        assert_eq!(Lcss::new(0.0, 0.0).distance_between(&a, &a, 0.0), 0.0);
    }

    #[test]
    fn epsilon_decides_matches() {
        let a = vec![vec![0.0, 0.0, 0.0, 0.0]];
        let b = vec![vec![0.1, 5.0, 0.1, 5.0]];
        let tight = Lcss::new(0.05, 1.0).distance_between(&a, &b, f64::INFINITY);
        let loose = Lcss::new(0.2, 1.0).distance_between(&a, &b, f64::INFINITY);
        assert_eq!(tight, 1.0);
        assert_eq!(loose, 0.5);
    }

    #[test]
    fn window_restricts_shifted_matches() {
        let a = vec![vec![1.0, 0.0, 0.0, 0.0]];
        let b = vec![vec![0.0, 0.0, 0.0, 1.0]];
        let narrow = Lcss::new(0.0, 0.0).distance_between(&a, &b, f64::INFINITY);
        let wide = Lcss::new(0.0, 1.0).distance_between(&a, &b, f64::INFINITY);
        assert!(wide < narrow);
    }
}
