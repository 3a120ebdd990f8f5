use crate::distances::Distance;
use serde::{Deserialize, Serialize};
use std::mem;

/// Dynamic time warping with a Sakoe-Chiba band.
///
/// `window` is the band half-width as a fraction of the longer series; the band
/// is always wide enough to reach the end of both series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dtw {
    window: f64,
}

impl Default for Dtw {
    fn default() -> Self {
        Self::full_window()
    }
}

impl Dtw {
    pub fn new(window: f64) -> Self {
        Self {
            window: window.clamp(0.0, 1.0),
        }
    }

    pub fn full_window() -> Self {
        Self { window: 1.0 }
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    fn band(&self, n: usize, m: usize) -> usize {
        let fraction = (self.window * n.max(m) as f64).floor() as usize;
        fraction.max(n.abs_diff(m))
    }
}

pub(crate) fn series_length(series: &[Vec<f64>]) -> usize {
    series.first().map_or(0, Vec::len)
}

fn point_cost(a: &[Vec<f64>], b: &[Vec<f64>], i: usize, j: usize) -> f64 {
    a.iter()
        .zip(b)
        .map(|(da, db)| {
            let diff = da[i] - db[j];
            diff * diff
        })
        .sum()
}

impl Distance for Dtw {
    fn distance_between(&self, a: &[Vec<f64>], b: &[Vec<f64>], limit: f64) -> f64 {
        let n = series_length(a);
        let m = series_length(b);
        if n == 0 || m == 0 {
            return if n == m { 0.0 } else { f64::INFINITY };
        }
        let band = self.band(n, m);

        let mut prev = vec![f64::INFINITY; m + 1];
        let mut curr = vec![f64::INFINITY; m + 1];
        prev[0] = 0.0;
        for i in 1..=n {
            curr.fill(f64::INFINITY);
            let lo = i.saturating_sub(band).max(1);
            let hi = (i + band).min(m);
            let mut row_min = f64::INFINITY;
            for j in lo..=hi {
                let best = prev[j - 1].min(prev[j]).min(curr[j - 1]);
                curr[j] = point_cost(a, b, i - 1, j - 1) + best;
                row_min = row_min.min(curr[j]);
            }
            if row_min > limit {
                return f64::INFINITY;
            }
            mem::swap(&mut prev, &mut curr);
        }
        prev[m]
    }
}
