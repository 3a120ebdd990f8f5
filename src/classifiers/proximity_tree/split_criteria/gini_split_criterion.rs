use crate::classifiers::proximity_tree::split_criteria::SplitCriterion;
use crate::classifiers::proximity_tree::split_criteria::split_criterion::weighted_impurity;

/// Gini gain: parent impurity minus the weighted impurity of the partitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GiniSplitCriterion {}

impl GiniSplitCriterion {
    pub fn new() -> Self {
        Self {}
    }

    pub fn compute_gini(distribution: &[f64], distribution_sum_of_weights: f64) -> f64 {
        if distribution_sum_of_weights <= 0.0 {
            return 0.0;
        }
        let mut gini = 1.0;
        for weight in distribution {
            let rel_freq = weight / distribution_sum_of_weights;
            gini -= rel_freq * rel_freq;
        }
        gini
    }
}

impl SplitCriterion for GiniSplitCriterion {
    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64 {
        let parent = Self::compute_gini(
            pre_split_distribution,
            pre_split_distribution.iter().sum(),
        );
        parent - weighted_impurity(post_split_dists, Self::compute_gini)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_partitions_recover_parent_impurity() {
        let merit = GiniSplitCriterion::new()
            .get_merit_of_split(&[2.0, 2.0], &[vec![2.0, 0.0], vec![0.0, 2.0]]);
        assert!((merit - 0.5).abs() < 1e-12);
    }

    #[test]
    fn uninformative_split_has_no_gain() {
        let merit = GiniSplitCriterion::new()
            .get_merit_of_split(&[2.0, 2.0], &[vec![1.0, 1.0], vec![1.0, 1.0]]);
        assert!(merit.abs() < 1e-12);
    }

    #[test]
    fn empty_partitions_are_ignored() {
        let merit = GiniSplitCriterion::new()
            .get_merit_of_split(&[3.0, 1.0], &[vec![3.0, 0.0], vec![0.0, 0.0], vec![0.0, 1.0]]);
        assert!((merit - 0.375).abs() < 1e-12);
    }

    #[test]
    fn gini_of_empty_distribution_is_zero() {
        assert_eq!(GiniSplitCriterion::compute_gini(&[0.0, 0.0], 0.0), 0.0);
    }
}
