use crate::classifiers::proximity_tree::split_criteria::SplitCriterion;
use crate::classifiers::proximity_tree::split_criteria::split_criterion::weighted_impurity;

/// Information gain in bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct InfoGainSplitCriterion {}

impl InfoGainSplitCriterion {
    pub fn new() -> Self {
        Self {}
    }

    pub fn compute_entropy(distribution: &[f64], distribution_sum_of_weights: f64) -> f64 {
        if distribution_sum_of_weights <= 0.0 {
            return 0.0;
        }
        distribution
            .iter()
            .filter(|&&w| w > 0.0)
            .map(|w| {
                let p = w / distribution_sum_of_weights;
                -p * p.log2()
            })
            .sum()
    }
}

impl SplitCriterion for InfoGainSplitCriterion {
    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64 {
        let parent = Self::compute_entropy(
            pre_split_distribution,
            pre_split_distribution.iter().sum(),
        );
        parent - weighted_impurity(post_split_dists, Self::compute_entropy)
    }
}
