use std::fmt::Debug;

/// Scores a partitioning of labelled data; higher is better.
///
/// Distributions are per-class weights. `post_split_dists` holds one
/// distribution per partition and may cover only part of the parent's data.
pub trait SplitCriterion: Debug {
    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64;
}

/// Weighted mean of `impurity` over the partitions, by partition weight.
pub(crate) fn weighted_impurity<F>(post_split_dists: &[Vec<f64>], impurity: F) -> f64
where
    F: Fn(&[f64], f64) -> f64,
{
    let total: f64 = post_split_dists.iter().flatten().sum();
    if total <= 0.0 {
        return 0.0;
    }
    post_split_dists
        .iter()
        .map(|dist| {
            let weight: f64 = dist.iter().sum();
            if weight > 0.0 {
                weight / total * impurity(dist, weight)
            } else {
                0.0
            }
        })
        .sum()
}
