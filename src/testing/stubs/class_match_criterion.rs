use crate::classifiers::proximity_tree::split_criteria::SplitCriterion;

/// Share of the parent's instances sitting in the partition whose index
/// equals their class.
///
/// When every class is present, partition `c` holds class `c`'s exemplar, so
/// sending an instance to its class's partition adds `1 / n` and sending it
/// anywhere else adds nothing. Best and worst potentials are then exact
/// bounds, unlike impurity gains.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassMatchCriterion;

impl SplitCriterion for ClassMatchCriterion {
    fn get_merit_of_split(
        &self,
        pre_split_distribution: &[f64],
        post_split_dists: &[Vec<f64>],
    ) -> f64 {
        let total: f64 = pre_split_distribution.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let matched: f64 = post_split_dists
            .iter()
            .enumerate()
            .filter_map(|(class, dist)| dist.get(class))
            .sum();
        matched / total
    }
}
