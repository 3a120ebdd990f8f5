use crate::classifiers::proximity_tree::split::Partition;
use crate::classifiers::proximity_tree::split_criteria::SplitCriterion;
use crate::core::dimensions::{DimensionTransform, DistanceMode};
use crate::core::instances::TimeSeriesInstance;
use crate::distances::{Distance, DistanceMeasure};
use crate::error::{TreeError, ensure_finite};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SplitState {
    Unbuilt,
    Building,
    Built,
    Eliminated,
}

/// Randomly drawn settings that stay fixed for the lifetime of a split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSettings {
    pub distance_measure: DistanceMeasure,
    pub transform: DimensionTransform,
    pub distance_mode: DistanceMode,
    pub early_abandon_distances: bool,
}

#[derive(Debug, Clone, Default)]
struct ScoreCache {
    score: Cell<Option<f64>>,
    best_potential: Cell<Option<f64>>,
    worst_potential: Cell<Option<f64>>,
}

impl ScoreCache {
    fn invalidate(&self) {
        self.score.set(None);
        self.best_potential.set(None);
        self.worst_potential.set(None);
    }
}

// cached values never take part in equality
impl PartialEq for ScoreCache {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

fn cached<F>(cell: &Cell<Option<f64>>, compute: F) -> Result<f64, TreeError>
where
    F: FnOnce() -> Result<f64, TreeError>,
{
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = ensure_finite(compute()?)?;
    cell.set(Some(value));
    Ok(value)
}

/// A partitioning of a node's data by proximity to per-class exemplars.
///
/// `data_indices` are training-set indices. Instances are assigned in the order
/// of `data_indices`; the first `assigned` of them sit in a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    data_indices: Vec<usize>,
    labels: Vec<usize>,
    parent_distribution: Vec<f64>,
    settings: Option<SplitSettings>,
    partitions: Vec<Partition>,
    class_to_partition: BTreeMap<usize, usize>,
    assigned: usize,
    state: SplitState,
    #[serde(skip)]
    cache: ScoreCache,
}

impl Split {
    pub fn new(data_indices: Vec<usize>, labels: Vec<usize>, num_classes: usize) -> Self {
        let mut parent_distribution = vec![0.0; num_classes];
        for &label in &labels {
            if let Some(count) = parent_distribution.get_mut(label) {
                *count += 1.0;
            }
        }
        Self {
            data_indices,
            labels,
            parent_distribution,
            settings: None,
            partitions: Vec::new(),
            class_to_partition: BTreeMap::new(),
            assigned: 0,
            state: SplitState::Unbuilt,
            cache: ScoreCache::default(),
        }
    }

    /// An unbuilt split over the same data.
    pub fn fresh(&self) -> Self {
        Self::new(
            self.data_indices.clone(),
            self.labels.clone(),
            self.num_classes(),
        )
    }

    pub(crate) fn begin_build(
        &mut self,
        settings: SplitSettings,
        partitions: Vec<Partition>,
        class_to_partition: BTreeMap<usize, usize>,
    ) {
        self.settings = Some(settings);
        self.partitions = partitions;
        self.class_to_partition = class_to_partition;
        self.assigned = 0;
        self.state = SplitState::Building;
        self.cache.invalidate();
    }

    pub fn data_indices(&self) -> &[usize] {
        &self.data_indices
    }

    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.data_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_indices.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.parent_distribution.len()
    }

    pub fn parent_distribution(&self) -> &[f64] {
        &self.parent_distribution
    }

    pub fn settings(&self) -> Option<&SplitSettings> {
        self.settings.as_ref()
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn partition(&self, index: usize) -> Option<&Partition> {
        self.partitions.get(index)
    }

    pub fn class_to_partition(&self) -> &BTreeMap<usize, usize> {
        &self.class_to_partition
    }

    pub fn assigned(&self) -> usize {
        self.assigned
    }

    pub fn has_unassigned(&self) -> bool {
        self.assigned < self.data_indices.len()
    }

    pub fn state(&self) -> SplitState {
        self.state
    }

    pub fn is_built(&self) -> bool {
        self.state == SplitState::Built
    }

    pub(crate) fn set_state(&mut self, state: SplitState) {
        self.state = state;
    }

    /// True when all of the data carries one label.
    pub fn is_pure(&self) -> bool {
        self.labels.windows(2).all(|w| w[0] == w[1])
    }

    /// Routes the next unassigned instance to `partition`.
    pub(crate) fn assign_next(&mut self, partition: usize) -> Result<(), TreeError> {
        let position = self.assigned;
        let (Some(&index), Some(&label)) =
            (self.data_indices.get(position), self.labels.get(position))
        else {
            return Err(TreeError::Exhausted);
        };
        let target = self.partitions.get_mut(partition).ok_or_else(|| {
            TreeError::Invariant(format!("partition {partition} does not exist"))
        })?;
        target.add(index, label);
        self.assigned += 1;
        self.cache.invalidate();
        Ok(())
    }

    fn partition_distributions(&self) -> Vec<Vec<f64>> {
        self.partitions
            .iter()
            .map(|p| p.class_distribution().to_vec())
            .collect()
    }

    fn unassigned_labels(&self) -> &[usize] {
        &self.labels[self.assigned.min(self.labels.len())..]
    }

    /// Merit of the partitions reached so far.
    pub fn score(&self, criterion: &dyn SplitCriterion) -> Result<f64, TreeError> {
        cached(&self.cache.score, || {
            Ok(criterion.get_merit_of_split(
                &self.parent_distribution,
                &self.partition_distributions(),
            ))
        })
    }

    /// Score if every unassigned instance reached its own class's partition.
    pub fn best_potential_score(&self, criterion: &dyn SplitCriterion) -> Result<f64, TreeError> {
        cached(&self.cache.best_potential, || {
            let mut dists = self.partition_distributions();
            for &label in self.unassigned_labels() {
                let partition = *self.class_to_partition.get(&label).ok_or_else(|| {
                    TreeError::Invariant(format!("class {label} has no partition"))
                })?;
                dists[partition][label] += 1.0;
            }
            Ok(criterion.get_merit_of_split(&self.parent_distribution, &dists))
        })
    }

    /// Score of a greedy assignment that sends each unassigned instance, in
    /// order, to the partition where it hurts the score most.
    pub fn worst_potential_score(&self, criterion: &dyn SplitCriterion) -> Result<f64, TreeError> {
        cached(&self.cache.worst_potential, || {
            let mut dists = self.partition_distributions();
            if dists.is_empty() {
                return Ok(criterion.get_merit_of_split(&self.parent_distribution, &dists));
            }
            for &label in self.unassigned_labels() {
                let mut worst: Option<(usize, f64)> = None;
                for k in 0..dists.len() {
                    dists[k][label] += 1.0;
                    let merit = criterion.get_merit_of_split(&self.parent_distribution, &dists);
                    dists[k][label] -= 1.0;
                    if worst.is_none_or(|(_, w)| merit < w) {
                        worst = Some((k, merit));
                    }
                }
                if let Some((k, _)) = worst {
                    dists[k][label] += 1.0;
                }
            }
            Ok(criterion.get_merit_of_split(&self.parent_distribution, &dists))
        })
    }

    /// Finds the partition whose exemplars are closest to `transformed`.
    ///
    /// `training_index` identifies the instance when it belongs to this
    /// split's data, letting an exemplar claim itself without a distance
    /// computation. `order` fixes the partition visiting order, otherwise
    /// partitions are visited by index. Ties go to a random partition.
    pub fn find_partition_index_for<R: Rng + ?Sized>(
        &self,
        transformed: &TimeSeriesInstance,
        training_index: Option<usize>,
        order: Option<&[usize]>,
        rng: &mut R,
    ) -> Result<usize, TreeError> {
        let settings = self.settings.as_ref().ok_or_else(|| {
            TreeError::Invariant("partition lookup on a split without settings".into())
        })?;
        let by_index: Vec<usize>;
        let order = match order {
            Some(order) => order,
            None => {
                by_index = (0..self.partitions.len()).collect();
                &by_index
            }
        };

        let mut limit = f64::INFINITY;
        let mut closest = f64::INFINITY;
        let mut best: Vec<usize> = Vec::new();
        for &p in order {
            let partition = self.partitions.get(p).ok_or_else(|| {
                TreeError::Invariant(format!("partition {p} does not exist"))
            })?;
            for exemplar in partition.exemplars() {
                if training_index == Some(exemplar.index) {
                    return Ok(p);
                }
                let distance =
                    settings
                        .distance_measure
                        .distance(transformed, &exemplar.transformed, limit);
                if distance < closest {
                    closest = distance;
                    best.clear();
                    best.push(p);
                    if settings.early_abandon_distances {
                        limit = distance;
                    }
                } else if distance == closest && !best.contains(&p) {
                    best.push(p);
                }
            }
        }

        match best.as_slice() {
            [] => Err(TreeError::Invariant(
                "no partition is closest to the instance".into(),
            )),
            [only] => Ok(*only),
            tied => Ok(tied[rng.random_range(0..tied.len())]),
        }
    }

    /// Routes an instance from outside the training data.
    pub fn find_partition_index_for_unseen<R: Rng + ?Sized>(
        &self,
        instance: &TimeSeriesInstance,
        rng: &mut R,
    ) -> Result<usize, TreeError> {
        let settings = self.settings.as_ref().ok_or_else(|| {
            TreeError::Invariant("cannot route through an unbuilt split".into())
        })?;
        let transformed = settings.transform.apply(instance);
        self.find_partition_index_for(&transformed, None, None, rng)
    }

    /// Checks the partitions hold exactly this split's data.
    pub fn check_membership(&self) -> Result<(), TreeError> {
        let mut expected = self.data_indices.clone();
        let mut actual: Vec<usize> = self
            .partitions
            .iter()
            .flat_map(|p| p.data_indices().iter().copied())
            .collect();
        expected.sort_unstable();
        actual.sort_unstable();
        if expected != actual {
            return Err(TreeError::Invariant(format!(
                "partitions hold {} instances but the split has {}",
                actual.len(),
                expected.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "split[{}] n={} assigned={} partitions=[",
            self.state,
            self.len(),
            self.assigned
        )?;
        for (i, partition) in self.partitions.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", partition.len())?;
        }
        write!(f, "]")?;
        if let Some(settings) = &self.settings {
            write!(f, " measure={}", settings.distance_measure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::proximity_tree::split::Exemplar;
    use crate::classifiers::proximity_tree::split_criteria::GiniSplitCriterion;
    use crate::distances::Euclidean;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn exemplar(index: usize, value: f64, label: usize) -> Exemplar {
        Exemplar {
            index,
            label,
            transformed: TimeSeriesInstance::univariate(vec![value], Some(label)),
        }
    }

    /// Four instances, classes 0 0 1 1, exemplars 0 and 2.
    fn two_class_split() -> Split {
        let mut split = Split::new(vec![0, 1, 2, 3], vec![0, 0, 1, 1], 2);
        split.begin_build(
            SplitSettings {
                distance_measure: DistanceMeasure::Euclidean(Euclidean),
                transform: DimensionTransform::identity(),
                distance_mode: DistanceMode::Dependent,
                early_abandon_distances: true,
            },
            vec![
                Partition::new(vec![exemplar(0, 0.0, 0)], 2),
                Partition::new(vec![exemplar(2, 10.0, 1)], 2),
            ],
            BTreeMap::from([(0, 0), (1, 1)]),
        );
        split
    }

    #[test]
    fn bounds_bracket_the_score_while_building() {
        let criterion = GiniSplitCriterion::new();
        let mut split = two_class_split();
        split.assign_next(0).unwrap();
        let best = split.best_potential_score(&criterion).unwrap();
        let worst = split.worst_potential_score(&criterion).unwrap();
        assert!((best - 0.5).abs() < 1e-12);
        assert!(worst <= best);

        split.assign_next(1).unwrap();
        split.assign_next(1).unwrap();
        split.assign_next(1).unwrap();
        let score = split.score(&criterion).unwrap();
        assert_eq!(split.best_potential_score(&criterion).unwrap(), score);
        assert_eq!(split.worst_potential_score(&criterion).unwrap(), score);
        assert!(!split.has_unassigned());
    }

    #[test]
    fn cache_is_invalidated_on_assignment() {
        let criterion = GiniSplitCriterion::new();
        let mut split = two_class_split();
        let before = split.score(&criterion).unwrap();
        for _ in 0..3 {
            split.assign_next(0).unwrap();
        }
        assert_ne!(split.score(&criterion).unwrap(), before);
    }

    #[test]
    fn nearest_exemplar_wins() {
        let split = two_class_split();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let near_high = TimeSeriesInstance::univariate(vec![8.0], None);
        assert_eq!(
            split
                .find_partition_index_for_unseen(&near_high, &mut rng)
                .unwrap(),
            1
        );
        let order = [1, 0];
        let near_low = TimeSeriesInstance::univariate(vec![1.0], None);
        assert_eq!(
            split
                .find_partition_index_for(&near_low, None, Some(&order), &mut rng)
                .unwrap(),
            0
        );
    }

    #[test]
    fn exemplar_claims_itself() {
        let split = two_class_split();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // far from its own exemplar's stored value, still routed home by index
        let inst = TimeSeriesInstance::univariate(vec![10.0], Some(0));
        assert_eq!(
            split
                .find_partition_index_for(&inst, Some(0), None, &mut rng)
                .unwrap(),
            0
        );
    }

    #[test]
    fn ties_are_broken_both_ways() {
        let split = two_class_split();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let midpoint = TimeSeriesInstance::univariate(vec![5.0], None);
        let mut seen = [false; 2];
        for _ in 0..64 {
            let p = split
                .find_partition_index_for_unseen(&midpoint, &mut rng)
                .unwrap();
            seen[p] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn membership_check_catches_missing_instances() {
        let mut split = two_class_split();
        split.assign_next(0).unwrap();
        assert!(matches!(
            split.check_membership(),
            Err(TreeError::Invariant(_))
        ));
        for _ in 0..3 {
            split.assign_next(1).unwrap();
        }
        assert!(split.check_membership().is_ok());
    }

    #[test]
    fn unbuilt_split_cannot_route() {
        let split = Split::new(vec![0, 1], vec![0, 1], 2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let inst = TimeSeriesInstance::univariate(vec![0.0], None);
        assert!(split.find_partition_index_for_unseen(&inst, &mut rng).is_err());
        assert!(!split.is_pure());
        assert!(Split::new(vec![3, 4], vec![1, 1], 2).is_pure());
    }

    #[test]
    fn display_summarizes_partitions() {
        let mut split = two_class_split();
        split.assign_next(0).unwrap();
        assert_eq!(
            split.to_string(),
            "split[building] n=4 assigned=1 partitions=[1, 0] measure=euclidean"
        );
    }
}
