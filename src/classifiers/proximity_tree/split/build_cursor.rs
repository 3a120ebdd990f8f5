use crate::classifiers::proximity_tree::split::{
    Exemplar, Partition, PartitionCounts, Split, SplitOptions, SplitSettings, SplitState,
};
use crate::core::dimensions::{DimensionTransform, DistanceMode};
use crate::core::instances::{TimeSeriesInstance, TimeSeriesInstances};
use crate::error::TreeError;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

fn instance_at(data: &TimeSeriesInstances, index: usize) -> Result<&TimeSeriesInstance, TreeError> {
    data.get(index).ok_or_else(|| {
        TreeError::InvalidData(format!(
            "training index {index} is outside the {} training instances",
            data.len()
        ))
    })
}

/// Builds one split an instance at a time.
///
/// The cursor owns the split while it is being built along with the state
/// that only matters during the build: the per-class partition counts, the
/// exemplar lookup and the split's own random stream.
#[derive(Debug)]
pub struct SplitBuildCursor<'o> {
    split: Split,
    options: &'o SplitOptions,
    partition_counts: Option<Vec<PartitionCounts>>,
    exemplar_partitions: BTreeMap<usize, usize>,
    rng: ChaCha8Rng,
}

impl<'o> SplitBuildCursor<'o> {
    /// Draws the split's settings and exemplars and readies it for
    /// assignment. `seed` seeds the split's random stream.
    pub fn begin(
        mut split: Split,
        data: &TimeSeriesInstances,
        options: &'o SplitOptions,
        seed: u64,
    ) -> Result<Self, TreeError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        if split.is_empty() {
            return Err(TreeError::InvalidData("cannot split a node with no data".into()));
        }
        let num_dimensions = split
            .data_indices()
            .iter()
            .map(|&i| instance_at(data, i).map(TimeSeriesInstance::num_dimensions))
            .try_fold(0, |max, dims| dims.map(|d| max.max(d)))?;

        let transform = DimensionTransform::sample(
            options.dimension_sampling_mode,
            options.dimension_conversion_mode,
            num_dimensions,
            &mut rng,
        );

        let space = options
            .distance_spaces
            .choose(&mut rng)
            .copied()
            .ok_or_else(|| TreeError::Configuration("no distance measure spaces".into()))?;
        let node_data = split
            .data_indices()
            .iter()
            .filter_map(|&i| data.get(i))
            .map(|inst| transform.apply(inst));
        let mut distance_measure = space.sample(node_data, &mut rng);

        let mut distance_mode = DistanceMode::Dependent;
        if num_dimensions > 1 {
            distance_mode = options.distance_mode.resolve(&mut rng);
            if distance_mode == DistanceMode::Independent {
                distance_measure = distance_measure.independent();
            }
        }

        let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (&index, &label) in split.data_indices().iter().zip(split.labels()) {
            by_class.entry(label).or_default().push(index);
        }
        let num_classes = split.num_classes();
        let mut partitions = Vec::with_capacity(by_class.len());
        let mut class_to_partition = BTreeMap::new();
        let mut exemplar_partitions = BTreeMap::new();
        for (label, indices) in &by_class {
            let Some(&index) = indices.choose(&mut rng) else {
                continue;
            };
            let exemplar = Exemplar {
                index,
                label: *label,
                transformed: transform.apply(instance_at(data, index)?).into_owned(),
            };
            class_to_partition.insert(*label, partitions.len());
            exemplar_partitions.insert(index, partitions.len());
            partitions.push(Partition::new(vec![exemplar], num_classes));
        }

        let partition_counts: Option<Vec<PartitionCounts>> =
            options.partition_examination_reordering.then(|| {
                (0..num_classes)
                    .map(|_| PartitionCounts::new(partitions.len(), &mut rng))
                    .collect()
            });

        split.begin_build(
            SplitSettings {
                distance_measure,
                transform,
                distance_mode,
                early_abandon_distances: options.early_abandon_distances,
            },
            partitions,
            class_to_partition,
        );

        Ok(Self {
            split,
            options,
            partition_counts,
            exemplar_partitions,
            rng,
        })
    }

    pub fn has_next(&self) -> bool {
        self.split.state() == SplitState::Building && self.split.has_unassigned()
    }

    /// Assigns the next instance and returns the partition it went to.
    pub fn advance(&mut self, data: &TimeSeriesInstances) -> Result<usize, TreeError> {
        if !self.has_next() {
            return Err(TreeError::Exhausted);
        }
        let position = self.split.assigned();
        let index = self.split.data_indices()[position];
        let label = self.split.labels()[position];

        let known_exemplar = if self.options.early_exemplar_check {
            self.exemplar_partitions.get(&index).copied()
        } else {
            None
        };
        let partition = match known_exemplar {
            Some(partition) => partition,
            None => {
                let instance = instance_at(data, index)?;
                let settings = self.split.settings().ok_or_else(|| {
                    TreeError::Invariant("building split has no settings".into())
                })?;
                let transformed = settings.transform.apply(instance);
                let order = match &self.partition_counts {
                    Some(counts) => Some(
                        counts
                            .get(label)
                            .ok_or_else(|| {
                                TreeError::Invariant(format!("class {label} has no partition counts"))
                            })?
                            .order(),
                    ),
                    None => None,
                };
                self.split.find_partition_index_for(
                    &transformed,
                    Some(index),
                    order.as_deref(),
                    &mut self.rng,
                )?
            }
        };

        self.split.assign_next(partition)?;
        if let Some(counts) = self.partition_counts.as_mut() {
            if let Some(class_counts) = counts.get_mut(label) {
                class_counts.increment(partition, &mut self.rng)?;
            }
        }

        if !self.split.has_unassigned() {
            self.split.check_membership()?;
            self.split.set_state(SplitState::Built);
            self.partition_counts = None;
        }
        Ok(partition)
    }

    /// Runs the cursor to the end.
    pub fn finish(&mut self, data: &TimeSeriesInstances) -> Result<usize, TreeError> {
        let mut steps = 0;
        while self.has_next() {
            self.advance(data)?;
            steps += 1;
        }
        Ok(steps)
    }

    pub fn split(&self) -> &Split {
        &self.split
    }

    pub fn into_split(self) -> Split {
        self.split
    }

    pub fn eliminate(&mut self) {
        self.split.set_state(SplitState::Eliminated);
        self.partition_counts = None;
    }

    pub fn is_eliminated(&self) -> bool {
        self.split.state() == SplitState::Eliminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dimensions::DimensionSamplingMode;
    use crate::distances::DistanceMeasure;
    use crate::testing::dummies::{
        alternating_line, four_instance_dataset, multivariate_dataset, root_split,
        separable_dataset,
    };
    use crate::testing::stubs::ClassMatchCriterion;

    fn built(data: &TimeSeriesInstances, options: &SplitOptions, seed: u64) -> Split {
        let mut cursor = SplitBuildCursor::begin(root_split(data), data, options, seed).unwrap();
        cursor.finish(data).unwrap();
        cursor.into_split()
    }

    #[test]
    fn four_instances_give_one_partition_per_class() {
        let data = four_instance_dataset();
        let split = built(&data, &SplitOptions::default(), 3);
        assert!(split.is_built());
        assert_eq!(split.partitions().len(), 2);
        for (p, partition) in split.partitions().iter().enumerate() {
            let [exemplar] = partition.exemplars() else {
                panic!("expected a single exemplar");
            };
            assert_eq!(data.label_of(exemplar.index), Some(exemplar.label));
            assert_eq!(split.class_to_partition()[&exemplar.label], p);
            assert!(partition.data_indices().contains(&exemplar.index));
        }
        let mut first = split.partitions()[0].data_indices().to_vec();
        first.sort_unstable();
        assert_eq!(first, vec![0, 2]);
    }

    #[test]
    fn bounds_bracket_final_score_at_every_step() {
        let criterion = ClassMatchCriterion;
        let options = SplitOptions::default();
        for data in [separable_dataset(), alternating_line(14)] {
            for seed in 0..8 {
                let mut cursor =
                    SplitBuildCursor::begin(root_split(&data), &data, &options, seed).unwrap();
                let mut bounds = Vec::new();
                while cursor.has_next() {
                    cursor.advance(&data).unwrap();
                    let split = cursor.split();
                    bounds.push((
                        split.worst_potential_score(&criterion).unwrap(),
                        split.score(&criterion).unwrap(),
                        split.best_potential_score(&criterion).unwrap(),
                    ));
                }
                let last = cursor.split().score(&criterion).unwrap();
                for (worst, score, best) in bounds {
                    assert!(worst <= score + 1e-12, "seed {seed}: worst {worst} > score {score}");
                    assert!(score <= best + 1e-12, "seed {seed}: score {score} > best {best}");
                    assert!(worst <= last + 1e-12 && last <= best + 1e-12);
                }
                let split = cursor.split();
                assert_eq!(split.worst_potential_score(&criterion).unwrap(), last);
                assert_eq!(split.best_potential_score(&criterion).unwrap(), last);
            }
        }
    }

    #[test]
    fn advancing_a_finished_cursor_is_exhausted() {
        let data = four_instance_dataset();
        let options = SplitOptions::default();
        let mut cursor = SplitBuildCursor::begin(root_split(&data), &data, &options, 0).unwrap();
        assert_eq!(cursor.finish(&data).unwrap(), 4);
        assert!(matches!(cursor.advance(&data), Err(TreeError::Exhausted)));
    }

    #[test]
    fn eliminated_cursor_stops() {
        let data = four_instance_dataset();
        let options = SplitOptions::default();
        let mut cursor = SplitBuildCursor::begin(root_split(&data), &data, &options, 0).unwrap();
        cursor.advance(&data).unwrap();
        cursor.eliminate();
        assert!(cursor.is_eliminated());
        assert!(!cursor.has_next());
        assert!(matches!(cursor.advance(&data), Err(TreeError::Exhausted)));
    }

    #[test]
    fn same_seed_builds_the_same_split() {
        let data = separable_dataset();
        let options = SplitOptions::default();
        assert_eq!(built(&data, &options, 99), built(&data, &options, 99));
    }

    #[test]
    fn speedups_do_not_change_assignment() {
        let data = separable_dataset();
        let plain = built(&data, &SplitOptions::default(), 5);
        let fast = built(
            &data,
            &SplitOptions {
                early_abandon_distances: true,
                early_exemplar_check: true,
                partition_examination_reordering: true,
                ..SplitOptions::default()
            },
            5,
        );
        assert_eq!(plain.partitions(), fast.partitions());
    }

    #[test]
    fn multivariate_settings_are_resolved() {
        let data = multivariate_dataset();
        let options = SplitOptions {
            dimension_sampling_mode: DimensionSamplingMode::Single,
            distance_mode: DistanceMode::Independent,
            ..SplitOptions::default()
        };
        let split = built(&data, &options, 1);
        let settings = split.settings().unwrap();
        assert_eq!(settings.transform.dimension_indices().map(<[usize]>::len), Some(1));
        assert_eq!(settings.distance_mode, DistanceMode::Independent);
        assert!(matches!(
            settings.distance_measure,
            DistanceMeasure::Independent(_)
        ));
    }

    #[test]
    fn missing_distance_spaces_is_a_configuration_error() {
        let data = four_instance_dataset();
        let options = SplitOptions {
            distance_spaces: Vec::new(),
            ..SplitOptions::default()
        };
        assert!(matches!(
            SplitBuildCursor::begin(root_split(&data), &data, &options, 0),
            Err(TreeError::Configuration(_))
        ));
    }
}
