use crate::build::BuildError;
use crate::choices::{ProximityTreeParams, SplitCriterionChoice};
use crate::classifiers::ProximityTree;
use crate::classifiers::proximity_tree::checkpoint::JsonFileCheckpointer;
use crate::classifiers::proximity_tree::split_criteria::{
    GiniSplitCriterion, InfoGainSplitCriterion, SplitCriterion,
};
use std::time::Duration;

fn seconds(name: &str, value: Option<f64>) -> Result<Option<Duration>, BuildError> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|_| {
                BuildError::InvalidParameter(format!(
                    "{name} must be a non-negative number of seconds, got {secs}"
                ))
            })
        })
        .transpose()
}

impl TryFrom<ProximityTreeParams> for ProximityTree {
    type Error = BuildError;

    fn try_from(params: ProximityTreeParams) -> Result<Self, Self::Error> {
        let split_criterion: Box<dyn SplitCriterion> = match params.split_criterion {
            SplitCriterionChoice::Gini(_) => Box::new(GiniSplitCriterion::new()),
            SplitCriterionChoice::InfoGain(_) => Box::new(InfoGainSplitCriterion::new()),
        };

        let mut tree = ProximityTree::new(params.seed).with_split_criterion(split_criterion);
        tree.set_r(params.r)?;
        tree.set_distance_spaces(params.distance_spaces)?;
        tree.set_breadth_first(params.breadth_first);
        tree.set_early_abandon_splits(params.early_abandon_splits)?;
        tree.set_binary_split_mode(params.binary_split_mode)?;
        tree.set_early_abandon_distances(params.early_abandon_distances);
        tree.set_early_exemplar_check(params.early_exemplar_check);
        tree.set_partition_examination_reordering(params.partition_examination_reordering);
        tree.set_dimension_sampling_mode(params.dimension_sampling_mode);
        tree.set_dimension_conversion_mode(params.dimension_conversion_mode);
        tree.set_distance_mode(params.distance_mode);
        tree.set_train_time_limit(seconds("train_time_limit_secs", params.train_time_limit_secs)?);
        tree.set_test_time_limit(seconds("test_time_limit_secs", params.test_time_limit_secs)?);

        if let Some(path) = params.checkpoint_path {
            let checkpointer = JsonFileCheckpointer::new(path)
                .with_interval(Duration::from_secs(params.checkpoint_interval_secs))
                .with_loading_enabled(params.checkpoint_loading_enabled);
            tree.set_checkpointer(Some(Box::new(checkpointer)));
        }
        Ok(tree)
    }
}
