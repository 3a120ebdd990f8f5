use crate::classifiers::Classifier;
use crate::classifiers::proximity_tree::checkpoint::{BuildState, Checkpointer};
use crate::classifiers::proximity_tree::split::{Split, SplitOptions, select_best_split};
use crate::classifiers::proximity_tree::split_criteria::{GiniSplitCriterion, SplitCriterion};
use crate::classifiers::proximity_tree::tree::{FoundNode, NodeId, Tree};
use crate::core::dimensions::{DimensionConversionMode, DimensionSamplingMode, DistanceMode};
use crate::core::instances::{TimeSeriesInstance, TimeSeriesInstances};
use crate::distances::DistanceMeasureSpace;
use crate::error::TreeError;
use crate::utils::{Clock, MonotonicClock, StopWatch};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use strum_macros::{Display, EnumString};

/// How a multi-class problem would be reduced to two classes when splits
/// are raced. Only accepted while splits are built sequentially.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BinarySplitMode {
    MajorityClass,
    Random,
}

fn per_instance(duration: Duration, count: usize) -> Duration {
    duration / u32::try_from(count.max(1)).unwrap_or(u32::MAX)
}

/// The stream used for prediction tie-breaks, kept apart from the
/// checkpointed training stream.
fn test_stream(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(1);
    rng
}

fn times(duration: Duration, count: usize) -> Duration {
    duration.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX))
}

/// A randomized decision tree over time series that splits each node's data
/// by proximity to one exemplar per class.
///
/// Growth is contracted: with a train time limit the tree grows only while
/// the next node is predicted to fit, and a later `build` with a larger
/// limit carries on where the previous one stopped.
#[derive(Debug)]
pub struct ProximityTree {
    seed: u64,
    rng: ChaCha8Rng,
    test_rng: ChaCha8Rng,
    r: usize,
    split_options: SplitOptions,
    split_criterion: Box<dyn SplitCriterion>,
    breadth_first: bool,
    early_abandon_splits: bool,
    binary_split_mode: Option<BinarySplitMode>,
    train_time_limit: Option<Duration>,
    test_time_limit: Option<Duration>,
    checkpointer: Option<Box<dyn Checkpointer>>,
    clock: Box<dyn Clock>,
    rebuild: bool,
    tree: Option<Tree>,
    queue: VecDeque<NodeId>,
    longest_time_per_instance: Duration,
    longest_test_step: Duration,
    run_timer: StopWatch,
    checkpoint_timer: StopWatch,
    test_timer: StopWatch,
    num_classes: usize,
}

impl ProximityTree {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            test_rng: test_stream(seed),
            r: 1,
            split_options: SplitOptions::default(),
            split_criterion: Box::new(GiniSplitCriterion::new()),
            breadth_first: false,
            early_abandon_splits: false,
            binary_split_mode: None,
            train_time_limit: None,
            test_time_limit: None,
            checkpointer: None,
            clock: Box::new(MonotonicClock::new()),
            rebuild: true,
            tree: None,
            queue: VecDeque::new(),
            longest_time_per_instance: Duration::ZERO,
            longest_test_step: Duration::ZERO,
            run_timer: StopWatch::new(),
            checkpoint_timer: StopWatch::new(),
            test_timer: StopWatch::new(),
            num_classes: 0,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_checkpointer(mut self, checkpointer: Box<dyn Checkpointer>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn with_split_criterion(mut self, criterion: Box<dyn SplitCriterion>) -> Self {
        self.split_criterion = criterion;
        self
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    /// Changes the seed; only a fresh build picks it up.
    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn get_r(&self) -> usize {
        self.r
    }

    pub fn set_r(&mut self, r: usize) -> Result<(), TreeError> {
        if r == 0 {
            return Err(TreeError::Configuration(
                "r must be at least 1 candidate split per node".into(),
            ));
        }
        self.r = r;
        Ok(())
    }

    pub fn get_split_options(&self) -> &SplitOptions {
        &self.split_options
    }

    pub fn get_distance_spaces(&self) -> &[DistanceMeasureSpace] {
        &self.split_options.distance_spaces
    }

    pub fn set_distance_spaces(
        &mut self,
        spaces: Vec<DistanceMeasureSpace>,
    ) -> Result<(), TreeError> {
        if spaces.is_empty() {
            return Err(TreeError::Configuration(
                "at least one distance measure space is required".into(),
            ));
        }
        self.split_options.distance_spaces = spaces;
        Ok(())
    }

    pub fn set_split_criterion(&mut self, criterion: Box<dyn SplitCriterion>) {
        self.split_criterion = criterion;
    }

    pub fn is_breadth_first(&self) -> bool {
        self.breadth_first
    }

    pub fn set_breadth_first(&mut self, breadth_first: bool) {
        self.breadth_first = breadth_first;
    }

    pub fn is_early_abandon_splits(&self) -> bool {
        self.early_abandon_splits
    }

    pub fn set_early_abandon_splits(&mut self, early_abandon_splits: bool) -> Result<(), TreeError> {
        if early_abandon_splits && self.binary_split_mode.is_some() {
            return Err(TreeError::NotImplemented(
                "binary split mode with early abandoned splits",
            ));
        }
        self.early_abandon_splits = early_abandon_splits;
        Ok(())
    }

    pub fn get_binary_split_mode(&self) -> Option<BinarySplitMode> {
        self.binary_split_mode
    }

    pub fn set_binary_split_mode(&mut self, mode: Option<BinarySplitMode>) -> Result<(), TreeError> {
        if mode.is_some() && self.early_abandon_splits {
            return Err(TreeError::NotImplemented(
                "binary split mode with early abandoned splits",
            ));
        }
        self.binary_split_mode = mode;
        Ok(())
    }

    pub fn is_early_abandon_distances(&self) -> bool {
        self.split_options.early_abandon_distances
    }

    pub fn set_early_abandon_distances(&mut self, enabled: bool) {
        self.split_options.early_abandon_distances = enabled;
    }

    pub fn is_early_exemplar_check(&self) -> bool {
        self.split_options.early_exemplar_check
    }

    pub fn set_early_exemplar_check(&mut self, enabled: bool) {
        self.split_options.early_exemplar_check = enabled;
    }

    pub fn is_partition_examination_reordering(&self) -> bool {
        self.split_options.partition_examination_reordering
    }

    /// Reordering only pays off with abandoned distances, so enabling it
    /// enables those too.
    pub fn set_partition_examination_reordering(&mut self, enabled: bool) {
        self.split_options.partition_examination_reordering = enabled;
        if enabled {
            self.split_options.early_abandon_distances = true;
        }
    }

    pub fn set_dimension_sampling_mode(&mut self, mode: DimensionSamplingMode) {
        self.split_options.dimension_sampling_mode = mode;
    }

    pub fn set_dimension_conversion_mode(&mut self, mode: DimensionConversionMode) {
        self.split_options.dimension_conversion_mode = mode;
    }

    pub fn set_distance_mode(&mut self, mode: DistanceMode) {
        self.split_options.distance_mode = mode;
    }

    pub fn get_train_time_limit(&self) -> Option<Duration> {
        self.train_time_limit
    }

    pub fn set_train_time_limit(&mut self, limit: Option<Duration>) {
        self.train_time_limit = limit;
    }

    pub fn get_test_time_limit(&self) -> Option<Duration> {
        self.test_time_limit
    }

    pub fn set_test_time_limit(&mut self, limit: Option<Duration>) {
        self.test_time_limit = limit;
    }

    pub fn set_checkpointer(&mut self, checkpointer: Option<Box<dyn Checkpointer>>) {
        self.checkpointer = checkpointer;
    }

    pub fn is_rebuild(&self) -> bool {
        self.rebuild
    }

    /// With `rebuild` set the next build starts over, from a checkpoint when
    /// one loads and from scratch otherwise.
    pub fn set_rebuild(&mut self, rebuild: bool) {
        self.rebuild = rebuild;
    }

    pub fn get_tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    pub fn get_queue(&self) -> &VecDeque<NodeId> {
        &self.queue
    }

    pub fn get_longest_time_per_instance(&self) -> Duration {
        self.longest_time_per_instance
    }

    pub fn get_num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn get_run_time(&self) -> Duration {
        self.run_timer.elapsed(self.clock.as_ref())
    }

    pub fn get_checkpoint_time(&self) -> Duration {
        self.checkpoint_timer.elapsed(self.clock.as_ref())
    }

    /// Run time spent outside checkpointing.
    pub fn get_train_time(&self) -> Duration {
        self.get_run_time().saturating_sub(self.get_checkpoint_time())
    }

    pub fn get_test_time(&self) -> Duration {
        self.test_timer.elapsed(self.clock.as_ref())
    }

    pub fn height(&self) -> usize {
        self.tree.as_ref().map_or(0, Tree::height)
    }

    pub fn size(&self) -> usize {
        self.tree.as_ref().map_or(0, Tree::size)
    }

    pub fn is_fully_built(&self) -> bool {
        self.tree.is_some() && self.queue.is_empty()
    }

    /// Grows the tree on `data` within the train time limit.
    pub fn build(&mut self, data: &TimeSeriesInstances) -> Result<(), TreeError> {
        self.run_timer.start(self.clock.as_ref());
        let result = self.grow(data);
        self.run_timer.stop(self.clock.as_ref());
        result
    }

    fn grow(&mut self, data: &TimeSeriesInstances) -> Result<(), TreeError> {
        if data.is_empty() {
            return Err(TreeError::InvalidData("training data is empty".into()));
        }
        if self.rebuild {
            self.checkpoint_timer = StopWatch::new();
            self.test_rng = test_stream(self.seed);
            let resumed = self.load_checkpoint(data)?;
            if !resumed {
                self.reset(data);
                info!(
                    "building proximity tree from scratch on {} instances of {} classes",
                    data.len(),
                    data.num_classes()
                );
            }
            self.rebuild = false;
        } else {
            self.check_matches(data)?;
        }

        let mut work_done = false;
        while let Some(&next) = self.queue.front() {
            let tree = self.tree.as_mut().ok_or_else(|| {
                TreeError::Invariant("build queue is set but the tree is missing".into())
            })?;
            let next_size = tree.node(next)?.get_split().len();
            if let Some(limit) = self.train_time_limit {
                let train_time = self
                    .run_timer
                    .elapsed(self.clock.as_ref())
                    .saturating_sub(self.checkpoint_timer.elapsed(self.clock.as_ref()));
                let predicted = train_time + times(self.longest_time_per_instance, next_size);
                if predicted >= limit {
                    info!(
                        "train time limit reached: {:?} predicted against {:?}, {} nodes queued",
                        predicted,
                        limit,
                        self.queue.len()
                    );
                    break;
                }
            }

            let node_start = self.clock.now();
            self.queue.pop_front();
            let selection = select_best_split(
                tree.node(next)?.get_split(),
                data,
                &self.split_options,
                self.split_criterion.as_ref(),
                self.r,
                self.early_abandon_splits,
                &mut self.rng,
            )?;
            let children: Vec<Split> = selection
                .split
                .partitions()
                .iter()
                .map(|p| Split::new(p.data_indices().to_vec(), p.labels().to_vec(), self.num_classes))
                .collect();
            let num_partitions = children.len();
            tree.node_mut(next)?.set_split(selection.split);

            let mut to_expand = Vec::with_capacity(children.len());
            for child in children {
                let impure = !child.is_pure();
                let id = tree.add_child(next, child)?;
                if impure {
                    to_expand.push(id);
                }
            }
            self.enqueue(&to_expand);

            let node_time = self.clock.now().saturating_sub(node_start);
            let estimate = per_instance(node_time, next_size) + Duration::from_nanos(1);
            self.longest_time_per_instance = self.longest_time_per_instance.max(estimate);
            work_done = true;
            debug!(
                "built node {next}: {next_size} instances into {num_partitions} partitions, score {:.6}, {:?} per instance",
                selection.score, self.longest_time_per_instance
            );

            self.save_checkpoint(false)?;
        }

        if work_done {
            self.save_checkpoint(true)?;
        }
        if self.queue.is_empty() {
            info!(
                "proximity tree fully built: {} nodes, height {}",
                self.size(),
                self.height()
            );
        }
        Ok(())
    }

    /// Breadth first appends `children`; depth first puts them, in order,
    /// ahead of everything already queued.
    fn enqueue(&mut self, children: &[NodeId]) {
        if self.breadth_first {
            self.queue.extend(children.iter().copied());
        } else {
            for &id in children.iter().rev() {
                self.queue.push_front(id);
            }
        }
    }

    fn reset(&mut self, data: &TimeSeriesInstances) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.num_classes = data.num_classes();
        let labels = (0..data.len())
            .map(|i| data.label_of(i).unwrap_or(0))
            .collect();
        let root = Split::new((0..data.len()).collect(), labels, self.num_classes);
        self.tree = Some(Tree::new(root));
        self.queue = VecDeque::from([NodeId::ROOT]);
        self.longest_time_per_instance = Duration::ZERO;
        self.run_timer.reset_elapsed();
    }

    fn check_matches(&self, data: &TimeSeriesInstances) -> Result<(), TreeError> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| TreeError::Invariant("no tree to continue building".into()))?;
        let root_size = tree.node(tree.root())?.get_split().len();
        if root_size != data.len() || self.num_classes != data.num_classes() {
            return Err(TreeError::Invariant(format!(
                "tree was built on {root_size} instances of {} classes but got {} of {}",
                self.num_classes,
                data.len(),
                data.num_classes()
            )));
        }
        Ok(())
    }

    /// Restores the last checkpoint, if any. Load time counts as checkpoint time.
    fn load_checkpoint(&mut self, data: &TimeSeriesInstances) -> Result<bool, TreeError> {
        let Some(checkpointer) = self.checkpointer.as_mut() else {
            return Ok(false);
        };
        let started = self.clock.now();
        let state = checkpointer.load()?;
        let load_time = self.clock.now().saturating_sub(started);

        let Some(state) = state else {
            self.checkpoint_timer.add(load_time);
            return Ok(false);
        };
        self.tree = Some(state.tree);
        self.queue = state.queue;
        self.longest_time_per_instance = state.longest_time_per_instance;
        self.rng = state.rng;
        self.num_classes = state.num_classes;
        self.check_matches(data)?;

        let mut run_timer = StopWatch::with_elapsed(state.run_time + load_time);
        run_timer.start(self.clock.as_ref());
        self.run_timer = run_timer;
        self.checkpoint_timer = StopWatch::with_elapsed(state.checkpoint_time + load_time);
        info!(
            "resumed proximity tree from checkpoint: {} nodes built, {} queued",
            self.size(),
            self.queue.len()
        );
        Ok(true)
    }

    fn save_checkpoint(&mut self, force: bool) -> Result<bool, TreeError> {
        match self.checkpointer.as_ref() {
            None => return Ok(false),
            Some(checkpointer) if !force && !checkpointer.is_save_due() => return Ok(false),
            Some(_) => {}
        }
        let Some(tree) = self.tree.as_ref() else {
            return Ok(false);
        };
        self.checkpoint_timer.start(self.clock.as_ref());
        let state = BuildState {
            tree: tree.clone(),
            queue: self.queue.clone(),
            longest_time_per_instance: self.longest_time_per_instance,
            run_time: self.run_timer.elapsed(self.clock.as_ref()),
            checkpoint_time: self.checkpoint_timer.elapsed(self.clock.as_ref()),
            rng: self.rng.clone(),
            num_classes: self.num_classes,
        };
        let saved = match self.checkpointer.as_mut() {
            Some(checkpointer) => checkpointer.save(&state, force),
            None => Ok(false),
        };
        self.checkpoint_timer.stop(self.clock.as_ref());
        let saved = saved?;
        if saved {
            info!(
                "saved {}checkpoint with {} nodes",
                if force { "final " } else { "" },
                state.tree.size()
            );
        }
        Ok(saved)
    }

    /// Routes `instance` down the tree, returning each step taken. Stops
    /// early when the test time limit would be exceeded by another step.
    pub fn traverse(&mut self, instance: &TimeSeriesInstance) -> Result<Vec<FoundNode>, TreeError> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| TreeError::InvalidData("the classifier has not been built".into()))?;
        let mut path = Vec::new();
        let mut node = tree.root();
        loop {
            let current = tree.node(node)?;
            if current.is_leaf() {
                break;
            }
            let step_start = match self.test_time_limit {
                Some(limit) => {
                    let spent = self.test_timer.elapsed(self.clock.as_ref());
                    if spent + self.longest_test_step >= limit {
                        warn!(
                            "test time limit {:?} reached after {} steps, predicting from node {}",
                            limit,
                            path.len(),
                            node
                        );
                        break;
                    }
                    Some(self.clock.now())
                }
                None => None,
            };

            let branch = current
                .get_split()
                .find_partition_index_for_unseen(instance, &mut self.test_rng)?;
            let child = *current.get_children().get(branch).ok_or_else(|| {
                TreeError::Invariant(format!("node {node} has no child for partition {branch}"))
            })?;
            if let Some(start) = step_start {
                let step = self.clock.now().saturating_sub(start);
                self.longest_test_step = self.longest_test_step.max(step);
            }
            path.push(FoundNode::new(child, Some(node), Some(branch)));
            node = child;
        }
        Ok(path)
    }

    fn predict(&mut self, instance: &TimeSeriesInstance) -> Result<Vec<f64>, TreeError> {
        let path = self.traverse(instance)?;
        let uniform = vec![1.0 / self.num_classes.max(1) as f64; self.num_classes];
        let Some(last) = path.last() else {
            return Ok(uniform);
        };
        let (Some(parent), Some(branch)) = (last.get_parent(), last.get_parent_branch()) else {
            return Ok(uniform);
        };
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| TreeError::Invariant("tree vanished during prediction".into()))?;
        let partition = tree
            .node(parent)?
            .get_split()
            .partition(branch)
            .ok_or_else(|| {
                TreeError::Invariant(format!("node {parent} has no partition {branch}"))
            })?;
        Ok(partition.distribution_for_instance())
    }
}

impl Classifier for ProximityTree {
    fn build_classifier(&mut self, data: &TimeSeriesInstances) -> Result<(), TreeError> {
        self.build(data)
    }

    fn distribution_for_instance(
        &mut self,
        instance: &TimeSeriesInstance,
    ) -> Result<Vec<f64>, TreeError> {
        self.test_timer.reset();
        self.test_timer.start(self.clock.as_ref());
        let result = self.predict(instance);
        self.test_timer.stop(self.clock.as_ref());
        result
    }
}
