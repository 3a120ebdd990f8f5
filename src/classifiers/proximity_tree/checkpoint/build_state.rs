use crate::classifiers::proximity_tree::tree::{NodeId, Tree};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Everything needed to resume growing a tree where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildState {
    pub tree: Tree,
    pub queue: VecDeque<NodeId>,
    pub longest_time_per_instance: Duration,
    pub run_time: Duration,
    pub checkpoint_time: Duration,
    pub rng: ChaCha8Rng,
    pub num_classes: usize,
}
