pub mod checkpoint;
mod proximity_tree;
pub mod split;
pub mod split_criteria;
pub mod tree;

pub use proximity_tree::{BinarySplitMode, ProximityTree};
