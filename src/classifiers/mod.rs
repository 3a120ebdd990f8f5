pub mod classifier;
pub mod proximity_tree;

pub use classifier::Classifier;
pub use proximity_tree::ProximityTree;
