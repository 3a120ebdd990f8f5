mod found_node;
mod tree;
mod tree_node;

pub use found_node::FoundNode;
pub use tree::{NodeId, Tree};
pub use tree_node::TreeNode;
