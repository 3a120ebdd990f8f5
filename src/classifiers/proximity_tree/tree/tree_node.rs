use crate::classifiers::proximity_tree::split::Split;
use crate::classifiers::proximity_tree::tree::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    split: Split,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    pub fn new(split: Split, parent: Option<NodeId>) -> Self {
        Self {
            split,
            parent,
            children: Vec::new(),
        }
    }

    pub fn get_split(&self) -> &Split {
        &self.split
    }

    pub fn set_split(&mut self, split: Split) {
        self.split = split;
    }

    pub fn get_parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in partition order: child `i` holds the data of partition `i`.
    pub fn get_children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }
}
