use crate::classifiers::proximity_tree::split::Split;
use crate::classifiers::proximity_tree::tree::TreeNode;
use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of nodes. The root sits at index 0 and every node is stored after
/// its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn new(root: Split) -> Self {
        Self {
            nodes: vec![TreeNode::new(root, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut TreeNode> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&TreeNode, TreeError> {
        self.get(id)
            .ok_or_else(|| TreeError::Invariant(format!("node {id} is not in the tree")))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode, TreeError> {
        self.nodes
            .get_mut(id.0)
            .ok_or_else(|| TreeError::Invariant(format!("node {id} is not in the tree")))
    }

    pub fn add_child(&mut self, parent: NodeId, split: Split) -> Result<NodeId, TreeError> {
        let id = NodeId(self.nodes.len());
        self.node_mut(parent)?.push_child(id);
        self.nodes.push(TreeNode::new(split, Some(parent)));
        Ok(id)
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels; a lone root has height 1.
    pub fn height(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut height = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            let depth = match node.get_parent() {
                Some(parent) => depths.get(parent.0).copied().unwrap_or(0) + 1,
                None => 1,
            };
            depths[i] = depth;
            height = height.max(depth);
        }
        height
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(indices: Vec<usize>) -> Split {
        let labels = vec![0; indices.len()];
        Split::new(indices, labels, 1)
    }

    #[test]
    fn lone_root_has_height_one() {
        let tree = Tree::new(leaf(vec![0, 1]));
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.height(), 1);
        assert!(tree.get(tree.root()).unwrap().is_leaf());
    }

    #[test]
    fn children_link_back_to_parent() {
        let mut tree = Tree::new(leaf(vec![0, 1, 2]));
        let a = tree.add_child(NodeId::ROOT, leaf(vec![0])).unwrap();
        let b = tree.add_child(NodeId::ROOT, leaf(vec![1, 2])).unwrap();
        let c = tree.add_child(b, leaf(vec![2])).unwrap();
        assert_eq!(tree.get(NodeId::ROOT).unwrap().get_children(), &[a, b]);
        assert_eq!(tree.get(c).unwrap().get_parent(), Some(b));
        assert_eq!(tree.size(), 4);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut tree = Tree::new(leaf(vec![0]));
        assert!(matches!(
            tree.add_child(NodeId(7), leaf(vec![0])),
            Err(TreeError::Invariant(_))
        ));
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn serializes_node_ids_as_plain_indices() {
        let mut tree = Tree::new(leaf(vec![0, 1]));
        tree.add_child(NodeId::ROOT, leaf(vec![1])).unwrap();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["nodes"][1]["parent"], 0);
        let back: Tree = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }
}
