//! Arena-allocated tree with parent/children linkage.
//!
//! Nodes are stored in a contiguous Vec and referenced by [`NodeId`]
//! indices. Each node is owned by the arena; the parent link is a plain
//! index used only to walk upwards, so dropping the tree never follows it.

use std::collections::VecDeque;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node's linkage plus its payload.
#[derive(Debug, Clone)]
pub struct TreeNode<T> {
    parent: NodeId,
    children: Vec<NodeId>,
    pub data: T,
}

impl<T> TreeNode<T> {
    fn new(parent: NodeId, data: T) -> Self {
        Self {
            parent,
            children: Vec::new(),
            data,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent.is_some().then_some(self.parent)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A node without a parent.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// A node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Tree with arena-based node storage.
#[derive(Debug, Clone)]
pub struct Tree<T> {
    /// Arena storing all nodes
    nodes: Vec<TreeNode<T>>,

    /// Root node index (always 0)
    root: NodeId,
}

impl<T> Tree<T> {
    /// Create a tree holding a single root.
    pub fn new(root_data: T) -> Self {
        Self {
            nodes: vec![TreeNode::new(NodeId::NONE, root_data)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Linkage and payload of a node.
    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode<T> {
        &self.nodes[id.index()]
    }

    /// Payload of a node.
    #[inline]
    pub fn get(&self, id: NodeId) -> &T {
        &self.nodes[id.index()].data
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id.index()].data
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent()
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    #[inline]
    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).is_root()
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    /// Append a child under `parent` and link it back. Returns the new child's NodeId.
    pub fn add_child(&mut self, parent: NodeId, data: T) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(TreeNode::new(parent, data));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Make `new_root` the root, dropping every node outside its subtree.
    ///
    /// The surviving nodes are compacted into a fresh arena in breadth-first
    /// order, so the new root gets index 0 and children keep their order.
    pub fn reroot(&mut self, new_root: NodeId) {
        if new_root == self.root {
            return;
        }

        let mut old: Vec<Option<TreeNode<T>>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes: Vec<TreeNode<T>> = Vec::new();
        let mut queue = VecDeque::from([(new_root, NodeId::NONE)]);

        while let Some((old_id, parent)) = queue.pop_front() {
            let Some(node) = old[old_id.index()].take() else {
                continue;
            };
            let id = NodeId(nodes.len() as u32);
            if parent.is_some() {
                nodes[parent.index()].children.push(id);
            }
            queue.extend(node.children.iter().map(|&child| (child, id)));
            nodes.push(TreeNode::new(parent, node.data));
        }

        self.nodes = nodes;
        self.root = NodeId(0);
    }

    /// Length of the longest root-to-leaf path.
    pub fn max_depth(&self) -> u32 {
        self.depth_below(self.root, 0)
    }

    fn depth_below(&self, id: NodeId, current_depth: u32) -> u32 {
        self.children(id)
            .iter()
            .map(|&child| self.depth_below(child, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_none() {
        assert!(NodeId::NONE.is_none());
        assert!(!NodeId::NONE.is_some());
        assert!(NodeId(0).is_some());
    }

    #[test]
    fn test_new_tree() {
        let tree = Tree::new("root");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));
        assert!(tree.is_root(tree.root()));
        assert!(tree.is_leaf(tree.root()));
        assert_eq!(tree.parent(tree.root()), None);
        assert_eq!(*tree.get(tree.root()), "root");
    }

    #[test]
    fn test_add_child() {
        let mut tree = Tree::new(0);
        let a = tree.add_child(tree.root(), 1);
        let b = tree.add_child(tree.root(), 2);
        let c = tree.add_child(a, 3);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.children(tree.root()), &[a, b]);
        assert_eq!(tree.parent(c), Some(a));
        assert!(!tree.is_root(a));
        assert!(!tree.is_leaf(a));
        assert!(tree.is_leaf(b));
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_reroot_keeps_only_subtree() {
        let mut tree = Tree::new("r");
        let a = tree.add_child(tree.root(), "a");
        let b = tree.add_child(tree.root(), "b");
        let a1 = tree.add_child(a, "a1");
        tree.add_child(a, "a2");
        tree.add_child(a1, "a1x");
        tree.add_child(b, "b1");

        tree.reroot(a);

        assert_eq!(tree.len(), 4);
        let root = tree.root();
        assert_eq!(*tree.get(root), "a");
        assert!(tree.is_root(root));

        let labels: Vec<_> = tree.children(root).iter().map(|&id| *tree.get(id)).collect();
        assert_eq!(labels, vec!["a1", "a2"]);

        let first = tree.children(root)[0];
        assert_eq!(tree.parent(first), Some(root));
        let grandchild = tree.children(first)[0];
        assert_eq!(*tree.get(grandchild), "a1x");
        assert_eq!(tree.max_depth(), 2);
    }

    #[test]
    fn test_reroot_to_current_root_is_noop() {
        let mut tree = Tree::new(1);
        tree.add_child(tree.root(), 2);
        tree.reroot(tree.root());
        assert_eq!(tree.len(), 2);
    }
}
