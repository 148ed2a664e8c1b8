//! # Node Table
//!
//! Descriptor nodes name their parent by [`NodeId`]. A [`NodeTable`] owns a
//! family of descriptors and resolves those ids, so parent and child never
//! hold each other. Parent links are not validated on insert: a dangling or
//! cyclic link is tolerated and simply ends an ancestor walk.

use std::collections::{HashMap, HashSet};

use metanode_core::NodeId;

use crate::node::{Descriptor, DescriptorNode};

/// Owning table of descriptors keyed by their node id.
#[derive(Debug, Clone)]
pub struct NodeTable<D = DescriptorNode> {
    nodes: HashMap<NodeId, D>,
}

impl<D> Default for NodeTable<D> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }
}

impl<D: Descriptor> NodeTable<D> {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `node` under its own id, replacing any node with the same id.
    pub fn insert(&mut self, node: D) -> NodeId {
        let id = node.node().id();
        self.nodes.insert(id, node);
        id
    }

    /// Look up a node by id.
    pub fn get(&self, id: NodeId) -> Option<&D> {
        self.nodes.get(&id)
    }

    /// Look up a node for mutation. Lifecycle guards still apply.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut D> {
        self.nodes.get_mut(&id)
    }

    /// Take a node out of the table. Children keep their (now dangling) link.
    pub fn remove(&mut self, id: NodeId) -> Option<D> {
        self.nodes.remove(&id)
    }

    /// Resolve the parent of `id`, if both are present.
    pub fn parent_of(&self, id: NodeId) -> Option<&D> {
        let parent = self.get(id)?.node().parent()?;
        self.get(parent)
    }

    /// Ids of nodes whose parent is `id`. Unordered.
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, d)| d.node().parent() == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    /// Ids from the parent of `id` up to the root, nearest first.
    ///
    /// Stops at a parent missing from the table or at a link that would
    /// revisit a node.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut seen = HashSet::from([id]);
        let mut out = Vec::new();
        let mut current = id;
        while let Some(parent) = self.get(current).and_then(|d| d.node().parent()) {
            if !self.nodes.contains_key(&parent) || !seen.insert(parent) {
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }

    /// Number of nodes held.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the table holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over `(id, node)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &D)> {
        self.nodes.iter()
    }
}
