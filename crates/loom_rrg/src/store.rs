//! The node store: append-only owner of every routing node.

use crate::error::RrgError;
use crate::ids::NodeId;
use crate::node::{Bounds, NodeKind, RoutingNode};
use serde::{Deserialize, Serialize};

/// Owns all routing nodes. IDs are dense, assigned in allocation order and
/// never reused, so other components may cache them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStore {
    pub(crate) nodes: Vec<RoutingNode>,
    pub(crate) duplicate_attempts: usize,
}

impl NodeStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fresh node and returns its ID.
    ///
    /// Channel nodes with an inverted rectangle are rejected.
    pub fn allocate(&mut self, kind: NodeKind, bounds: Bounds) -> Result<NodeId, RrgError> {
        if kind.is_channel() && bounds.is_inverted() {
            return Err(RrgError::InvalidBounds { kind, bounds });
        }
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(RoutingNode::new(kind, bounds));
        Ok(id)
    }

    /// Returns the node with the given ID.
    pub fn get(&self, id: NodeId) -> Result<&RoutingNode, RrgError> {
        let index = self.check(id)?;
        Ok(&self.nodes[index])
    }

    /// Returns a mutable reference to the node with the given ID.
    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut RoutingNode, RrgError> {
        let index = self.check(id)?;
        Ok(&mut self.nodes[index])
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over `(id, node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &RoutingNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::from_raw(i as u32), n))
    }

    /// Total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    pub(crate) fn check(&self, id: NodeId) -> Result<usize, RrgError> {
        if id.index() < self.nodes.len() {
            Ok(id.index())
        } else {
            Err(RrgError::OutOfRange {
                id,
                len: self.nodes.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_common::Coord;

    #[test]
    fn ids_are_dense() {
        let mut store = NodeStore::new();
        let a = store.allocate(NodeKind::Source, Bounds::point(Coord::new(1, 1))).unwrap();
        let b = store.allocate(NodeKind::Opin, Bounds::point(Coord::new(1, 1))).unwrap();
        assert_eq!(a.as_raw(), 0);
        assert_eq!(b.as_raw(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(b).unwrap().kind, NodeKind::Opin);
    }

    #[test]
    fn inverted_channel_rejected() {
        let mut store = NodeStore::new();
        let err = store
            .allocate(NodeKind::ChanY, Bounds::new(2, 2, 3, 1))
            .unwrap_err();
        assert!(matches!(err, RrgError::InvalidBounds { kind: NodeKind::ChanY, .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn inverted_pin_bounds_are_not_checked() {
        let mut store = NodeStore::new();
        assert!(store.allocate(NodeKind::Ipin, Bounds::new(2, 1, 0, 0)).is_ok());
    }

    #[test]
    fn out_of_range_lookup() {
        let mut store = NodeStore::new();
        store.allocate(NodeKind::Sink, Bounds::point(Coord::new(0, 1))).unwrap();
        let err = store.get(NodeId::from_raw(1)).unwrap_err();
        assert!(matches!(err, RrgError::OutOfRange { len: 1, .. }));
        assert!(store.get_mut(NodeId::from_raw(9)).is_err());
    }

    #[test]
    fn get_mut_updates_attributes() {
        let mut store = NodeStore::new();
        let id = store.allocate(NodeKind::ChanX, Bounds::new(1, 2, 0, 0)).unwrap();
        store.get_mut(id).unwrap().ptc_num = 7;
        assert_eq!(store.get(id).unwrap().ptc_num, 7);
    }

    #[test]
    fn iter_yields_ids_in_order() {
        let mut store = NodeStore::new();
        for _ in 0..3 {
            store.allocate(NodeKind::Ipin, Bounds::point(Coord::new(1, 1))).unwrap();
        }
        let ids: Vec<u32> = store.iter().map(|(id, _)| id.as_raw()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
