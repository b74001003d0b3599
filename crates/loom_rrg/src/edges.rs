//! The edge builder: deduplicating edge insertion with fan-in bookkeeping.

use crate::error::RrgError;
use crate::ids::NodeId;
use crate::node::Edge;
use crate::store::NodeStore;
use loom_arch::SwitchId;
use std::collections::HashSet;

/// Incoming `(driver, switch)` pairs for every node, indexed by target.
pub type FanInIndex = Vec<Vec<(NodeId, SwitchId)>>;

impl NodeStore {
    /// Adds the edge `src -> dst` through `switch`.
    ///
    /// If `src` already drives `dst` the call changes nothing and returns
    /// `Ok(false)`; the attempt is counted in [`duplicate_attempts`].
    ///
    /// [`duplicate_attempts`]: NodeStore::duplicate_attempts
    pub fn add_edge(
        &mut self,
        src: NodeId,
        dst: NodeId,
        switch: SwitchId,
    ) -> Result<bool, RrgError> {
        let s = self.check(src)?;
        let d = self.check(dst)?;
        if self.nodes[s].edges.iter().any(|e| e.target == dst) {
            self.duplicate_attempts += 1;
            return Ok(false);
        }
        self.nodes[s].edges.push(Edge { target: dst, switch });
        self.nodes[d].fan_in += 1;
        Ok(true)
    }

    /// Adds a batch of edges from `src`, returning how many were new.
    ///
    /// Targets already driven by `src`, and repeats within the batch, are
    /// dropped; the first occurrence wins. Every target is range-checked
    /// before anything is inserted.
    pub fn add_edges_bulk(
        &mut self,
        src: NodeId,
        edges: impl IntoIterator<Item = (NodeId, SwitchId)>,
    ) -> Result<usize, RrgError> {
        let s = self.check(src)?;
        let batch: Vec<(NodeId, SwitchId)> = edges.into_iter().collect();
        for &(dst, _) in &batch {
            self.check(dst)?;
        }

        let mut seen: HashSet<NodeId> = self.nodes[s].edges.iter().map(|e| e.target).collect();
        let mut added = Vec::with_capacity(batch.len());
        for (target, switch) in batch {
            if seen.insert(target) {
                added.push(Edge { target, switch });
            } else {
                self.duplicate_attempts += 1;
            }
        }
        for edge in &added {
            self.nodes[edge.target.index()].fan_in += 1;
        }
        let count = added.len();
        self.nodes[s].edges.extend(added);
        Ok(count)
    }

    /// Number of insertions dropped because the edge already existed.
    pub fn duplicate_attempts(&self) -> usize {
        self.duplicate_attempts
    }

    /// Builds the reverse adjacency of the graph.
    pub fn fan_in_index(&self) -> FanInIndex {
        let mut index = vec![Vec::new(); self.nodes.len()];
        for (src, node) in self.iter() {
            for edge in node.edges() {
                index[edge.target.index()].push((src, edge.switch));
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Bounds, NodeKind};
    use loom_common::Coord;

    fn store_with(n: usize) -> (NodeStore, Vec<NodeId>) {
        let mut store = NodeStore::new();
        let ids = (0..n)
            .map(|_| {
                store
                    .allocate(NodeKind::ChanX, Bounds::new(1, 1, 0, 0))
                    .unwrap()
            })
            .collect();
        (store, ids)
    }

    fn sw() -> SwitchId {
        SwitchId::from_raw(0)
    }

    #[test]
    fn add_edge_counts_fan_in() {
        let (mut store, ids) = store_with(3);
        assert!(store.add_edge(ids[0], ids[2], sw()).unwrap());
        assert!(store.add_edge(ids[1], ids[2], sw()).unwrap());
        assert_eq!(store.get(ids[2]).unwrap().fan_in(), 2);
        assert_eq!(store.get(ids[0]).unwrap().fan_out(), 1);
    }

    #[test]
    fn add_edge_is_idempotent() {
        let (mut store, ids) = store_with(2);
        store.add_edge(ids[0], ids[1], sw()).unwrap();
        assert!(!store.add_edge(ids[0], ids[1], sw()).unwrap());
        assert!(!store.add_edge(ids[0], ids[1], SwitchId::from_raw(1)).unwrap());
        assert_eq!(store.get(ids[0]).unwrap().edges().len(), 1);
        assert_eq!(store.get(ids[1]).unwrap().fan_in(), 1);
        assert_eq!(store.duplicate_attempts(), 2);
    }

    #[test]
    fn add_edge_out_of_range() {
        let (mut store, ids) = store_with(1);
        let bogus = NodeId::from_raw(5);
        assert!(matches!(
            store.add_edge(ids[0], bogus, sw()),
            Err(RrgError::OutOfRange { .. })
        ));
        assert!(store.add_edge(bogus, ids[0], sw()).is_err());
        assert_eq!(store.get(ids[0]).unwrap().fan_in(), 0);
    }

    #[test]
    fn bulk_dedups_within_batch_and_against_existing() {
        let (mut store, ids) = store_with(4);
        store.add_edge(ids[0], ids[1], sw()).unwrap();
        let added = store
            .add_edges_bulk(
                ids[0],
                vec![(ids[1], sw()), (ids[2], sw()), (ids[3], sw()), (ids[2], sw())],
            )
            .unwrap();
        assert_eq!(added, 2);
        let targets: Vec<NodeId> = store.get(ids[0]).unwrap().edges().iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![ids[1], ids[2], ids[3]]);
        assert_eq!(store.get(ids[2]).unwrap().fan_in(), 1);
        assert_eq!(store.duplicate_attempts(), 2);
    }

    #[test]
    fn bulk_rejects_whole_batch_on_bad_target() {
        let (mut store, ids) = store_with(2);
        let err = store
            .add_edges_bulk(ids[0], vec![(ids[1], sw()), (NodeId::from_raw(9), sw())])
            .unwrap_err();
        assert!(matches!(err, RrgError::OutOfRange { .. }));
        assert!(store.get(ids[0]).unwrap().edges().is_empty());
        assert_eq!(store.get(ids[1]).unwrap().fan_in(), 0);
    }

    #[test]
    fn fan_in_index_matches_counts() {
        let (mut store, ids) = store_with(3);
        store.add_edges_bulk(ids[0], vec![(ids[1], sw()), (ids[2], sw())]).unwrap();
        store.add_edge(ids[1], ids[2], SwitchId::from_raw(3)).unwrap();
        let index = store.fan_in_index();
        assert_eq!(index[2], vec![(ids[0], sw()), (ids[1], SwitchId::from_raw(3))]);
        for (id, node) in store.iter() {
            assert_eq!(index[id.index()].len() as u32, node.fan_in());
        }
    }

    #[test]
    fn pins_are_valid_endpoints() {
        let mut store = NodeStore::new();
        let opin = store.allocate(NodeKind::Opin, Bounds::point(Coord::new(1, 1))).unwrap();
        let chan = store.allocate(NodeKind::ChanY, Bounds::new(1, 1, 1, 2)).unwrap();
        assert_eq!(store.add_edges_bulk(opin, [(chan, sw())]).unwrap(), 1);
    }
}
