//! The routing graph aggregate: nodes plus the coordinate indices over them.

use crate::chan::{ChanType, ChannelNodes, TrackPlan};
use crate::error::RrgError;
use crate::grid::DeviceGrid;
use crate::ids::NodeId;
use crate::node::{Bounds, NodeKind};
use crate::store::NodeStore;
use loom_arch::{ArchError, Architecture, PinType, TileType, TileTypeId};
use loom_common::Coord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Nodes owned by one placed block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileNodes {
    /// Tile type of the block.
    pub tile: TileTypeId,
    /// SOURCE or SINK node per pin class.
    pub classes: Vec<NodeId>,
    /// IPIN or OPIN node per pin.
    pub pins: Vec<NodeId>,
}

/// Every routing node of a device together with its coordinate lookups.
#[derive(Clone, Debug)]
pub struct RoutingGraph {
    pub(crate) arch: Architecture,
    pub(crate) grid: DeviceGrid,
    pub(crate) plan: TrackPlan,
    pub(crate) store: NodeStore,
    pub(crate) tiles: BTreeMap<Coord, TileNodes>,
    pub(crate) chanx: ChannelNodes,
    pub(crate) chany: ChannelNodes,
}

impl RoutingGraph {
    /// The architecture the graph was built from.
    pub fn arch(&self) -> &Architecture {
        &self.arch
    }

    /// The expanded device grid.
    pub fn grid(&self) -> &DeviceGrid {
        &self.grid
    }

    /// The channel track layout.
    pub fn plan(&self) -> &TrackPlan {
        &self.plan
    }

    /// All routing nodes.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    /// Nodes of the block rooted at `root`.
    pub fn tile_nodes(&self, root: Coord) -> Option<&TileNodes> {
        self.tiles.get(&root)
    }

    /// Node of pin `pin` of the block rooted at `root`.
    pub fn pin_node(&self, root: Coord, pin: u32) -> Option<NodeId> {
        self.tiles.get(&root)?.pins.get(pin as usize).copied()
    }

    /// Channel node lookup for one channel type.
    pub fn channel(&self, chan_type: ChanType) -> &ChannelNodes {
        match chan_type {
            ChanType::ChanX => &self.chanx,
            ChanType::ChanY => &self.chany,
        }
    }

    pub(crate) fn tile_type_at(&self, root: Coord) -> Result<&TileType, RrgError> {
        let nodes = self.tiles.get(&root).ok_or_else(|| RrgError::InconsistentBlock {
            structure: "tile",
            coord: root,
            reason: "no block is rooted here".to_string(),
        })?;
        self.arch.tile_type(nodes.tile).ok_or_else(|| {
            ArchError::UnknownTileType {
                context: format!("block at {root}"),
                id: nodes.tile,
            }
            .into()
        })
    }
}

/// Allocates SOURCE/SINK nodes per pin class and IPIN/OPIN nodes per pin
/// for every placed block, in grid scan order.
pub(crate) fn allocate_tile_nodes(
    store: &mut NodeStore,
    arch: &Architecture,
    grid: &DeviceGrid,
) -> Result<BTreeMap<Coord, TileNodes>, RrgError> {
    let mut tiles = BTreeMap::new();
    for (root, id) in grid.roots() {
        let tile = arch.tile_type(id).ok_or_else(|| ArchError::UnknownTileType {
            context: format!("block at {root}"),
            id,
        })?;
        let bounds = Bounds::point(root);

        let mut classes = Vec::with_capacity(tile.classes.len());
        for (index, class) in tile.classes.iter().enumerate() {
            let (kind, cost_index) = match class.pin_type {
                PinType::Output => (NodeKind::Source, 0),
                PinType::Input => (NodeKind::Sink, 1),
            };
            let node_id = store.allocate(kind, bounds)?;
            let node = store.get_mut(node_id)?;
            node.ptc_num = index as u32;
            node.capacity = class.pins.len() as u32 * tile.capacity;
            node.cost_index = cost_index;
            classes.push(node_id);
        }

        let mut pins = Vec::with_capacity(tile.num_pins as usize);
        for pin in 0..tile.num_pins {
            let (kind, cost_index) = match tile.pin_type(pin) {
                Some(PinType::Output) => (NodeKind::Opin, 2),
                _ => (NodeKind::Ipin, 3),
            };
            let node_id = store.allocate(kind, bounds)?;
            let node = store.get_mut(node_id)?;
            node.ptc_num = pin;
            node.cost_index = cost_index;
            pins.push(node_id);
        }
        tiles.insert(root, TileNodes { tile: id, classes, pins });
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn every_block_gets_class_and_pin_nodes() {
        let arch = testutil::arch(2, 2);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let mut store = NodeStore::new();
        let tiles = allocate_tile_nodes(&mut store, &arch, &grid).unwrap();
        assert_eq!(tiles.len(), 4 + 8);
        let core = &tiles[&Coord::new(1, 1)];
        assert_eq!(core.classes.len(), 2);
        assert_eq!(core.pins.len(), 8);
        assert_eq!(store.get(core.classes[0]).unwrap().kind, NodeKind::Sink);
        assert_eq!(store.get(core.classes[1]).unwrap().kind, NodeKind::Source);
        assert_eq!(store.get(core.classes[1]).unwrap().capacity, 4);
        let opin = store.get(core.pins[5]).unwrap();
        assert_eq!(opin.kind, NodeKind::Opin);
        assert_eq!(opin.ptc_num, 5);
        assert_eq!(opin.bounds, Bounds::point(Coord::new(1, 1)));
        assert!(!tiles.contains_key(&Coord::new(0, 0)));
    }

    #[test]
    fn tall_blocks_allocate_once() {
        let arch = testutil::arch_with_tall_column(3, 4);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let mut store = NodeStore::new();
        let tiles = allocate_tile_nodes(&mut store, &arch, &grid).unwrap();
        assert!(tiles.contains_key(&Coord::new(2, 1)));
        assert!(!tiles.contains_key(&Coord::new(2, 2)));
        assert_eq!(tiles[&Coord::new(2, 1)].pins.len(), 4);
    }
}
