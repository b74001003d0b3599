//! Routing nodes: the vertices of the routing resource graph.

use crate::ids::NodeId;
use loom_arch::{SegmentId, SwitchId};
use loom_common::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a routing node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    /// Logical source of a tile output class.
    Source,
    /// Logical sink of a tile input class.
    Sink,
    /// A tile input pin.
    Ipin,
    /// A tile output pin.
    Opin,
    /// A horizontal channel wire.
    ChanX,
    /// A vertical channel wire.
    ChanY,
    /// A wire internal to a cluster.
    IntraClusterEdge,
}

impl NodeKind {
    /// Every kind, in table order.
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Source,
        NodeKind::Sink,
        NodeKind::Ipin,
        NodeKind::Opin,
        NodeKind::ChanX,
        NodeKind::ChanY,
        NodeKind::IntraClusterEdge,
    ];

    /// Returns `true` for `ChanX` and `ChanY`.
    pub fn is_channel(self) -> bool {
        matches!(self, NodeKind::ChanX | NodeKind::ChanY)
    }

    /// Position of this kind in [`NodeKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            NodeKind::Source => 0,
            NodeKind::Sink => 1,
            NodeKind::Ipin => 2,
            NodeKind::Opin => 3,
            NodeKind::ChanX => 4,
            NodeKind::ChanY => 5,
            NodeKind::IntraClusterEdge => 6,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Source => "SOURCE",
            NodeKind::Sink => "SINK",
            NodeKind::Ipin => "IPIN",
            NodeKind::Opin => "OPIN",
            NodeKind::ChanX => "CHANX",
            NodeKind::ChanY => "CHANY",
            NodeKind::IntraClusterEdge => "INTRA_CLUSTER_EDGE",
        };
        f.write_str(name)
    }
}

/// Signal direction of a channel wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Drives towards increasing coordinates.
    Increasing,
    /// Drives towards decreasing coordinates.
    Decreasing,
    /// Drivable from either end.
    Bidirectional,
}

impl Direction {
    /// Swaps increasing and decreasing; bidirectional stays put.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Increasing => Direction::Decreasing,
            Direction::Decreasing => Direction::Increasing,
            Direction::Bidirectional => Direction::Bidirectional,
        }
    }
}

/// Inclusive grid rectangle covered by a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Bounds {
    /// Lowest column.
    pub x_low: u32,
    /// Highest column.
    pub x_high: u32,
    /// Lowest row.
    pub y_low: u32,
    /// Highest row.
    pub y_high: u32,
}

impl Bounds {
    /// Creates a rectangle from its four edges.
    pub const fn new(x_low: u32, x_high: u32, y_low: u32, y_high: u32) -> Self {
        Self { x_low, x_high, y_low, y_high }
    }

    /// A degenerate rectangle covering one grid cell.
    pub const fn point(c: Coord) -> Self {
        Self::new(c.x, c.x, c.y, c.y)
    }

    /// Returns `true` if either axis has its low edge above its high edge.
    pub fn is_inverted(&self) -> bool {
        self.x_low > self.x_high || self.y_low > self.y_high
    }

    /// The `(x_low, y_low)` corner.
    pub fn low(&self) -> Coord {
        Coord::new(self.x_low, self.y_low)
    }

    /// The `(x_high, y_high)` corner.
    pub fn high(&self) -> Coord {
        Coord::new(self.x_high, self.y_high)
    }

    /// Returns `true` if `c` lies inside the rectangle.
    pub fn contains(&self, c: Coord) -> bool {
        (self.x_low..=self.x_high).contains(&c.x) && (self.y_low..=self.y_high).contains(&c.y)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}]",
            self.x_low, self.x_high, self.y_low, self.y_high
        )
    }
}

/// A directed edge to `target` through the switch `switch`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Edge {
    /// The driven node.
    pub target: NodeId,
    /// The programmable switch realizing the connection.
    pub switch: SwitchId,
}

/// One vertex of the routing resource graph.
///
/// `edges` and `fan_in` are only changed through the store's edge builder
/// so that `fan_in` always equals the number of edges targeting the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutingNode {
    /// What the node models.
    pub kind: NodeKind,
    /// Grid rectangle covered by the node.
    pub bounds: Bounds,
    /// Track, pin, or class index at the node's coordinate.
    pub ptc_num: u32,
    /// Track id at each position the wire covers, from its low end to its
    /// high end. Empty for non-channel nodes.
    pub track_ids: Vec<u32>,
    /// Signal direction; `None` for non-channel nodes.
    pub direction: Option<Direction>,
    /// Segment type of a channel wire.
    pub segment: Option<SegmentId>,
    /// Number of nets the node may carry.
    pub capacity: u32,
    /// Number of nets currently using the node. Maintained by the router.
    pub occupancy: u32,
    /// Wire resistance, carried for timing analysis.
    pub resistance: f64,
    /// Wire capacitance, carried for timing analysis.
    pub capacitance: f64,
    /// Index into the shared indexed-cost table.
    pub cost_index: u32,
    pub(crate) fan_in: u32,
    pub(crate) edges: Vec<Edge>,
}

impl RoutingNode {
    /// Creates an unconnected node of unit capacity.
    pub fn new(kind: NodeKind, bounds: Bounds) -> Self {
        Self {
            kind,
            bounds,
            ptc_num: 0,
            track_ids: Vec::new(),
            direction: None,
            segment: None,
            capacity: 1,
            occupancy: 0,
            resistance: 0.0,
            capacitance: 0.0,
            cost_index: 0,
            fan_in: 0,
            edges: Vec::new(),
        }
    }

    /// Number of edges targeting this node.
    pub fn fan_in(&self) -> u32 {
        self.fan_in
    }

    /// Outgoing edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of outgoing edges.
    pub fn fan_out(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_kinds() {
        assert!(NodeKind::ChanX.is_channel());
        assert!(NodeKind::ChanY.is_channel());
        assert!(!NodeKind::Ipin.is_channel());
        assert!(!NodeKind::IntraClusterEdge.is_channel());
    }

    #[test]
    fn kind_indices_follow_table_order() {
        for (i, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn kind_display() {
        assert_eq!(format!("{}", NodeKind::ChanY), "CHANY");
        assert_eq!(format!("{}", NodeKind::Source), "SOURCE");
    }

    #[test]
    fn direction_reversal() {
        assert_eq!(Direction::Increasing.reversed(), Direction::Decreasing);
        assert_eq!(Direction::Decreasing.reversed(), Direction::Increasing);
        assert_eq!(Direction::Bidirectional.reversed(), Direction::Bidirectional);
    }

    #[test]
    fn bounds_inversion() {
        assert!(!Bounds::new(1, 3, 2, 2).is_inverted());
        assert!(Bounds::new(3, 1, 2, 2).is_inverted());
        assert!(Bounds::new(1, 1, 2, 0).is_inverted());
    }

    #[test]
    fn bounds_point_and_contains() {
        let b = Bounds::point(Coord::new(4, 5));
        assert_eq!(b.low(), b.high());
        assert!(b.contains(Coord::new(4, 5)));
        assert!(!b.contains(Coord::new(4, 6)));
        assert!(Bounds::new(1, 3, 0, 0).contains(Coord::new(2, 0)));
    }

    #[test]
    fn new_node_is_unconnected() {
        let node = RoutingNode::new(NodeKind::Opin, Bounds::point(Coord::new(1, 1)));
        assert_eq!(node.fan_in(), 0);
        assert!(node.edges().is_empty());
        assert_eq!(node.capacity, 1);
        assert_eq!(node.direction, None);
    }

    #[test]
    fn node_serde_roundtrip() {
        let mut node = RoutingNode::new(NodeKind::ChanX, Bounds::new(1, 2, 0, 0));
        node.track_ids = vec![0, 1];
        node.direction = Some(Direction::Increasing);
        let json = serde_json::to_string(&node).unwrap();
        let back: RoutingNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
