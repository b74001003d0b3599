//! Switch-block and connection-block views of the routing graph.
//!
//! A switch block `SB(x, y)` sits at the corner shared by tiles `(x, y)`,
//! `(x+1, y)`, `(x, y+1)` and `(x+1, y+1)`. Its sides face
//! `Top = CHANY(x, y+1)`, `Right = CHANX(x+1, y)`, `Bottom = CHANY(x, y)` and
//! `Left = CHANX(x, y)`. The generalized switch block ([`Gsb`]) at `(x, y)`
//! also carries the input pins of `CBX(x, y)` on its top and bottom sides
//! and of `CBY(x, y+1)` on its right and left sides.

use crate::chan::ChanType;
use crate::conf_bits::ConfPorts;
use crate::error::RrgError;
use crate::graph::RoutingGraph;
use crate::ids::NodeId;
use crate::node::Direction;
use crate::ports::cell_side_pins;
use loom_arch::{PinType, SegmentId};
use loom_common::{Coord, Side};
use serde::{Deserialize, Serialize};

/// Whether a track enters or leaves a block on a given side.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum PortDir {
    /// The block receives the track's signal.
    In,
    /// The block drives the track.
    Out,
}

/// A channel reference: channel type plus coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ChanRef {
    /// Horizontal or vertical.
    pub chan_type: ChanType,
    /// Channel coordinate.
    pub coord: Coord,
}

/// One track on one side of a switch block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ChanEntry {
    /// The wire on this track.
    pub node: NodeId,
    /// Track id within the channel.
    pub track: u32,
    /// Segment type of the wire.
    pub segment: SegmentId,
    /// Driving direction of the wire.
    pub direction: Direction,
    /// Whether the switch block drives or receives the track.
    pub port: PortDir,
    /// `true` if the wire neither starts nor ends at this switch block.
    pub passing: bool,
    /// Offset of the adjacent channel tile within a full-length wire.
    pub phase: u32,
}

/// A tile pin reachable from one side of a block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PinEntry {
    /// The IPIN or OPIN node.
    pub node: NodeId,
    /// Root cell of the block owning the pin.
    pub tile: Coord,
    /// Pin index within the tile type.
    pub pin: u32,
    /// Side of its own tile the pin sits on.
    pub grid_side: Side,
}

/// One side of a generalized switch block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GsbSide {
    /// Channel on this side, if it exists.
    pub chan: Option<ChanRef>,
    /// Tracks of that channel, by track id.
    pub tracks: Vec<ChanEntry>,
    /// Output pins of the adjacent tiles, clockwise.
    pub opins: Vec<PinEntry>,
    /// Input pins of the adjacent connection block on this side.
    pub ipins: Vec<PinEntry>,
}

/// The generalized switch block at one coordinate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gsb {
    /// Switch-block coordinate.
    pub coord: Coord,
    /// Sides, indexed by [`Side::index`].
    pub sides: [GsbSide; 4],
    /// Configuration bits of the switch block.
    pub conf: ConfPorts,
}

impl Gsb {
    /// The given side.
    pub fn side(&self, side: Side) -> &GsbSide {
        &self.sides[side.index()]
    }

    /// Number of sides with a channel.
    pub fn num_channel_sides(&self) -> usize {
        self.sides.iter().filter(|s| s.chan.is_some()).count()
    }

    /// Tracks driven by the switch block: outgoing tracks that start here.
    pub fn driven_tracks(&self) -> impl Iterator<Item = (Side, &ChanEntry)> {
        Side::ALL.into_iter().flat_map(move |side| {
            self.sides[side.index()]
                .tracks
                .iter()
                .filter(|e| e.port == PortDir::Out && !e.passing)
                .map(move |e| (side, e))
        })
    }
}

/// One track of a connection block's channel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CbTrack {
    /// The wire on this track.
    pub node: NodeId,
    /// Track id.
    pub track: u32,
    /// Segment type of the wire.
    pub segment: SegmentId,
    /// Driving direction.
    pub direction: Direction,
    /// Offset of this channel tile within a full-length wire.
    pub phase: u32,
}

/// The connection block on one channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cb {
    /// Channel type served.
    pub chan_type: ChanType,
    /// Channel coordinate.
    pub coord: Coord,
    /// Channel tracks, by track id.
    pub tracks: Vec<CbTrack>,
    /// Input pins per side, indexed by [`Side::index`]; only the two sides in
    /// [`ChanType::pin_sides`] are populated.
    pub ipins: [Vec<PinEntry>; 4],
    /// Configuration bits of the connection block.
    pub conf: ConfPorts,
}

impl Cb {
    /// Input pins on `side`.
    pub fn ipins(&self, side: Side) -> &[PinEntry] {
        &self.ipins[side.index()]
    }

    /// All input pins, side by side.
    pub fn all_ipins(&self) -> impl Iterator<Item = &PinEntry> {
        self.ipins.iter().flatten()
    }
}

impl RoutingGraph {
    /// Assembles the generalized switch block at `coord`.
    pub fn build_sb(&self, coord: Coord) -> Result<Gsb, RrgError> {
        if coord.x > self.grid.nx() || coord.y > self.grid.ny() {
            return Err(RrgError::NoSuchBlock {
                structure: "sb",
                coord,
            });
        }
        let mut sides: [GsbSide; 4] = Default::default();
        for side in Side::ALL {
            let (chan, tracks) = self.sb_side_tracks(coord, side)?;
            let (cb_type, cb_coord) = match side {
                Side::Top | Side::Bottom => (ChanType::ChanX, coord),
                Side::Right | Side::Left => (ChanType::ChanY, Coord::new(coord.x, coord.y + 1)),
            };
            let ipins = if cb_type.exists(&self.grid, cb_coord) {
                self.cb_side_ipins(cb_type, cb_coord, side)?
            } else {
                Vec::new()
            };
            sides[side.index()] = GsbSide {
                chan,
                tracks,
                opins: self.sb_side_opins(coord, side)?,
                ipins,
            };
        }
        Ok(Gsb {
            coord,
            sides,
            conf: ConfPorts::default(),
        })
    }

    /// Returns `true` if a connection block sits on channel `(chan_type, c)`:
    /// the channel exists, has tracks, and faces at least one input pin.
    pub fn cb_exists(&self, chan_type: ChanType, c: Coord) -> bool {
        if !chan_type.exists(&self.grid, c) || self.plan.width() == 0 {
            return false;
        }
        chan_type.pin_sides().iter().any(|&side| {
            self.cb_side_ipins(chan_type, c, side)
                .map_or(false, |pins| !pins.is_empty())
        })
    }

    /// Assembles the connection block on channel `(chan_type, c)`.
    pub fn build_cb(&self, chan_type: ChanType, c: Coord) -> Result<Cb, RrgError> {
        if !self.cb_exists(chan_type, c) {
            return Err(RrgError::NoSuchBlock {
                structure: chan_type.cb_name(),
                coord: c,
            });
        }
        let nodes = self.channel(chan_type).tracks(c).ok_or(RrgError::NoSuchBlock {
            structure: chan_type.cb_name(),
            coord: c,
        })?;
        let (lo, hi) = self.channel(chan_type).extent();
        let pos = chan_type.position(c);
        let mut tracks = Vec::with_capacity(nodes.len());
        for (track, info) in self.plan.tracks().iter().enumerate() {
            let track = track as u32;
            tracks.push(CbTrack {
                node: nodes[track as usize],
                track,
                segment: info.segment,
                direction: info.direction,
                phase: self.plan.phase(track, pos, lo, hi),
            });
        }
        let mut ipins: [Vec<PinEntry>; 4] = Default::default();
        for side in chan_type.pin_sides() {
            ipins[side.index()] = self.cb_side_ipins(chan_type, c, side)?;
        }
        Ok(Cb {
            chan_type,
            coord: c,
            tracks,
            ipins,
            conf: ConfPorts::default(),
        })
    }

    /// Channel and tracks on `side` of `SB(sb)`.
    pub(crate) fn sb_side_tracks(
        &self,
        sb: Coord,
        side: Side,
    ) -> Result<(Option<ChanRef>, Vec<ChanEntry>), RrgError> {
        let (chan_type, coord) = match side {
            Side::Top => (ChanType::ChanY, Coord::new(sb.x, sb.y + 1)),
            Side::Right => (ChanType::ChanX, Coord::new(sb.x + 1, sb.y)),
            Side::Bottom => (ChanType::ChanY, sb),
            Side::Left => (ChanType::ChanX, sb),
        };
        let channel = self.channel(chan_type);
        let Some(nodes) = channel.tracks(coord) else {
            return Ok((None, Vec::new()));
        };
        let (lo, hi) = channel.extent();
        let pos = chan_type.position(coord);
        // The block sits at the low end of the channel tile on Top/Right.
        let at_low_end = matches!(side, Side::Top | Side::Right);

        let mut tracks = Vec::with_capacity(nodes.len());
        for (track, &node_id) in nodes.iter().enumerate() {
            let track = track as u32;
            let node = self.store.get(node_id)?;
            let direction = node.direction.unwrap_or(Direction::Bidirectional);
            let segment = node.segment.ok_or_else(|| RrgError::InconsistentBlock {
                structure: "sb",
                coord: sb,
                reason: format!("channel node {node_id} has no segment"),
            })?;
            let port = match (direction, at_low_end) {
                (Direction::Increasing, true) | (Direction::Decreasing, false) => PortDir::Out,
                _ => PortDir::In,
            };
            let boundary = match port {
                PortDir::Out => node.start(),
                PortDir::In => node.end(),
            };
            let passing = boundary.map_or(true, |c| chan_type.position(c) != pos);
            tracks.push(ChanEntry {
                node: node_id,
                track,
                segment,
                direction,
                port,
                passing,
                phase: self.plan.phase(track, pos, lo, hi),
            });
        }
        Ok((Some(ChanRef { chan_type, coord }), tracks))
    }

    /// Output pins reachable from `side` of `SB(sb)`, clockwise.
    pub(crate) fn sb_side_opins(&self, sb: Coord, side: Side) -> Result<Vec<PinEntry>, RrgError> {
        let (x, y) = (sb.x, sb.y);
        let cells = match side {
            Side::Top => [(Coord::new(x, y + 1), Side::Right), (Coord::new(x + 1, y + 1), Side::Left)],
            Side::Right => [(Coord::new(x + 1, y + 1), Side::Bottom), (Coord::new(x + 1, y), Side::Top)],
            Side::Bottom => [(Coord::new(x + 1, y), Side::Left), (Coord::new(x, y), Side::Right)],
            Side::Left => [(Coord::new(x, y), Side::Top), (Coord::new(x, y + 1), Side::Bottom)],
        };
        let mut pins = Vec::new();
        for (cell, grid_side) in cells {
            self.collect_pins(cell, grid_side, PinType::Output, &mut pins)?;
        }
        Ok(pins)
    }

    /// Input pins a connection block on `(chan_type, c)` feeds on `side`.
    pub(crate) fn cb_side_ipins(
        &self,
        chan_type: ChanType,
        c: Coord,
        side: Side,
    ) -> Result<Vec<PinEntry>, RrgError> {
        let (cell, grid_side) = match (chan_type, side) {
            (ChanType::ChanX, Side::Top) => (Coord::new(c.x, c.y + 1), Side::Bottom),
            (ChanType::ChanX, Side::Bottom) => (c, Side::Top),
            (ChanType::ChanY, Side::Right) => (Coord::new(c.x + 1, c.y), Side::Left),
            (ChanType::ChanY, Side::Left) => (c, Side::Right),
            _ => return Ok(Vec::new()),
        };
        let mut pins = Vec::new();
        self.collect_pins(cell, grid_side, PinType::Input, &mut pins)?;
        Ok(pins)
    }

    fn collect_pins(
        &self,
        cell: Coord,
        grid_side: Side,
        pin_type: PinType,
        out: &mut Vec<PinEntry>,
    ) -> Result<(), RrgError> {
        let (root, pins) = cell_side_pins(&self.arch, &self.grid, cell, grid_side, pin_type)?;
        for pin in pins {
            let node = self.pin_node(root, pin).ok_or_else(|| RrgError::InconsistentBlock {
                structure: "tile",
                coord: root,
                reason: format!("pin {pin} has no node"),
            })?;
            out.push(PinEntry {
                node,
                tile: root,
                pin,
                grid_side,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_device;
    use crate::testutil;
    use loom_arch::Architecture;
    use loom_config::BuildOptions;
    use loom_diagnostics::DiagnosticSink;

    fn graph(arch: &Architecture) -> RoutingGraph {
        build_device(arch, &BuildOptions::default(), &DiagnosticSink::new())
            .unwrap()
            .into_graph()
    }

    #[test]
    fn corner_sb_has_two_channel_sides() {
        let g = graph(&testutil::arch(2, 2));
        let gsb = g.build_sb(Coord::new(0, 0)).unwrap();
        assert_eq!(gsb.num_channel_sides(), 2);
        let top = gsb.side(Side::Top);
        assert_eq!(
            top.chan,
            Some(ChanRef {
                chan_type: ChanType::ChanY,
                coord: Coord::new(0, 1)
            })
        );
        assert!(gsb.side(Side::Bottom).tracks.is_empty());
        let pins: Vec<(u32, Side)> = top.opins.iter().map(|p| (p.pin, p.grid_side)).collect();
        assert_eq!(pins, vec![(1, Side::Right), (7, Side::Left)]);
    }

    #[test]
    fn ports_follow_track_direction() {
        let g = graph(&testutil::arch(2, 2));
        let half = g.plan().half() as usize;
        let gsb = g.build_sb(Coord::new(1, 1)).unwrap();
        for side in Side::ALL {
            let tracks = &gsb.side(side).tracks;
            assert_eq!(tracks.len(), 2 * half);
            let leaving = matches!(side, Side::Top | Side::Right);
            for entry in tracks {
                let increasing = entry.direction == Direction::Increasing;
                let expected = if increasing == leaving { PortDir::Out } else { PortDir::In };
                assert_eq!(entry.port, expected, "{side} track {}", entry.track);
                assert!(!entry.passing);
            }
        }
        assert_eq!(gsb.driven_tracks().count(), 4 * half);
    }

    #[test]
    fn interior_opins_clockwise() {
        let g = graph(&testutil::arch(2, 2));
        let gsb = g.build_sb(Coord::new(1, 1)).unwrap();
        let tiles: Vec<(Coord, u32)> = gsb
            .side(Side::Top)
            .opins
            .iter()
            .map(|p| (p.tile, p.pin))
            .collect();
        assert_eq!(tiles, vec![(Coord::new(1, 2), 5), (Coord::new(2, 2), 7)]);
        let left: Vec<u32> = gsb.side(Side::Left).opins.iter().map(|p| p.pin).collect();
        assert_eq!(left, vec![4, 6]);
    }

    #[test]
    fn gsb_carries_adjacent_cb_pins() {
        let g = graph(&testutil::arch(2, 2));
        let gsb = g.build_sb(Coord::new(1, 1)).unwrap();
        let top: Vec<(Coord, u32)> = gsb.side(Side::Top).ipins.iter().map(|p| (p.tile, p.pin)).collect();
        assert_eq!(top, vec![(Coord::new(1, 2), 2)]);
        let right: Vec<(Coord, u32)> = gsb.side(Side::Right).ipins.iter().map(|p| (p.tile, p.pin)).collect();
        assert_eq!(right, vec![(Coord::new(2, 2), 3)]);
    }

    #[test]
    fn cbx_feeds_tiles_above_and_below() {
        let g = graph(&testutil::arch(2, 2));
        let cb = g.build_cb(ChanType::ChanX, Coord::new(1, 1)).unwrap();
        assert_eq!(cb.tracks.len(), g.plan().width() as usize);
        let top: Vec<(Coord, u32, Side)> =
            cb.ipins(Side::Top).iter().map(|p| (p.tile, p.pin, p.grid_side)).collect();
        assert_eq!(top, vec![(Coord::new(1, 2), 2, Side::Bottom)]);
        let bottom: Vec<(Coord, u32)> = cb.ipins(Side::Bottom).iter().map(|p| (p.tile, p.pin)).collect();
        assert_eq!(bottom, vec![(Coord::new(1, 1), 0)]);
        assert!(cb.ipins(Side::Left).is_empty());
        assert_eq!(cb.all_ipins().count(), 2);
    }

    #[test]
    fn missing_blocks_rejected() {
        let g = graph(&testutil::arch(2, 2));
        assert!(matches!(
            g.build_sb(Coord::new(3, 1)),
            Err(RrgError::NoSuchBlock { structure: "sb", .. })
        ));
        assert!(!g.cb_exists(ChanType::ChanX, Coord::new(0, 1)));
        assert!(matches!(
            g.build_cb(ChanType::ChanX, Coord::new(0, 1)),
            Err(RrgError::NoSuchBlock { structure: "cbx", .. })
        ));
    }

    #[test]
    fn passing_wires_cross_to_opposite_side() {
        let g = graph(&testutil::arch_l2(3, 3));
        let mut seen = 0;
        for x in 0..=3 {
            for y in 0..=3 {
                let gsb = g.build_sb(Coord::new(x, y)).unwrap();
                for side in Side::ALL {
                    for entry in gsb.side(side).tracks.iter().filter(|e| e.passing) {
                        let other = gsb.side(side.opposite());
                        let twin = other.tracks.iter().find(|e| e.node == entry.node);
                        let twin = twin.expect("passing wire missing on the opposite side");
                        assert!(twin.passing);
                        assert_ne!(twin.port, entry.port);
                        seen += 1;
                    }
                }
            }
        }
        assert!(seen > 0);
    }
}
