//! Channel track plan and wire allocation.
//!
//! A channel of width `W` holds `W/2` increasing tracks followed by `W/2`
//! decreasing tracks, each half laid out segment by segment in catalog
//! order. Within a segment group of length `L`, track `k` sits on lane
//! `k mod L`.

use crate::error::RrgError;
use crate::grid::DeviceGrid;
use crate::ids::NodeId;
use crate::node::{Bounds, Direction, NodeKind};
use crate::store::NodeStore;
use loom_arch::{Architecture, SegmentId};
use loom_common::{Coord, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Horizontal or vertical routing channel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum ChanType {
    /// Horizontal channel above a tile row.
    ChanX,
    /// Vertical channel right of a tile column.
    ChanY,
}

impl ChanType {
    /// Both channel types.
    pub const ALL: [ChanType; 2] = [ChanType::ChanX, ChanType::ChanY];

    /// Node kind of the wires in this channel.
    pub fn node_kind(self) -> NodeKind {
        match self {
            ChanType::ChanX => NodeKind::ChanX,
            ChanType::ChanY => NodeKind::ChanY,
        }
    }

    /// Short name of the channel structure.
    pub fn name(self) -> &'static str {
        match self {
            ChanType::ChanX => "chanx",
            ChanType::ChanY => "chany",
        }
    }

    /// Short name of the connection block sitting on this channel.
    pub fn cb_name(self) -> &'static str {
        match self {
            ChanType::ChanX => "cbx",
            ChanType::ChanY => "cby",
        }
    }

    /// Coordinate along the channel's axis.
    pub fn position(self, c: Coord) -> u32 {
        match self {
            ChanType::ChanX => c.x,
            ChanType::ChanY => c.y,
        }
    }

    /// Index of the channel line `c` belongs to.
    pub fn line(self, c: Coord) -> u32 {
        match self {
            ChanType::ChanX => c.y,
            ChanType::ChanY => c.x,
        }
    }

    /// Inverse of [`line`](Self::line) and [`position`](Self::position).
    pub fn coord(self, line: u32, position: u32) -> Coord {
        match self {
            ChanType::ChanX => Coord::new(position, line),
            ChanType::ChanY => Coord::new(line, position),
        }
    }

    /// Sides of a connection block on this channel that face tile pins.
    pub fn pin_sides(self) -> [Side; 2] {
        match self {
            ChanType::ChanX => [Side::Top, Side::Bottom],
            ChanType::ChanY => [Side::Right, Side::Left],
        }
    }

    /// Returns `true` if the channel exists at `c` on `grid`.
    pub fn exists(self, grid: &DeviceGrid, c: Coord) -> bool {
        let (pos_max, line_max) = match self {
            ChanType::ChanX => (grid.nx(), grid.ny()),
            ChanType::ChanY => (grid.ny(), grid.nx()),
        };
        let pos = self.position(c);
        (1..=pos_max).contains(&pos) && self.line(c) <= line_max
    }
}

impl fmt::Display for ChanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node_kind(), f)
    }
}

/// Static attributes of one track id.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Segment type routed on the track.
    pub segment: SegmentId,
    /// Driving direction.
    pub direction: Direction,
    /// Lane within the segment group.
    pub lane: u32,
    /// Segment length in tiles.
    pub length: u32,
}

/// Track layout shared by every channel of the device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackPlan {
    tracks: Vec<TrackInfo>,
    tileable: bool,
}

/// One wire to allocate, spanning `low..=high` along the channel axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct WireSpan {
    pub direction: Direction,
    pub segment: SegmentId,
    pub low: u32,
    pub high: u32,
    pub track_ids: Vec<u32>,
    pub ptc: u32,
}

impl TrackPlan {
    /// Lays out the tracks of `arch`'s segment catalog.
    pub fn new(arch: &Architecture) -> Self {
        let mut tracks = Vec::new();
        for direction in [Direction::Increasing, Direction::Decreasing] {
            for (segment, seg) in arch.segment_ids().zip(&arch.segments) {
                for k in 0..seg.tracks {
                    tracks.push(TrackInfo {
                        segment,
                        direction,
                        lane: k % seg.length,
                        length: seg.length,
                    });
                }
            }
        }
        Self {
            tracks,
            tileable: arch.tileable,
        }
    }

    /// Channel width.
    pub fn width(&self) -> u32 {
        self.tracks.len() as u32
    }

    /// Number of tracks per direction.
    pub fn half(&self) -> u32 {
        self.width() / 2
    }

    /// All tracks, by track id.
    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    /// Attributes of track `t`.
    pub fn track(&self, t: u32) -> Option<&TrackInfo> {
        self.tracks.get(t as usize)
    }

    /// Offset of the wire on track `t` at `pos` from the start of a
    /// full-length wire, for a channel spanning `lo..=hi`.
    pub fn phase(&self, t: u32, pos: u32, lo: u32, hi: u32) -> u32 {
        let Some(info) = self.track(t) else {
            return 0;
        };
        if self.tileable {
            return info.lane;
        }
        let travelled = match info.direction {
            Direction::Decreasing => hi.saturating_sub(pos),
            _ => pos.saturating_sub(lo),
        };
        (travelled + info.lane) % info.length
    }

    /// Wires covering a channel line spanning `lo..=hi`.
    pub(crate) fn wires(&self, lo: u32, hi: u32) -> Vec<WireSpan> {
        let mut wires = Vec::new();
        let mut t = 0usize;
        while t < self.tracks.len() {
            let info = self.tracks[t];
            let base = t as u32;
            let len = info.length;
            if self.tileable {
                self.twisted_group(base, info, lo, hi, &mut wires);
            } else {
                for lane in 0..len {
                    self.straight_track(base + lane, info, lane, lo, hi, &mut wires);
                }
            }
            t += len as usize;
        }
        wires
    }

    fn twisted_group(&self, base: u32, info: TrackInfo, lo: u32, hi: u32, out: &mut Vec<WireSpan>) {
        let len = info.length;
        match info.direction {
            Direction::Decreasing => {
                for p in (lo..=hi).rev() {
                    let lanes = if p == hi { len } else { 1 };
                    for first in 0..lanes {
                        let span = (len - first).min(p - lo + 1);
                        let low = p + 1 - span;
                        let track_ids = (low..=p).map(|pos| base + first + (p - pos)).collect();
                        out.push(WireSpan {
                            direction: info.direction,
                            segment: info.segment,
                            low,
                            high: p,
                            track_ids,
                            ptc: base + first,
                        });
                    }
                }
            }
            _ => {
                for p in lo..=hi {
                    let lanes = if p == lo { len } else { 1 };
                    for first in 0..lanes {
                        let span = (len - first).min(hi - p + 1);
                        let track_ids = (0..span).map(|i| base + first + i).collect();
                        out.push(WireSpan {
                            direction: info.direction,
                            segment: info.segment,
                            low: p,
                            high: p + span - 1,
                            track_ids,
                            ptc: base + first,
                        });
                    }
                }
            }
        }
    }

    fn straight_track(&self, t: u32, info: TrackInfo, lane: u32, lo: u32, hi: u32, out: &mut Vec<WireSpan>) {
        let len = info.length;
        let mut travelled = 0;
        let extent = hi - lo + 1;
        while travelled < extent {
            let phase = (travelled + lane) % len;
            let span = (len - phase).min(extent - travelled);
            let (low, high) = match info.direction {
                Direction::Decreasing => (hi + 1 - travelled - span, hi - travelled),
                _ => (lo + travelled, lo + travelled + span - 1),
            };
            out.push(WireSpan {
                direction: info.direction,
                segment: info.segment,
                low,
                high,
                track_ids: vec![t; span as usize],
                ptc: t,
            });
            travelled += span;
        }
    }
}

/// Node lookup for every track of every channel of one type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelNodes {
    chan_type: ChanType,
    lo: u32,
    hi: u32,
    width: u32,
    lines: Vec<Vec<NodeId>>,
}

impl ChannelNodes {
    /// Allocates the wires of every channel of `chan_type`.
    pub fn allocate(
        store: &mut NodeStore,
        arch: &Architecture,
        grid: &DeviceGrid,
        plan: &TrackPlan,
        chan_type: ChanType,
    ) -> Result<Self, RrgError> {
        let (hi, lines) = match chan_type {
            ChanType::ChanX => (grid.nx(), grid.ny()),
            ChanType::ChanY => (grid.ny(), grid.nx()),
        };
        let lo = 1;
        let width = plan.width();
        let wires = plan.wires(lo, hi);
        let num_segments = arch.segments.len() as u32;
        let kind = chan_type.node_kind();

        let mut nodes = Vec::with_capacity(lines as usize + 1);
        for line in 0..=lines {
            let mut slots: Vec<Option<NodeId>> = vec![None; ((hi - lo + 1) * width) as usize];
            for wire in &wires {
                let low = chan_type.coord(line, wire.low);
                let high = chan_type.coord(line, wire.high);
                let id = store.allocate(kind, Bounds::new(low.x, high.x, low.y, high.y))?;
                let length = (wire.high - wire.low + 1) as f64;
                let seg = arch.segment(wire.segment);
                let node = store.get_mut(id)?;
                node.ptc_num = wire.ptc;
                node.track_ids = wire.track_ids.clone();
                node.direction = Some(wire.direction);
                node.segment = Some(wire.segment);
                node.resistance = seg.map_or(0.0, |s| s.r_metal * length);
                node.capacitance = seg.map_or(0.0, |s| s.c_metal * length);
                node.cost_index = match chan_type {
                    ChanType::ChanX => 4 + wire.segment.as_raw(),
                    ChanType::ChanY => 4 + num_segments + wire.segment.as_raw(),
                };
                for (i, &track) in wire.track_ids.iter().enumerate() {
                    let pos = wire.low + i as u32;
                    slots[((pos - lo) * width + track) as usize] = Some(id);
                }
            }
            let filled: Option<Vec<NodeId>> = slots.into_iter().collect();
            let filled = filled.ok_or_else(|| RrgError::InconsistentBlock {
                structure: chan_type.name(),
                coord: chan_type.coord(line, lo),
                reason: "a track position is covered by no wire".to_string(),
            })?;
            nodes.push(filled);
        }
        Ok(Self {
            chan_type,
            lo,
            hi,
            width,
            lines: nodes,
        })
    }

    /// Which channel type this index covers.
    pub fn chan_type(&self) -> ChanType {
        self.chan_type
    }

    /// Lowest and highest channel position.
    pub fn extent(&self) -> (u32, u32) {
        (self.lo, self.hi)
    }

    /// Node on each track at `c`, indexed by track id.
    pub fn tracks(&self, c: Coord) -> Option<&[NodeId]> {
        let pos = self.chan_type.position(c);
        if pos < self.lo || pos > self.hi {
            return None;
        }
        let line = self.lines.get(self.chan_type.line(c) as usize)?;
        let start = ((pos - self.lo) * self.width) as usize;
        line.get(start..start + self.width as usize)
    }

    /// Node on track `track` at `c`.
    pub fn node(&self, c: Coord, track: u32) -> Option<NodeId> {
        self.tracks(c)?.get(track as usize).copied()
    }
}
