//! Structural signatures of switch and connection blocks.
//!
//! A signature captures everything that determines a block's netlist: per
//! side, the track list with each driven track's drivers expressed through
//! the block's own side lists, and the pin lists. Two blocks with equal
//! signatures can share one module. A [`Rotation`] maps a signature onto
//! the signature of a block turned by quarter turns, with cyclic index
//! offsets per side.

use crate::chan::ChanType;
use crate::edges::FanInIndex;
use crate::error::RrgError;
use crate::gsb::{Cb, Gsb, PortDir};
use crate::ids::NodeId;
use crate::node::Direction;
use crate::store::NodeStore;
use loom_arch::{SegmentId, SwitchId};
use loom_common::{Coord, Side};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of element drives a track.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum DriverKind {
    /// An incoming track.
    Chan,
    /// A tile output pin.
    Opin,
}

/// A driver expressed relative to the block: side, list, and position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct DriverRef {
    /// Side holding the driver.
    pub side: Side,
    /// Track list or output-pin list.
    pub kind: DriverKind,
    /// Position in that list.
    pub index: u32,
    /// Switch of the connection.
    pub switch: SwitchId,
}

/// Per-side cyclic index offsets of a rotation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SideOffsets {
    /// Offset applied to input-pin positions.
    pub ipin: u32,
    /// Offset applied to output-pin positions.
    pub opin: u32,
    /// Offset applied to track positions.
    pub chan: u32,
}

/// A clockwise rotation by quarter turns with per-side index offsets.
///
/// Element `i` of side `s` of the representative lands at position
/// `(i + offsets[d]) mod len` of side `d = s.rotate(quarter_turns)` of the
/// instance; offsets are indexed by the destination side. Connection blocks
/// use the same channel offset on every side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Clockwise quarter turns.
    pub quarter_turns: u8,
    /// Offsets per destination side.
    pub offsets: [SideOffsets; 4],
}

/// Outcome of a rotation search.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RotationSearch {
    /// A rotation reproducing the instance exactly.
    Found(Rotation),
    /// No rotation matches.
    NotFound,
    /// The candidate budget ran out before the search completed.
    Exhausted,
}

/// A block signature that can be bucketed and rotated.
pub trait Signature: Serialize + PartialEq + Send + Sync {
    /// A summary shared by every rotation of a signature.
    type Shape: Serialize;

    /// Returns the rotation-invariant summary.
    fn shape(&self) -> Self::Shape;

    /// Looks for a rotation turning `rep` into `inst`, trying at most
    /// `budget` offset combinations per quarter-turn count.
    fn search_rotation(rep: &Self, inst: &Self, budget: u32) -> RotationSearch;
}

/// One track of a switch-block side.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SbTrackSig {
    /// Direction relative to the block.
    pub port: PortDir,
    /// Segment type.
    pub segment: SegmentId,
    /// Whether the wire passes through.
    pub passing: bool,
    /// Sorted drivers; empty unless the block drives the track.
    pub drivers: Vec<DriverRef>,
}

/// One side of a switch-block signature.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SbSideSig {
    /// Whether a channel exists on this side.
    pub present: bool,
    /// Tracks by track id.
    pub tracks: Vec<SbTrackSig>,
    /// Grid side of each output pin, clockwise.
    pub opins: Vec<Side>,
}

/// Structural signature of a switch block.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SbSignature {
    /// Sides by [`Side::index`].
    pub sides: [SbSideSig; 4],
}

/// Extracts the signature of `gsb`. Input pins do not participate.
pub fn sb_signature(gsb: &Gsb, store: &NodeStore, fan_in: &FanInIndex) -> Result<SbSignature, RrgError> {
    let mut local: HashMap<NodeId, (Side, DriverKind, u32)> = HashMap::new();
    for side in Side::ALL {
        let gs = gsb.side(side);
        for (i, entry) in gs.tracks.iter().enumerate() {
            if entry.port == PortDir::In {
                local.entry(entry.node).or_insert((side, DriverKind::Chan, i as u32));
            }
        }
        for (q, pin) in gs.opins.iter().enumerate() {
            local.entry(pin.node).or_insert((side, DriverKind::Opin, q as u32));
        }
    }

    let mut sig = SbSignature::default();
    for side in Side::ALL {
        let gs = gsb.side(side);
        let mut tracks = Vec::with_capacity(gs.tracks.len());
        for entry in &gs.tracks {
            let mut drivers = Vec::new();
            if entry.port == PortDir::Out && !entry.passing {
                store.get(entry.node)?;
                for &(src, switch) in fan_in.get(entry.node.index()).map_or(&[][..], |v| v.as_slice()) {
                    let &(side, kind, index) = local.get(&src).ok_or_else(|| {
                        RrgError::InconsistentBlock {
                            structure: "sb",
                            coord: gsb.coord,
                            reason: format!("track {} is driven by node {src} from outside the block", entry.track),
                        }
                    })?;
                    drivers.push(DriverRef { side, kind, index, switch });
                }
                drivers.sort();
            }
            tracks.push(SbTrackSig {
                port: entry.port,
                segment: entry.segment,
                passing: entry.passing,
                drivers,
            });
        }
        sig.sides[side.index()] = SbSideSig {
            present: gs.chan.is_some(),
            tracks,
            opins: gs.opins.iter().map(|p| p.grid_side).collect(),
        };
    }
    Ok(sig)
}

impl SbSignature {
    /// Applies `rot` to this signature.
    pub fn transformed(&self, rot: &Rotation) -> SbSignature {
        let r = rot.quarter_turns;
        let mut out = SbSignature::default();
        for s in Side::ALL {
            let src = &self.sides[s.index()];
            let d = s.rotate(r);
            let off = rot.offsets[d.index()];

            let mut tracks = src.tracks.clone();
            let w = tracks.len();
            for (i, track) in src.tracks.iter().enumerate() {
                let mut drivers: Vec<DriverRef> =
                    track.drivers.iter().map(|drv| self.move_driver(drv, rot)).collect();
                drivers.sort();
                tracks[(i + off.chan as usize) % w] = SbTrackSig {
                    drivers,
                    ..track.clone()
                };
            }

            let mut opins = src.opins.clone();
            let m = opins.len();
            for (q, grid_side) in src.opins.iter().enumerate() {
                opins[(q + off.opin as usize) % m] = grid_side.rotate(r);
            }
            out.sides[d.index()] = SbSideSig {
                present: src.present,
                tracks,
                opins,
            };
        }
        out
    }

    fn move_driver(&self, drv: &DriverRef, rot: &Rotation) -> DriverRef {
        let side = drv.side.rotate(rot.quarter_turns);
        let off = rot.offsets[side.index()];
        let src = &self.sides[drv.side.index()];
        let (len, shift) = match drv.kind {
            DriverKind::Chan => (src.tracks.len(), off.chan),
            DriverKind::Opin => (src.opins.len(), off.opin),
        };
        DriverRef {
            side,
            index: ((drv.index + shift) as usize % len.max(1)) as u32,
            ..*drv
        }
    }
}

type SbTrackKey = (PortDir, SegmentId, bool, Vec<(Side, DriverKind, SwitchId)>);

fn sb_track_key(track: &SbTrackSig, turns: u8) -> SbTrackKey {
    let mut drivers: Vec<_> = track
        .drivers
        .iter()
        .map(|d| (d.side.rotate(turns), d.kind, d.switch))
        .collect();
    drivers.sort();
    (track.port, track.segment, track.passing, drivers)
}

/// Offsets `o` with `a[i] == b[(i + o) mod len]` for every `i`.
fn cyclic_candidates<T: PartialEq>(a: &[T], b: &[T]) -> Vec<u32> {
    let len = a.len();
    if len == 0 {
        return vec![0];
    }
    (0..len)
        .filter(|&o| (0..len).all(|i| a[i] == b[(i + o) % len]))
        .map(|o| o as u32)
        .collect()
}

/// Walks every combination of the candidate lists, stopping at the first
/// accepted one or after `budget` attempts.
fn enumerate(
    lists: &[Vec<u32>],
    budget: u32,
    mut accept: impl FnMut(&[u32]) -> bool,
) -> Option<Option<Vec<u32>>> {
    if lists.iter().any(|l| l.is_empty()) {
        return Some(None);
    }
    let mut cursor = vec![0usize; lists.len()];
    let mut attempts = 0u32;
    loop {
        if attempts >= budget {
            return None;
        }
        attempts += 1;
        let picked: Vec<u32> = cursor.iter().zip(lists).map(|(&c, l)| l[c]).collect();
        if accept(&picked) {
            return Some(Some(picked));
        }
        let mut digit = 0;
        loop {
            if digit == cursor.len() {
                return Some(None);
            }
            cursor[digit] += 1;
            if cursor[digit] < lists[digit].len() {
                break;
            }
            cursor[digit] = 0;
            digit += 1;
        }
    }
}

impl Signature for SbSignature {
    type Shape = Vec<(bool, usize, usize, usize)>;

    fn shape(&self) -> Self::Shape {
        let mut shape: Vec<_> = self
            .sides
            .iter()
            .map(|s| {
                let drivers = s.tracks.iter().map(|t| t.drivers.len()).sum();
                (s.present, s.tracks.len(), s.opins.len(), drivers)
            })
            .collect();
        shape.sort();
        shape
    }

    fn search_rotation(rep: &Self, inst: &Self, budget: u32) -> RotationSearch {
        let mut exhausted = false;
        'turns: for turns in 0..4u8 {
            let mut lists = Vec::with_capacity(8);
            for s in Side::ALL {
                let rs = &rep.sides[s.index()];
                let is = &inst.sides[s.rotate(turns).index()];
                if rs.present != is.present
                    || rs.tracks.len() != is.tracks.len()
                    || rs.opins.len() != is.opins.len()
                {
                    continue 'turns;
                }
                let rk: Vec<_> = rs.tracks.iter().map(|t| sb_track_key(t, turns)).collect();
                let ik: Vec<_> = is.tracks.iter().map(|t| sb_track_key(t, 0)).collect();
                let ro: Vec<Side> = rs.opins.iter().map(|g| g.rotate(turns)).collect();
                lists.push(cyclic_candidates(&rk, &ik));
                lists.push(cyclic_candidates(&ro, &is.opins));
            }
            // lists[2k] and lists[2k+1] belong to representative side k.
            let build = |picked: &[u32]| {
                let mut rot = Rotation {
                    quarter_turns: turns,
                    ..Rotation::default()
                };
                for s in Side::ALL {
                    let d = s.rotate(turns).index();
                    rot.offsets[d].chan = picked[2 * s.index()];
                    rot.offsets[d].opin = picked[2 * s.index() + 1];
                }
                rot
            };
            match enumerate(&lists, budget, |picked| rep.transformed(&build(picked)) == *inst) {
                Some(Some(picked)) => return RotationSearch::Found(build(&picked)),
                Some(None) => {}
                None => exhausted = true,
            }
        }
        if exhausted {
            RotationSearch::Exhausted
        } else {
            RotationSearch::NotFound
        }
    }
}

/// One track of a connection block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CbTrackSig {
    /// Driving direction.
    pub direction: Direction,
    /// Segment type.
    pub segment: SegmentId,
}

/// One input pin of a connection block.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CbPinSig {
    /// Side of its own tile the pin sits on.
    pub grid_side: Side,
    /// Sorted `(track index, switch)` drivers from this block's channel.
    pub drivers: Vec<(u32, SwitchId)>,
}

/// Structural signature of a connection block.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct CbSignature {
    /// Tracks by track id.
    pub tracks: Vec<CbTrackSig>,
    /// Input pins per side, by [`Side::index`].
    pub sides: [Vec<CbPinSig>; 4],
}

/// Extracts the signature of `cb`, keeping only drivers on its own channel.
pub fn cb_signature(cb: &Cb, fan_in: &FanInIndex) -> CbSignature {
    let local: HashMap<NodeId, u32> = cb
        .tracks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.node, i as u32))
        .collect();
    let mut sig = CbSignature {
        tracks: cb
            .tracks
            .iter()
            .map(|t| CbTrackSig {
                direction: t.direction,
                segment: t.segment,
            })
            .collect(),
        sides: Default::default(),
    };
    for side in Side::ALL {
        sig.sides[side.index()] = cb
            .ipins(side)
            .iter()
            .map(|pin| {
                let mut drivers: Vec<(u32, SwitchId)> = fan_in
                    .get(pin.node.index())
                    .into_iter()
                    .flatten()
                    .filter_map(|&(src, sw)| local.get(&src).map(|&i| (i, sw)))
                    .collect();
                drivers.sort();
                CbPinSig {
                    grid_side: pin.grid_side,
                    drivers,
                }
            })
            .collect();
    }
    sig
}

impl CbSignature {
    /// Applies `rot` to this signature. A half turn reverses every track.
    pub fn transformed(&self, rot: &Rotation) -> CbSignature {
        let r = rot.quarter_turns;
        let w = self.tracks.len();
        let shift = rot.offsets[0].chan as usize;
        let mut out = CbSignature {
            tracks: self.tracks.clone(),
            sides: Default::default(),
        };
        for (i, track) in self.tracks.iter().enumerate() {
            out.tracks[(i + shift) % w] = CbTrackSig {
                direction: if r == 2 {
                    track.direction.reversed()
                } else {
                    track.direction
                },
                segment: track.segment,
            };
        }
        for s in Side::ALL {
            let src = &self.sides[s.index()];
            let d = s.rotate(r);
            let off = rot.offsets[d.index()].ipin as usize;
            let mut pins = src.clone();
            let len = pins.len();
            for (j, pin) in src.iter().enumerate() {
                let mut drivers: Vec<(u32, SwitchId)> = pin
                    .drivers
                    .iter()
                    .map(|&(t, sw)| (((t as usize + shift) % w.max(1)) as u32, sw))
                    .collect();
                drivers.sort();
                pins[(j + off) % len] = CbPinSig {
                    grid_side: pin.grid_side.rotate(r),
                    drivers,
                };
            }
            out.sides[d.index()] = pins;
        }
        out
    }
}

impl Signature for CbSignature {
    type Shape = (usize, Vec<usize>);

    fn shape(&self) -> Self::Shape {
        let mut pins: Vec<usize> = self.sides.iter().map(Vec::len).collect();
        pins.sort();
        (self.tracks.len(), pins)
    }

    fn search_rotation(rep: &Self, inst: &Self, budget: u32) -> RotationSearch {
        if rep.tracks.len() != inst.tracks.len() {
            return RotationSearch::NotFound;
        }
        let mut exhausted = false;
        'turns: for turns in [0u8, 2] {
            let flip = |t: &CbTrackSig| CbTrackSig {
                direction: if turns == 2 { t.direction.reversed() } else { t.direction },
                segment: t.segment,
            };
            let rt: Vec<CbTrackSig> = rep.tracks.iter().map(flip).collect();
            let mut lists = vec![cyclic_candidates(&rt, &inst.tracks)];
            for s in Side::ALL {
                let rs = &rep.sides[s.index()];
                let is = &inst.sides[s.rotate(turns).index()];
                if rs.len() != is.len() {
                    continue 'turns;
                }
                let rk: Vec<(Side, usize)> =
                    rs.iter().map(|p| (p.grid_side.rotate(turns), p.drivers.len())).collect();
                let ik: Vec<(Side, usize)> = is.iter().map(|p| (p.grid_side, p.drivers.len())).collect();
                lists.push(cyclic_candidates(&rk, &ik));
            }
            let build = |picked: &[u32]| {
                let mut rot = Rotation {
                    quarter_turns: turns,
                    ..Rotation::default()
                };
                for s in Side::ALL {
                    let d = s.rotate(turns).index();
                    rot.offsets[d].chan = picked[0];
                    rot.offsets[d].ipin = picked[1 + s.index()];
                }
                rot
            };
            match enumerate(&lists, budget, |picked| rep.transformed(&build(picked)) == *inst) {
                Some(Some(picked)) => return RotationSearch::Found(build(&picked)),
                Some(None) => {}
                None => exhausted = true,
            }
        }
        if exhausted {
            RotationSearch::Exhausted
        } else {
            RotationSearch::NotFound
        }
    }
}

/// Structural signature of one routing channel.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ChanSignature {
    /// Direction and segment of every track, by track id.
    pub tracks: Vec<(Direction, SegmentId)>,
}

/// Extracts the signature of the channel `(chan_type, c)`.
pub fn chan_signature(
    store: &NodeStore,
    nodes: &[NodeId],
    chan_type: ChanType,
    c: Coord,
) -> Result<ChanSignature, RrgError> {
    let mut tracks = Vec::with_capacity(nodes.len());
    for &id in nodes {
        let node = store.get(id)?;
        match (node.direction, node.segment) {
            (Some(direction), Some(segment)) => tracks.push((direction, segment)),
            _ => {
                return Err(RrgError::InconsistentBlock {
                    structure: chan_type.name(),
                    coord: c,
                    reason: format!("node {id} is not a routed wire"),
                })
            }
        }
    }
    Ok(ChanSignature { tracks })
}

impl Signature for ChanSignature {
    type Shape = usize;

    fn shape(&self) -> usize {
        self.tracks.len()
    }

    fn search_rotation(_rep: &Self, _inst: &Self, _budget: u32) -> RotationSearch {
        RotationSearch::NotFound
    }
}
