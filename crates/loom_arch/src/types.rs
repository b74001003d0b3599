//! Data types describing a routing fabric architecture.
//!
//! These mirror the sections of a fabric description: switches, wire
//! segments, the switch-block pattern, tile types, and the device layout.
//! Electrical values are carried as opaque scalars for downstream timing
//! and netlist stages.

use crate::ids::{SegmentId, SwitchId, TileTypeId};
use loom_common::{Coord, Side};
use serde::{Deserialize, Serialize};

/// The circuit style of a routing switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchKind {
    /// A buffered multiplexer.
    Mux,
    /// A single pass transistor.
    PassTransistor,
    /// A tri-state buffer.
    Buffer,
    /// A multiplexer without an output buffer.
    UnbufferedMux,
}

impl SwitchKind {
    /// Returns `true` if switches of this kind drive their output through a buffer.
    pub fn is_buffered(self) -> bool {
        matches!(self, SwitchKind::Mux | SwitchKind::Buffer)
    }
}

/// An entry of the switch catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Switch {
    /// The switch name used by segments and tiles to refer to it.
    pub name: String,
    /// The circuit style.
    pub kind: SwitchKind,
    /// Equivalent resistance.
    pub resistance: f64,
    /// Input capacitance.
    pub c_in: f64,
    /// Output capacitance.
    pub c_out: f64,
    /// Intrinsic delay.
    pub t_del: f64,
}

impl Switch {
    /// Returns `true` if this switch isolates its input from its load.
    pub fn buffered(&self) -> bool {
        self.kind.is_buffered()
    }
}

/// Whether a segment's wires are driven from one end or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Directionality {
    /// Each wire is driven by a multiplexer at its starting end.
    Unidirectional,
    /// Wires may be driven from either end through tri-state switches.
    Bidirectional,
}

/// A wire segment type in the segment catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// The segment name.
    pub name: String,
    /// Number of tiles a full-length wire spans.
    pub length: u32,
    /// Tracks of this segment per direction in every channel.
    pub tracks: u32,
    /// Driver style of the segment's wires.
    pub directionality: Directionality,
    /// Switch used when a track drives a wire of this segment.
    pub wire_switch: SwitchId,
    /// Switch used when an output pin drives a wire of this segment.
    pub opin_switch: SwitchId,
    /// Per tile along the wire, whether it connects to input pins there.
    pub cb_pattern: Vec<bool>,
    /// Per switch block along the wire (`length + 1` entries), whether the
    /// wire can switch there.
    pub sb_pattern: Vec<bool>,
    /// Lets passing wires drive starting wires on the opposite side of the
    /// same switch block.
    pub wire_opposite_side: bool,
    /// Metal resistance per tile.
    pub r_metal: f64,
    /// Metal capacitance per tile.
    pub c_metal: f64,
}

/// The connection pattern inside a switch block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwitchBlockPattern {
    /// Track `i` connects to track `i` on every other side.
    Subset,
    /// Turning connections are permuted so routes spiral through the fabric.
    Wilton,
}

/// Switch-block parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchBlock {
    /// Pattern applied to wires ending at the switch block.
    pub pattern: SwitchBlockPattern,
    /// Connections per ending wire, spread evenly over the other three sides.
    pub fs: u32,
    /// Pattern applied to wires passing through the switch block.
    pub sub_pattern: SwitchBlockPattern,
    /// Connections per passing wire.
    pub sub_fs: u32,
}

/// The broad class of a tile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// A perimeter I/O pad tile.
    Io,
    /// A logic, memory or other core tile.
    Logic,
}

/// Whether a pin feeds the tile or is driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    /// A tile input, driven from the routing fabric.
    Input,
    /// A tile output, driving the routing fabric.
    Output,
}

/// A group of logically equivalent pins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinClass {
    /// Direction of every pin in the class.
    pub pin_type: PinType,
    /// Pin indices belonging to the class.
    pub pins: Vec<u32>,
}

/// One physical location of a pin on the boundary of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinLocation {
    /// Height offset within a multi-row tile.
    pub height: u32,
    /// Side of the tile the pin faces.
    pub side: Side,
    /// Pin index.
    pub pin: u32,
}

/// A tile type in the tile catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileType {
    /// The tile type name.
    pub name: String,
    /// Broad class of the tile.
    pub kind: TileKind,
    /// Number of grid rows the tile covers.
    pub height: u32,
    /// Number of block instances stacked in one tile.
    pub capacity: u32,
    /// Total pin count.
    pub num_pins: u32,
    /// Pin classes; every pin belongs to exactly one.
    pub classes: Vec<PinClass>,
    /// Pin locations, sorted by `(height, side, pin)`.
    pub locations: Vec<PinLocation>,
    /// Fraction of a channel's tracks of each direction that drive every input pin.
    pub fc_in: f64,
    /// Fraction of the starting tracks on a side each output pin drives.
    pub fc_out: f64,
    /// Configuration bits of one block instance.
    pub conf_bits: u32,
}

impl TileType {
    /// Returns `true` for perimeter I/O tiles.
    pub fn is_io(&self) -> bool {
        self.kind == TileKind::Io
    }

    /// Returns the index of the class containing `pin`.
    pub fn class_of(&self, pin: u32) -> Option<usize> {
        self.classes.iter().position(|c| c.pins.contains(&pin))
    }

    /// Returns the direction of `pin`.
    pub fn pin_type(&self, pin: u32) -> Option<PinType> {
        self.class_of(pin).map(|c| self.classes[c].pin_type)
    }

    /// Iterates the pins located on `side` at `height`, in location order.
    pub fn pins_on(&self, side: Side, height: u32) -> impl Iterator<Item = u32> + '_ {
        self.locations
            .iter()
            .filter(move |loc| loc.side == side && loc.height == height)
            .map(|loc| loc.pin)
    }

    /// Configuration bits of the whole tile.
    pub fn total_conf_bits(&self) -> u32 {
        self.conf_bits * self.capacity
    }
}

/// A tile type repeated along a column of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPlacement {
    /// The column.
    pub x: u32,
    /// The tile type placed.
    pub tile: TileTypeId,
    /// First row of the column run.
    pub start_y: u32,
    /// Row pitch between placements; `0` uses the tile height.
    pub repeat: u32,
}

/// A single tile placed at a fixed coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePlacement {
    /// The root (bottom) coordinate of the tile.
    pub coord: Coord,
    /// The tile type placed.
    pub tile: TileTypeId,
}

/// Device extents and tile placement rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceLayout {
    /// Core columns.
    pub nx: u32,
    /// Core rows.
    pub ny: u32,
    /// Tile type filling the core.
    pub fill: TileTypeId,
    /// Tile type filling the perimeter ring, corners excluded.
    pub io: Option<TileTypeId>,
    /// Column runs, applied after the fill.
    pub columns: Vec<ColumnPlacement>,
    /// Single placements, applied last.
    pub tiles: Vec<TilePlacement>,
}

/// A complete routing fabric architecture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    /// The architecture name.
    pub name: String,
    /// The switch catalog.
    pub switches: Vec<Switch>,
    /// The segment catalog; channel tracks follow this order.
    pub segments: Vec<Segment>,
    /// Switch-block parameters.
    pub switch_block: SwitchBlock,
    /// The tile catalog.
    pub tile_types: Vec<TileType>,
    /// The device layout.
    pub layout: DeviceLayout,
    /// Switch used for source-to-pin and pin-to-sink edges.
    pub delayless_switch: SwitchId,
    /// Switch used for track-to-input-pin edges.
    pub wire_to_ipin_switch: SwitchId,
    /// Whether wires twist between tracks so every tile sees the same pattern.
    pub tileable: bool,
}

impl Architecture {
    /// Returns the switch with the given ID.
    pub fn switch(&self, id: SwitchId) -> Option<&Switch> {
        self.switches.get(id.index())
    }

    /// Returns the segment with the given ID.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.index())
    }

    /// Returns the tile type with the given ID.
    pub fn tile_type(&self, id: TileTypeId) -> Option<&TileType> {
        self.tile_types.get(id.index())
    }

    /// Iterates segment IDs in catalog order.
    pub fn segment_ids(&self) -> impl Iterator<Item = SegmentId> {
        (0..self.segments.len() as u32).map(SegmentId::from_raw)
    }

    /// Looks up a tile type by name.
    pub fn tile_type_by_name(&self, name: &str) -> Option<TileTypeId> {
        self.tile_types
            .iter()
            .position(|t| t.name == name)
            .map(|i| TileTypeId::from_raw(i as u32))
    }

    /// Tracks per direction in every channel.
    pub fn tracks_per_direction(&self) -> u32 {
        self.segments.iter().map(|s| s.tracks).sum()
    }
}
