//! Configuration types deserialized from `fabric.toml`.
//!
//! These are the raw, name-based forms of the architecture catalogs. They are
//! turned into a [`loom_arch::Architecture`] by [`resolve_fabric`](crate::resolve_fabric).

use loom_common::Side;
use serde::{Deserialize, Serialize};

/// The top-level fabric description parsed from `fabric.toml`.
#[derive(Debug, Deserialize)]
pub struct FabricConfig {
    /// The architecture name.
    pub name: String,
    /// Whether wires twist between tracks so every tile sees the same pattern.
    #[serde(default = "default_true")]
    pub tileable: bool,
    /// Device extents and tile placement.
    pub device: DeviceConfig,
    /// Switches used by edges that are not part of a segment.
    pub routing: RoutingConfig,
    /// The switch catalog.
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    /// The segment catalog.
    #[serde(default)]
    pub segments: Vec<SegmentConfig>,
    /// Switch-block parameters.
    #[serde(default)]
    pub switch_block: SwitchBlockConfig,
    /// The tile catalog.
    #[serde(default)]
    pub tile_types: Vec<TileTypeConfig>,
    /// Routing-graph construction options.
    #[serde(default)]
    pub build: BuildOptions,
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

/// Device extents and tile placement rules.
#[derive(Debug, Deserialize)]
pub struct DeviceConfig {
    /// Core columns.
    pub nx: u32,
    /// Core rows.
    pub ny: u32,
    /// Tile type name filling the core.
    pub fill: String,
    /// Tile type name filling the perimeter ring.
    #[serde(default)]
    pub io: Option<String>,
    /// Column runs.
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    /// Single placements.
    #[serde(default)]
    pub tiles: Vec<TilePlacementConfig>,
}

/// A tile type repeated along a core column.
#[derive(Debug, Deserialize)]
pub struct ColumnConfig {
    /// The column.
    pub x: u32,
    /// Tile type name.
    pub tile: String,
    /// First row of the run.
    #[serde(default = "default_one")]
    pub start_y: u32,
    /// Row pitch; `0` uses the tile height.
    #[serde(default)]
    pub repeat: u32,
}

/// A single tile placement.
#[derive(Debug, Deserialize)]
pub struct TilePlacementConfig {
    /// Column of the tile root.
    pub x: u32,
    /// Row of the tile root.
    pub y: u32,
    /// Tile type name.
    pub tile: String,
}

/// Switches referenced by the builder itself.
#[derive(Debug, Deserialize)]
pub struct RoutingConfig {
    /// Switch name for source-to-pin and pin-to-sink edges.
    pub delayless_switch: String,
    /// Switch name for track-to-input-pin edges.
    pub wire_to_ipin_switch: String,
}

/// Circuit style of a switch as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKindConfig {
    /// `mux`
    Mux,
    /// `pass_trans`
    PassTrans,
    /// `buffer`
    Buffer,
    /// `unbuf_mux`
    UnbufMux,
}

/// A switch catalog entry.
#[derive(Debug, Deserialize)]
pub struct SwitchConfig {
    /// The switch name.
    pub name: String,
    /// Circuit style.
    #[serde(rename = "type")]
    pub kind: SwitchKindConfig,
    /// Equivalent resistance.
    #[serde(default, rename = "R")]
    pub resistance: f64,
    /// Input capacitance.
    #[serde(default, rename = "Cin")]
    pub c_in: f64,
    /// Output capacitance.
    #[serde(default, rename = "Cout")]
    pub c_out: f64,
    /// Intrinsic delay.
    #[serde(default, rename = "Tdel")]
    pub t_del: f64,
}

/// Segment directionality as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionalityConfig {
    /// `unidir`
    #[default]
    #[serde(alias = "unidirectional")]
    Unidir,
    /// `bidir`
    #[serde(alias = "bidirectional")]
    Bidir,
}

/// A segment catalog entry.
#[derive(Debug, Deserialize)]
pub struct SegmentConfig {
    /// The segment name.
    pub name: String,
    /// Tiles spanned by a full-length wire.
    pub length: u32,
    /// Tracks per direction.
    pub tracks: u32,
    /// Driver style.
    #[serde(default, rename = "type")]
    pub directionality: DirectionalityConfig,
    /// Switch name used when a track drives this segment.
    pub wire_switch: String,
    /// Switch name used when an output pin drives this segment; defaults to `wire_switch`.
    #[serde(default)]
    pub opin_switch: Option<String>,
    /// Connection-block depopulation pattern; defaults to fully populated.
    #[serde(default)]
    pub cb: Option<Vec<bool>>,
    /// Switch-block depopulation pattern; defaults to fully populated.
    #[serde(default)]
    pub sb: Option<Vec<bool>>,
    /// Lets passing wires drive the opposite side of a switch block.
    #[serde(default)]
    pub wire_opposite_side: bool,
    /// Metal resistance per tile.
    #[serde(default, rename = "Rmetal")]
    pub r_metal: f64,
    /// Metal capacitance per tile.
    #[serde(default, rename = "Cmetal")]
    pub c_metal: f64,
}

/// Switch-block pattern as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchBlockTypeConfig {
    /// `subset`
    Subset,
    /// `wilton`
    #[default]
    Wilton,
}

/// Switch-block parameters.
#[derive(Debug, Deserialize)]
pub struct SwitchBlockConfig {
    /// Pattern for ending wires.
    #[serde(default, rename = "type")]
    pub pattern: SwitchBlockTypeConfig,
    /// Connections per ending wire.
    #[serde(default = "default_fs")]
    pub fs: u32,
    /// Pattern for passing wires; defaults to `type`.
    #[serde(default)]
    pub sub_type: Option<SwitchBlockTypeConfig>,
    /// Connections per passing wire; defaults to `fs`.
    #[serde(default)]
    pub sub_fs: Option<u32>,
}

fn default_fs() -> u32 {
    3
}

impl Default for SwitchBlockConfig {
    fn default() -> Self {
        Self {
            pattern: SwitchBlockTypeConfig::default(),
            fs: default_fs(),
            sub_type: None,
            sub_fs: None,
        }
    }
}

/// Tile kind as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKindConfig {
    /// `io`
    Io,
    /// `logic`
    #[default]
    Logic,
}

/// Pin direction as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinTypeConfig {
    /// `input`
    Input,
    /// `output`
    Output,
}

/// A pin class.
#[derive(Debug, Deserialize)]
pub struct PinClassConfig {
    /// Direction of the class.
    #[serde(rename = "type")]
    pub pin_type: PinTypeConfig,
    /// Pin indices.
    pub pins: Vec<u32>,
}

/// Pins placed on one side of a tile at one height.
#[derive(Debug, Deserialize)]
pub struct PinLocationConfig {
    /// The tile side.
    pub side: SideConfig,
    /// Height offset within the tile.
    #[serde(default)]
    pub height: u32,
    /// Pin indices on that side.
    pub pins: Vec<u32>,
}

/// A tile side as written in the description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideConfig {
    /// `top`
    Top,
    /// `right`
    Right,
    /// `bottom`
    Bottom,
    /// `left`
    Left,
}

impl From<SideConfig> for Side {
    fn from(side: SideConfig) -> Side {
        match side {
            SideConfig::Top => Side::Top,
            SideConfig::Right => Side::Right,
            SideConfig::Bottom => Side::Bottom,
            SideConfig::Left => Side::Left,
        }
    }
}

/// A tile catalog entry.
#[derive(Debug, Deserialize)]
pub struct TileTypeConfig {
    /// The tile type name.
    pub name: String,
    /// Broad class.
    #[serde(default)]
    pub kind: TileKindConfig,
    /// Rows covered.
    #[serde(default = "default_one")]
    pub height: u32,
    /// Stacked block instances.
    #[serde(default = "default_one")]
    pub capacity: u32,
    /// Configuration bits per block instance.
    #[serde(default)]
    pub conf_bits: u32,
    /// Input connectivity fraction.
    #[serde(default = "default_fc")]
    pub fc_in: f64,
    /// Output connectivity fraction.
    #[serde(default = "default_fc")]
    pub fc_out: f64,
    /// Pin classes.
    #[serde(default)]
    pub classes: Vec<PinClassConfig>,
    /// Pin locations.
    #[serde(default)]
    pub pins: Vec<PinLocationConfig>,
}

fn default_fc() -> f64 {
    1.0
}

/// How multiplexer configuration memory is organized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigStyle {
    /// Encoded SRAM: `ceil(log2(fan_in))` bits per multiplexer.
    #[default]
    Sram,
    /// One-hot memory bank: one bit per multiplexer input, plus reserved
    /// bits sized by the largest multiplexer of the block.
    MemoryBank,
}

/// Options steering routing-graph construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Classify switch and connection blocks into unique modules.
    pub canonicalize: bool,
    /// Look for rotation equivalences after mirror matching fails.
    pub detect_rotation: bool,
    /// Extract block signatures on worker threads.
    pub parallel: bool,
    /// Offset combinations tried per candidate representative before giving up.
    pub rotation_search_budget: u32,
    /// Configuration memory organization.
    pub config_style: ConfigStyle,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            canonicalize: true,
            detect_rotation: true,
            parallel: false,
            rotation_search_budget: 4096,
            config_style: ConfigStyle::Sram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_defaults() {
        let opts = BuildOptions::default();
        assert!(opts.canonicalize);
        assert!(opts.detect_rotation);
        assert!(!opts.parallel);
        assert_eq!(opts.config_style, ConfigStyle::Sram);
    }

    #[test]
    fn build_options_partial_toml() {
        let opts: BuildOptions = toml::from_str("config_style = \"memory_bank\"").unwrap();
        assert_eq!(opts.config_style, ConfigStyle::MemoryBank);
        assert_eq!(opts.rotation_search_budget, 4096);
    }

    #[test]
    fn build_options_json_roundtrip() {
        let opts = BuildOptions {
            parallel: true,
            ..BuildOptions::default()
        };
        let json = serde_json::to_string(&opts).unwrap();
        let back: BuildOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, back);
    }

    #[test]
    fn switch_kind_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            kind: SwitchKindConfig,
        }
        let w: Wrapper = toml::from_str("kind = \"pass_trans\"").unwrap();
        assert_eq!(w.kind, SwitchKindConfig::PassTrans);
    }

    #[test]
    fn segment_directionality_alias() {
        let seg: SegmentConfig = toml::from_str(
            r#"
name = "L4"
length = 4
tracks = 8
type = "unidirectional"
wire_switch = "mux0"
"#,
        )
        .unwrap();
        assert_eq!(seg.directionality, DirectionalityConfig::Unidir);
        assert!(seg.cb.is_none());
    }
}
