//! Conformance test helpers for Loom routing-graph construction.
//!
//! Provides fabric description fixtures and a build helper that runs the
//! full load → build pipeline and returns structured results for assertion
//! in integration tests.

#![warn(missing_docs)]

use loom_config::{load_fabric_from_str, BuildOptions, Fabric};
use loom_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use loom_rrg::{DeviceRrg, RrgBuilder, RrgError};

/// A wire segment declared by a fixture.
#[derive(Clone, Copy, Debug)]
pub struct SegmentSpec {
    /// Segment name.
    pub name: &'static str,
    /// Length in tiles.
    pub length: u32,
    /// Increasing tracks; the same number of decreasing tracks is added.
    pub tracks: u32,
    /// Whether passing wires also reach the opposite side.
    pub wire_opposite_side: bool,
}

/// Two length-1 tracks per direction.
pub const L1: SegmentSpec = SegmentSpec {
    name: "L1",
    length: 1,
    tracks: 2,
    wire_opposite_side: false,
};

/// Two length-2 tracks per direction, wired to the opposite side.
pub const L2_OPPOSITE: SegmentSpec = SegmentSpec {
    name: "L2",
    length: 2,
    tracks: 2,
    wire_opposite_side: true,
};

/// Result of loading a fabric and building its routing graph.
pub struct BuildResult {
    /// The device, or the error that stopped construction.
    pub device: Result<DeviceRrg, RrgError>,
    /// All diagnostics emitted during the build.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Nodes the builder had allocated when it stopped; zero on success.
    pub leftover_nodes: usize,
    /// Edges among those nodes.
    pub leftover_edges: usize,
}

impl BuildResult {
    /// Codes of the emitted diagnostics, e.g. `"E101"`.
    pub fn codes(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.code.to_string()).collect()
    }

    /// Number of warning-severity diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// A `fabric.toml` for an `nx` x `ny` core of four-sided logic tiles inside
/// an I/O ring, with the given segments and a Wilton switch block.
///
/// Logic tile `clb` has input pin `i` and output pin `4 + i` on side `i`
/// (top, right, bottom, left). I/O tile `io` exposes pin 0 (input) and
/// pin 1 (output) on every side. `extra` is appended verbatim.
pub fn fabric_toml(nx: u32, ny: u32, segments: &[SegmentSpec], extra: &str) -> String {
    let mut out = format!(
        r#"
name = "conformance_{nx}x{ny}"

[device]
nx = {nx}
ny = {ny}
fill = "clb"
io = "io"

[routing]
delayless_switch = "delayless"
wire_to_ipin_switch = "ipin_cblock"

[[switches]]
name = "delayless"
type = "mux"

[[switches]]
name = "ipin_cblock"
type = "mux"
R = 1055.0

[[switches]]
name = "mux0"
type = "mux"
R = 551.0

[switch_block]
type = "wilton"
fs = 3
sub_type = "subset"
"#
    );
    for seg in segments {
        out.push_str(&format!(
            r#"
[[segments]]
name = "{}"
length = {}
tracks = {}
wire_switch = "mux0"
wire_opposite_side = {}
Rmetal = 10.0
Cmetal = 1e-15
"#,
            seg.name, seg.length, seg.tracks, seg.wire_opposite_side
        ));
    }
    out.push_str(
        r#"
[[tile_types]]
name = "io"
kind = "io"
conf_bits = 1
fc_in = 0.5
fc_out = 0.5

[[tile_types.classes]]
type = "input"
pins = [0]

[[tile_types.classes]]
type = "output"
pins = [1]

[[tile_types.pins]]
side = "top"
pins = [0, 1]

[[tile_types.pins]]
side = "right"
pins = [0, 1]

[[tile_types.pins]]
side = "bottom"
pins = [0, 1]

[[tile_types.pins]]
side = "left"
pins = [0, 1]

[[tile_types]]
name = "clb"
conf_bits = 16
fc_in = 0.5
fc_out = 0.5

[[tile_types.classes]]
type = "input"
pins = [0, 1, 2, 3]

[[tile_types.classes]]
type = "output"
pins = [4, 5, 6, 7]

[[tile_types.pins]]
side = "top"
pins = [0, 4]

[[tile_types.pins]]
side = "right"
pins = [1, 5]

[[tile_types.pins]]
side = "bottom"
pins = [2, 6]

[[tile_types.pins]]
side = "left"
pins = [3, 7]
"#,
    );
    out.push_str(extra);
    out
}

/// Loads a fabric description, panicking on configuration errors.
pub fn load(toml: &str) -> Fabric {
    load_fabric_from_str(toml).unwrap()
}

/// Loads `toml` and builds it with the options it declares.
pub fn build(toml: &str) -> BuildResult {
    let fabric = load(toml);
    build_with(&fabric, fabric.build.clone())
}

/// Builds `fabric` with explicit options.
pub fn build_with(fabric: &Fabric, options: BuildOptions) -> BuildResult {
    let sink = DiagnosticSink::new();
    let mut builder = RrgBuilder::new(&fabric.arch, options);
    let device = builder.build(&sink);
    let leftover_nodes = builder.store().len();
    let leftover_edges = builder.store().edge_count();
    BuildResult {
        device,
        has_errors: sink.has_errors(),
        diagnostics: sink.take_all(),
        leftover_nodes,
        leftover_edges,
    }
}

/// Builds a device that must succeed.
pub fn device(toml: &str) -> DeviceRrg {
    build(toml).device.unwrap()
}
