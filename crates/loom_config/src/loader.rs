//! Fabric description loading.

use crate::error::ConfigError;
use crate::resolve::{resolve_fabric, Fabric};
use crate::types::FabricConfig;
use std::path::Path;

/// File name of the fabric description inside a project directory.
pub const FABRIC_FILE: &str = "fabric.toml";

/// Loads and resolves `<dir>/fabric.toml`.
pub fn load_fabric(dir: &Path) -> Result<Fabric, ConfigError> {
    let content = std::fs::read_to_string(dir.join(FABRIC_FILE))?;
    load_fabric_from_str(&content)
}

/// Parses and resolves a fabric description from a string.
pub fn load_fabric_from_str(content: &str) -> Result<Fabric, ConfigError> {
    let config: FabricConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    resolve_fabric(&config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigStyle;
    use loom_arch::{ArchError, PinType, SwitchBlockPattern, SwitchKind, TileKind};
    use loom_common::Side;

    const FABRIC: &str = r#"
name = "k4_n4_tileable"

[device]
nx = 2
ny = 2
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
Tdel = 7.2e-11

[[switches]]
name = "mux0"
type = "mux"
R = 551.0
Cin = 7.7e-16

[[segments]]
name = "L1"
length = 1
tracks = 2
wire_switch = "mux0"

[[segments]]
name = "L2"
length = 2
tracks = 2
wire_switch = "mux0"
opin_switch = "ipin_cblock"
sb = [true, false, true]
wire_opposite_side = true

[switch_block]
type = "wilton"
fs = 3
sub_type = "subset"

[[tile_types]]
name = "io"
kind = "io"
capacity = 8
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
side = "bottom"
pins = [0, 1]

[[tile_types]]
name = "clb"
conf_bits = 64

[[tile_types.classes]]
type = "input"
pins = [0, 1, 2, 3]

[[tile_types.classes]]
type = "output"
pins = [4]

[[tile_types.pins]]
side = "right"
pins = [4, 1]

[[tile_types.pins]]
side = "left"
pins = [0]

[build]
parallel = true
"#;

    #[test]
    fn parse_full_fabric() {
        let fabric = load_fabric_from_str(FABRIC).unwrap();
        let arch = &fabric.arch;
        assert_eq!(arch.name, "k4_n4_tileable");
        assert!(arch.tileable);
        assert_eq!(arch.switches.len(), 3);
        assert_eq!(arch.switches[1].kind, SwitchKind::Mux);
        assert_eq!(arch.switches[1].resistance, 1055.0);
        assert_eq!(arch.segments.len(), 2);
        assert_eq!(arch.tracks_per_direction(), 4);
        assert_eq!(arch.layout.nx, 2);
        assert_eq!(arch.layout.io, arch.tile_type_by_name("io"));
        assert!(fabric.build.parallel);
        assert_eq!(fabric.build.config_style, ConfigStyle::Sram);
    }

    #[test]
    fn segment_defaults() {
        let fabric = load_fabric_from_str(FABRIC).unwrap();
        let l1 = &fabric.arch.segments[0];
        assert_eq!(l1.cb_pattern, vec![true]);
        assert_eq!(l1.sb_pattern, vec![true, true]);
        assert_eq!(l1.opin_switch, l1.wire_switch);
        let l2 = &fabric.arch.segments[1];
        assert_eq!(l2.sb_pattern, vec![true, false, true]);
        assert!(l2.wire_opposite_side);
        assert_ne!(l2.opin_switch, l2.wire_switch);
    }

    #[test]
    fn switch_block_sub_defaults() {
        let fabric = load_fabric_from_str(FABRIC).unwrap();
        let sb = fabric.arch.switch_block;
        assert_eq!(sb.pattern, SwitchBlockPattern::Wilton);
        assert_eq!(sb.sub_pattern, SwitchBlockPattern::Subset);
        assert_eq!(sb.sub_fs, 3);
    }

    #[test]
    fn tile_pins_resolved_and_sorted() {
        let fabric = load_fabric_from_str(FABRIC).unwrap();
        let arch = &fabric.arch;
        let clb = arch.tile_type(arch.tile_type_by_name("clb").unwrap()).unwrap();
        assert_eq!(clb.kind, TileKind::Logic);
        assert_eq!(clb.num_pins, 5);
        assert_eq!(clb.pin_type(4), Some(PinType::Output));
        let right: Vec<u32> = clb.pins_on(Side::Right, 0).collect();
        assert_eq!(right, vec![1, 4]);
        let io = arch.tile_type(arch.tile_type_by_name("io").unwrap()).unwrap();
        assert!(io.is_io());
        assert_eq!(io.total_conf_bits(), 8);
    }

    #[test]
    fn unknown_switch_reference() {
        let content = FABRIC.replace("wire_switch = \"mux0\"\n\n[[segments]]", "wire_switch = \"mux9\"\n\n[[segments]]");
        let err = load_fabric_from_str(&content).unwrap_err();
        match err {
            ConfigError::UnknownReference { kind, name, context } => {
                assert_eq!(kind, "switch");
                assert_eq!(name, "mux9");
                assert_eq!(context, "segment 'L1'");
            }
            other => panic!("expected UnknownReference, got {other:?}"),
        }
    }

    #[test]
    fn unknown_fill_tile() {
        let content = FABRIC.replace("fill = \"clb\"", "fill = \"dsp\"");
        let err = load_fabric_from_str(&content).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownReference { kind: "tile type", .. }));
    }

    #[test]
    fn duplicate_switch_name() {
        let content = FABRIC.replace("name = \"mux0\"", "name = \"delayless\"");
        let err = load_fabric_from_str(&content).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn architecture_validation_runs() {
        let content = FABRIC.replace("fs = 3", "fs = 4");
        let err = load_fabric_from_str(&content).unwrap_err();
        assert!(matches!(err, ConfigError::Arch(ArchError::InvalidSwitchBlock(_))));
    }

    #[test]
    fn empty_name_errors() {
        let content = FABRIC.replace("name = \"k4_n4_tileable\"", "name = \"\"");
        let err = load_fabric_from_str(&content).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn invalid_toml_errors() {
        let err = load_fabric_from_str("this is not valid toml {{{}}}").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FABRIC_FILE), FABRIC).unwrap();
        let fabric = load_fabric(dir.path()).unwrap();
        assert_eq!(fabric.arch.tile_types.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_fabric(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
