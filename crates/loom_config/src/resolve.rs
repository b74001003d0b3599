//! Name resolution: turning a [`FabricConfig`] into an [`Architecture`].

use crate::error::ConfigError;
use crate::types::*;
use loom_arch::*;
use loom_common::Coord;
use std::collections::HashMap;

/// A fully resolved fabric description.
#[derive(Debug, Clone)]
pub struct Fabric {
    /// The validated architecture.
    pub arch: Architecture,
    /// Options steering routing-graph construction.
    pub build: BuildOptions,
}

/// Resolves every name reference in `config` and validates the result.
///
/// Switch and tile type names must be unique. Segment patterns default to
/// fully populated, `opin_switch` defaults to the segment's `wire_switch`,
/// and the pass-through switch-block settings default to the main ones.
pub fn resolve_fabric(config: &FabricConfig) -> Result<Fabric, ConfigError> {
    if config.name.is_empty() {
        return Err(ConfigError::MissingField("name".to_string()));
    }

    let switch_ids = index_names(config.switches.iter().map(|s| s.name.as_str()), "switch")?;
    let tile_ids = index_names(config.tile_types.iter().map(|t| t.name.as_str()), "tile type")?;

    let switch = |name: &str, context: &str| -> Result<SwitchId, ConfigError> {
        switch_ids
            .get(name)
            .map(|&i| SwitchId::from_raw(i))
            .ok_or_else(|| ConfigError::UnknownReference {
                kind: "switch",
                name: name.to_string(),
                context: context.to_string(),
            })
    };
    let tile = |name: &str, context: &str| -> Result<TileTypeId, ConfigError> {
        tile_ids
            .get(name)
            .map(|&i| TileTypeId::from_raw(i))
            .ok_or_else(|| ConfigError::UnknownReference {
                kind: "tile type",
                name: name.to_string(),
                context: context.to_string(),
            })
    };

    let switches = config.switches.iter().map(resolve_switch).collect();

    let mut segments = Vec::with_capacity(config.segments.len());
    for seg in &config.segments {
        let context = format!("segment '{}'", seg.name);
        let wire_switch = switch(&seg.wire_switch, &context)?;
        let opin_switch = match &seg.opin_switch {
            Some(name) => switch(name, &context)?,
            None => wire_switch,
        };
        segments.push(Segment {
            name: seg.name.clone(),
            length: seg.length,
            tracks: seg.tracks,
            directionality: match seg.directionality {
                DirectionalityConfig::Unidir => Directionality::Unidirectional,
                DirectionalityConfig::Bidir => Directionality::Bidirectional,
            },
            wire_switch,
            opin_switch,
            cb_pattern: seg
                .cb
                .clone()
                .unwrap_or_else(|| vec![true; seg.length as usize]),
            sb_pattern: seg
                .sb
                .clone()
                .unwrap_or_else(|| vec![true; seg.length as usize + 1]),
            wire_opposite_side: seg.wire_opposite_side,
            r_metal: seg.r_metal,
            c_metal: seg.c_metal,
        });
    }

    let sb = &config.switch_block;
    let switch_block = SwitchBlock {
        pattern: resolve_pattern(sb.pattern),
        fs: sb.fs,
        sub_pattern: resolve_pattern(sb.sub_type.unwrap_or(sb.pattern)),
        sub_fs: sb.sub_fs.unwrap_or(sb.fs),
    };

    let tile_types = config.tile_types.iter().map(resolve_tile).collect();

    let device = &config.device;
    let mut columns = Vec::with_capacity(device.columns.len());
    for column in &device.columns {
        let context = format!("column at x = {}", column.x);
        columns.push(ColumnPlacement {
            x: column.x,
            tile: tile(&column.tile, &context)?,
            start_y: column.start_y,
            repeat: column.repeat,
        });
    }
    let mut tiles = Vec::with_capacity(device.tiles.len());
    for placement in &device.tiles {
        let coord = Coord::new(placement.x, placement.y);
        tiles.push(TilePlacement {
            coord,
            tile: tile(&placement.tile, &format!("tile at {coord}"))?,
        });
    }
    let layout = DeviceLayout {
        nx: device.nx,
        ny: device.ny,
        fill: tile(&device.fill, "device fill")?,
        io: match &device.io {
            Some(name) => Some(tile(name, "device io ring")?),
            None => None,
        },
        columns,
        tiles,
    };

    let arch = Architecture {
        name: config.name.clone(),
        switches,
        segments,
        switch_block,
        tile_types,
        layout,
        delayless_switch: switch(&config.routing.delayless_switch, "routing")?,
        wire_to_ipin_switch: switch(&config.routing.wire_to_ipin_switch, "routing")?,
        tileable: config.tileable,
    };
    arch.validate()?;

    Ok(Fabric {
        arch,
        build: config.build.clone(),
    })
}

fn index_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<HashMap<&'a str, u32>, ConfigError> {
    let mut ids = HashMap::new();
    for (i, name) in names.enumerate() {
        if name.is_empty() {
            return Err(ConfigError::MissingField(format!("{kind} name")));
        }
        if ids.insert(name, i as u32).is_some() {
            return Err(ConfigError::ValidationError(format!(
                "duplicate {kind} '{name}'"
            )));
        }
    }
    Ok(ids)
}

fn resolve_switch(config: &SwitchConfig) -> Switch {
    Switch {
        name: config.name.clone(),
        kind: match config.kind {
            SwitchKindConfig::Mux => SwitchKind::Mux,
            SwitchKindConfig::PassTrans => SwitchKind::PassTransistor,
            SwitchKindConfig::Buffer => SwitchKind::Buffer,
            SwitchKindConfig::UnbufMux => SwitchKind::UnbufferedMux,
        },
        resistance: config.resistance,
        c_in: config.c_in,
        c_out: config.c_out,
        t_del: config.t_del,
    }
}

fn resolve_pattern(pattern: SwitchBlockTypeConfig) -> SwitchBlockPattern {
    match pattern {
        SwitchBlockTypeConfig::Subset => SwitchBlockPattern::Subset,
        SwitchBlockTypeConfig::Wilton => SwitchBlockPattern::Wilton,
    }
}

fn resolve_tile(config: &TileTypeConfig) -> TileType {
    let classes: Vec<PinClass> = config
        .classes
        .iter()
        .map(|c| PinClass {
            pin_type: match c.pin_type {
                PinTypeConfig::Input => PinType::Input,
                PinTypeConfig::Output => PinType::Output,
            },
            pins: c.pins.clone(),
        })
        .collect();
    let num_pins = classes
        .iter()
        .flat_map(|c| c.pins.iter())
        .map(|&p| p + 1)
        .max()
        .unwrap_or(0);

    let mut locations: Vec<PinLocation> = config
        .pins
        .iter()
        .flat_map(|loc| {
            loc.pins.iter().map(move |&pin| PinLocation {
                height: loc.height,
                side: loc.side.into(),
                pin,
            })
        })
        .collect();
    locations.sort();

    TileType {
        name: config.name.clone(),
        kind: match config.kind {
            TileKindConfig::Io => TileKind::Io,
            TileKindConfig::Logic => TileKind::Logic,
        },
        height: config.height,
        capacity: config.capacity,
        num_pins,
        classes,
        locations,
        fc_in: config.fc_in,
        fc_out: config.fc_out,
        conf_bits: config.conf_bits,
    }
}
