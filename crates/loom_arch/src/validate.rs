//! Cross-reference and constraint checks on an [`Architecture`].

use crate::error::ArchError;
use crate::ids::{SwitchId, TileTypeId};
use crate::types::{Architecture, Directionality, Segment, TileType};
use std::collections::HashSet;

impl Architecture {
    /// Checks that every reference resolves and every catalog entry satisfies
    /// the constraints of tileable unidirectional routing.
    ///
    /// Layout coordinates are checked later, when the grid is expanded, since
    /// their validity depends on the placement order.
    pub fn validate(&self) -> Result<(), ArchError> {
        if self.switches.is_empty() {
            return Err(ArchError::Empty("switches"));
        }
        if self.segments.is_empty() {
            return Err(ArchError::Empty("segments"));
        }
        if self.tile_types.is_empty() {
            return Err(ArchError::Empty("tile types"));
        }
        self.check_switch(self.delayless_switch, "delayless switch")?;
        self.check_switch(self.wire_to_ipin_switch, "wire-to-ipin switch")?;

        for segment in &self.segments {
            self.validate_segment(segment)?;
        }

        let sb = &self.switch_block;
        if sb.fs == 0 || sb.fs % 3 != 0 {
            return Err(ArchError::InvalidSwitchBlock(format!(
                "fs must be a positive multiple of 3, got {}",
                sb.fs
            )));
        }
        if sb.sub_fs % 3 != 0 {
            return Err(ArchError::InvalidSwitchBlock(format!(
                "sub_fs must be a multiple of 3, got {}",
                sb.sub_fs
            )));
        }

        let mut names = HashSet::new();
        for tile in &self.tile_types {
            if !names.insert(tile.name.as_str()) {
                return Err(invalid_tile(tile, "duplicate tile type name"));
            }
            validate_tile(tile)?;
        }

        let layout = &self.layout;
        self.check_tile(layout.fill, "layout fill")?;
        if let Some(io) = layout.io {
            self.check_tile(io, "layout io ring")?;
        }
        for column in &layout.columns {
            self.check_tile(column.tile, &format!("column at x = {}", column.x))?;
        }
        for placement in &layout.tiles {
            self.check_tile(placement.tile, &format!("tile at {}", placement.coord))?;
        }
        Ok(())
    }

    fn check_switch(&self, id: SwitchId, context: &str) -> Result<(), ArchError> {
        match self.switch(id) {
            Some(_) => Ok(()),
            None => Err(ArchError::UnknownSwitch {
                context: context.to_string(),
                id,
            }),
        }
    }

    fn check_tile(&self, id: TileTypeId, context: &str) -> Result<(), ArchError> {
        match self.tile_type(id) {
            Some(_) => Ok(()),
            None => Err(ArchError::UnknownTileType {
                context: context.to_string(),
                id,
            }),
        }
    }

    fn validate_segment(&self, segment: &Segment) -> Result<(), ArchError> {
        let invalid = |reason: String| ArchError::InvalidSegment {
            name: segment.name.clone(),
            reason,
        };
        let context = format!("segment '{}'", segment.name);
        self.check_switch(segment.wire_switch, &context)?;
        self.check_switch(segment.opin_switch, &context)?;

        if segment.directionality == Directionality::Bidirectional {
            return Err(ArchError::Unsupported(format!(
                "segment '{}' is bidirectional; only unidirectional wires are built",
                segment.name
            )));
        }
        if segment.length == 0 {
            return Err(invalid("length must be at least 1".into()));
        }
        if segment.tracks == 0 {
            return Err(invalid("must declare at least one track".into()));
        }
        if segment.tracks % segment.length != 0 {
            return Err(invalid(format!(
                "{} tracks is not a multiple of length {}",
                segment.tracks, segment.length
            )));
        }
        if segment.cb_pattern.len() != segment.length as usize {
            return Err(invalid(format!(
                "cb pattern has {} entries, expected {}",
                segment.cb_pattern.len(),
                segment.length
            )));
        }
        if segment.sb_pattern.len() != segment.length as usize + 1 {
            return Err(invalid(format!(
                "sb pattern has {} entries, expected {}",
                segment.sb_pattern.len(),
                segment.length + 1
            )));
        }
        Ok(())
    }
}

fn invalid_tile(tile: &TileType, reason: impl Into<String>) -> ArchError {
    ArchError::InvalidTileType {
        name: tile.name.clone(),
        reason: reason.into(),
    }
}

fn validate_tile(tile: &TileType) -> Result<(), ArchError> {
    if tile.height == 0 {
        return Err(invalid_tile(tile, "height must be at least 1"));
    }
    if tile.capacity == 0 {
        return Err(invalid_tile(tile, "capacity must be at least 1"));
    }
    if !(0.0..=1.0).contains(&tile.fc_in) || !(0.0..=1.0).contains(&tile.fc_out) {
        return Err(invalid_tile(tile, "fc values must lie in [0, 1]"));
    }

    let mut seen = vec![false; tile.num_pins as usize];
    for class in &tile.classes {
        for &pin in &class.pins {
            let slot = seen
                .get_mut(pin as usize)
                .ok_or_else(|| invalid_tile(tile, format!("class pin {pin} out of range")))?;
            if *slot {
                return Err(invalid_tile(tile, format!("pin {pin} is in two classes")));
            }
            *slot = true;
        }
    }
    if let Some(pin) = seen.iter().position(|s| !s) {
        return Err(invalid_tile(tile, format!("pin {pin} belongs to no class")));
    }

    let mut locations = HashSet::new();
    for loc in &tile.locations {
        if loc.pin >= tile.num_pins {
            return Err(invalid_tile(tile, format!("location pin {} out of range", loc.pin)));
        }
        if loc.height >= tile.height {
            return Err(invalid_tile(
                tile,
                format!("pin {} placed at height {} of {}", loc.pin, loc.height, tile.height),
            ));
        }
        if !locations.insert(*loc) {
            return Err(invalid_tile(
                tile,
                format!("pin {} listed twice on {} side", loc.pin, loc.side),
            ));
        }
    }
    if tile.locations.windows(2).any(|w| w[0] > w[1]) {
        return Err(invalid_tile(tile, "pin locations are not sorted"));
    }
    Ok(())
}
