//! Tile port indexing: which pins a placed tile exposes on a side.

use crate::error::RrgError;
use crate::grid::DeviceGrid;
use loom_arch::{Architecture, PinLocation, PinType, TileType};
use loom_common::{Coord, Side};

/// Pins of one tile on one `(side, height)`, filtered by pin type.
///
/// A plain iterator over the architecture's location table; clone it to
/// iterate again.
#[derive(Clone, Debug)]
pub struct SidePins<'a> {
    tile: Option<&'a TileType>,
    locations: std::slice::Iter<'a, PinLocation>,
    side: Side,
    height: u32,
    pin_type: PinType,
}

impl<'a> SidePins<'a> {
    fn empty(side: Side, height: u32, pin_type: PinType) -> Self {
        let none: &'a [PinLocation] = &[];
        Self {
            tile: None,
            locations: none.iter(),
            side,
            height,
            pin_type,
        }
    }
}

impl Iterator for SidePins<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let tile = self.tile?;
        for loc in self.locations.by_ref() {
            if loc.side == self.side
                && loc.height == self.height
                && tile.pin_type(loc.pin) == Some(self.pin_type)
            {
                return Some(loc.pin);
            }
        }
        None
    }
}

/// Pins of the block rooted at `root` exposed on `(side, height)`.
///
/// I/O tiles only expose the side facing the core: a top-row tile only its
/// bottom pins, a right-column tile only its left pins, and so on. An I/O
/// tile away from the border is an error. Empty cells expose nothing.
pub fn side_pins<'a>(
    arch: &'a Architecture,
    grid: &DeviceGrid,
    root: Coord,
    side: Side,
    height: u32,
    pin_type: PinType,
) -> Result<SidePins<'a>, RrgError> {
    let Some((_, id)) = grid.root(root) else {
        return Ok(SidePins::empty(side, height, pin_type));
    };
    let tile = arch.tile_type(id).ok_or_else(|| loom_arch::ArchError::UnknownTileType {
        context: format!("grid cell {root}"),
        id,
    })?;
    if tile.is_io() {
        let facing = grid
            .core_facing_side(root)
            .ok_or_else(|| RrgError::UnsupportedInteriorIO {
                tile: tile.name.clone(),
                coord: root,
            })?;
        if facing != side {
            return Ok(SidePins::empty(side, height, pin_type));
        }
    }
    Ok(SidePins {
        tile: Some(tile),
        locations: tile.locations.iter(),
        side,
        height,
        pin_type,
    })
}

/// Pins exposed on `side` by whatever block covers grid cell `cell`,
/// resolving the block root and the height of `cell` within it.
pub fn cell_side_pins<'a>(
    arch: &'a Architecture,
    grid: &DeviceGrid,
    cell: Coord,
    side: Side,
    pin_type: PinType,
) -> Result<(Coord, SidePins<'a>), RrgError> {
    match grid.root(cell) {
        Some((root, _)) => {
            let pins = side_pins(arch, grid, root, side, cell.y - root.y, pin_type)?;
            Ok((root, pins))
        }
        None => Ok((cell, SidePins::empty(side, 0, pin_type))),
    }
}
