//! Device grid expansion: placing tile types on the `(nx+2) × (ny+2)` array.
//!
//! The core occupies `[1..=nx] × [1..=ny]`; the I/O ring sits on the four
//! border lines and the corner cells stay empty. Multi-height blocks occupy
//! a root cell (offset 0) and the cells above it (offset 1, 2, ...).

use crate::error::RrgError;
use loom_arch::{ArchError, Architecture, TileTypeId};
use loom_common::{Coord, Side};
use serde::{Deserialize, Serialize};

/// One cell of the device grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct GridCell {
    /// Tile type covering the cell, if any.
    pub tile: Option<TileTypeId>,
    /// Distance from the block's root cell (0 for the root).
    pub offset: u32,
}

/// The expanded device grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceGrid {
    nx: u32,
    ny: u32,
    cells: Vec<GridCell>,
}

impl DeviceGrid {
    /// Expands the architecture's layout into a grid.
    ///
    /// Placement order is: core fill, column overrides, I/O ring, then single
    /// tile overrides, later placements replacing earlier ones cell by cell.
    pub fn expand(arch: &Architecture) -> Result<Self, RrgError> {
        let layout = &arch.layout;
        if layout.nx == 0 || layout.ny == 0 {
            return Err(RrgError::DeviceTooSmall {
                nx: layout.nx,
                ny: layout.ny,
            });
        }
        let (nx, ny) = (layout.nx, layout.ny);
        let mut grid = DeviceGrid {
            nx,
            ny,
            cells: vec![GridCell::default(); ((nx + 2) * (ny + 2)) as usize],
        };

        let fill_height = grid.height_of(arch, layout.fill)?;
        for x in 1..=nx {
            let mut y = 1;
            while y + fill_height - 1 <= ny {
                grid.place(arch, Coord::new(x, y), layout.fill)?;
                y += fill_height;
            }
        }

        for column in &layout.columns {
            if column.x == 0 || column.x > nx {
                return Err(ArchError::InvalidLayout(format!(
                    "column x = {} lies outside the core 1..={nx}",
                    column.x
                ))
                .into());
            }
            let height = grid.height_of(arch, column.tile)?;
            let pitch = if column.repeat == 0 { height } else { column.repeat };
            let mut y = column.start_y.max(1);
            while y + height - 1 <= ny {
                grid.place(arch, Coord::new(column.x, y), column.tile)?;
                y += pitch;
            }
        }

        if let Some(io) = layout.io {
            for x in 1..=nx {
                grid.place(arch, Coord::new(x, 0), io)?;
                grid.place(arch, Coord::new(x, ny + 1), io)?;
            }
            for y in 1..=ny {
                grid.place(arch, Coord::new(0, y), io)?;
                grid.place(arch, Coord::new(nx + 1, y), io)?;
            }
        }

        for placement in &layout.tiles {
            grid.place(arch, placement.coord, placement.tile)?;
        }
        Ok(grid)
    }

    /// Core columns.
    pub fn nx(&self) -> u32 {
        self.nx
    }

    /// Core rows.
    pub fn ny(&self) -> u32 {
        self.ny
    }

    /// Returns the cell at `c`, or `None` outside the grid.
    pub fn cell(&self, c: Coord) -> Option<&GridCell> {
        self.index(c).map(|i| &self.cells[i])
    }

    /// Returns the root cell and tile type of the block covering `c`.
    pub fn root(&self, c: Coord) -> Option<(Coord, TileTypeId)> {
        let cell = self.cell(c)?;
        let tile = cell.tile?;
        Some((Coord::new(c.x, c.y - cell.offset), tile))
    }

    /// Returns `true` for cells on one of the four border lines.
    pub fn is_perimeter(&self, c: Coord) -> bool {
        c.x == 0 || c.y == 0 || c.x == self.nx + 1 || c.y == self.ny + 1
    }

    /// Side of a border cell that faces the core: the top row faces
    /// `Bottom`, the right column `Left`, the bottom row `Top` and the left
    /// column `Right`. `None` for core cells and corners.
    pub fn core_facing_side(&self, c: Coord) -> Option<Side> {
        let on_x = c.x == 0 || c.x == self.nx + 1;
        let on_y = c.y == 0 || c.y == self.ny + 1;
        match (on_x, on_y) {
            (true, true) | (false, false) => None,
            (false, true) if c.y == 0 => Some(Side::Top),
            (false, true) => Some(Side::Bottom),
            (true, false) if c.x == 0 => Some(Side::Right),
            (true, false) => Some(Side::Left),
        }
    }

    /// Root cells of every placed block, column by column (x outer, y inner).
    pub fn roots(&self) -> impl Iterator<Item = (Coord, TileTypeId)> + '_ {
        (0..self.nx + 2).flat_map(move |x| {
            (0..self.ny + 2).filter_map(move |y| {
                let c = Coord::new(x, y);
                let cell = self.cell(c)?;
                match cell.tile {
                    Some(tile) if cell.offset == 0 => Some((c, tile)),
                    _ => None,
                }
            })
        })
    }

    fn index(&self, c: Coord) -> Option<usize> {
        if c.x < self.nx + 2 && c.y < self.ny + 2 {
            Some((c.x * (self.ny + 2) + c.y) as usize)
        } else {
            None
        }
    }

    fn height_of(&self, arch: &Architecture, id: TileTypeId) -> Result<u32, RrgError> {
        arch.tile_type(id)
            .map(|t| t.height)
            .ok_or_else(|| unknown_tile(id))
    }

    fn place(&mut self, arch: &Architecture, root: Coord, id: TileTypeId) -> Result<(), RrgError> {
        let tile = arch.tile_type(id).ok_or_else(|| unknown_tile(id))?;
        if self.index(root).is_none() {
            return Err(layout_error(format!("'{}' placed at {root}, outside the grid", tile.name)));
        }
        let perimeter = self.is_perimeter(root);
        if tile.is_io() && !perimeter {
            return Err(RrgError::UnsupportedInteriorIO {
                tile: tile.name.clone(),
                coord: root,
            });
        }
        if perimeter {
            if !tile.is_io() {
                return Err(layout_error(format!(
                    "non-I/O tile '{}' placed on the perimeter at {root}",
                    tile.name
                )));
            }
            if self.core_facing_side(root).is_none() {
                return Err(layout_error(format!("'{}' placed on corner {root}", tile.name)));
            }
            if tile.height != 1 {
                return Err(layout_error(format!(
                    "I/O tile '{}' must have height 1",
                    tile.name
                )));
            }
        } else if root.y + tile.height - 1 > self.ny {
            return Err(layout_error(format!(
                "'{}' at {root} extends above the core",
                tile.name
            )));
        }

        for h in 0..tile.height {
            let c = Coord::new(root.x, root.y + h);
            if let Some((existing_root, existing)) = self.root(c) {
                let tall = arch.tile_type(existing).map_or(false, |t| t.height > 1);
                if tall && (existing_root != root || existing != id) {
                    return Err(RrgError::OverlappingBlocks {
                        tile: tile.name.clone(),
                        root,
                        existing_root,
                    });
                }
            }
        }
        for h in 0..tile.height {
            if let Some(i) = self.index(Coord::new(root.x, root.y + h)) {
                self.cells[i] = GridCell {
                    tile: Some(id),
                    offset: h,
                };
            }
        }
        Ok(())
    }
}

fn unknown_tile(id: TileTypeId) -> RrgError {
    ArchError::UnknownTileType {
        context: "device layout".to_string(),
        id,
    }
    .into()
}

fn layout_error(reason: String) -> RrgError {
    ArchError::InvalidLayout(reason).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;
    use loom_arch::TilePlacement;

    #[test]
    fn ring_and_core() {
        let arch = testutil::arch(2, 2);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let clb = arch.tile_type_by_name("clb");
        let io = arch.tile_type_by_name("io");
        assert_eq!(grid.cell(Coord::new(1, 1)).unwrap().tile, clb);
        assert_eq!(grid.cell(Coord::new(2, 2)).unwrap().tile, clb);
        assert_eq!(grid.cell(Coord::new(0, 1)).unwrap().tile, io);
        assert_eq!(grid.cell(Coord::new(1, 3)).unwrap().tile, io);
        assert_eq!(grid.cell(Coord::new(0, 0)).unwrap().tile, None);
        assert_eq!(grid.cell(Coord::new(3, 3)).unwrap().tile, None);
        assert!(grid.cell(Coord::new(4, 0)).is_none());
    }

    #[test]
    fn zero_width_device() {
        let arch = testutil::arch(0, 2);
        assert!(matches!(
            DeviceGrid::expand(&arch),
            Err(RrgError::DeviceTooSmall { nx: 0, ny: 2 })
        ));
    }

    #[test]
    fn zero_height_device() {
        let arch = testutil::arch(2, 0);
        assert!(matches!(
            DeviceGrid::expand(&arch),
            Err(RrgError::DeviceTooSmall { nx: 2, ny: 0 })
        ));
    }

    #[test]
    fn interior_io_rejected() {
        let mut arch = testutil::arch(3, 3);
        let io = arch.tile_type_by_name("io").unwrap();
        arch.layout.tiles.push(TilePlacement {
            coord: Coord::new(2, 2),
            tile: io,
        });
        let err = DeviceGrid::expand(&arch).unwrap_err();
        match err {
            RrgError::UnsupportedInteriorIO { tile, coord } => {
                assert_eq!(tile, "io");
                assert_eq!(coord, Coord::new(2, 2));
            }
            other => panic!("expected UnsupportedInteriorIO, got {other:?}"),
        }
    }

    #[test]
    fn logic_on_perimeter_rejected() {
        let mut arch = testutil::arch(2, 2);
        let clb = arch.tile_type_by_name("clb").unwrap();
        arch.layout.tiles.push(TilePlacement {
            coord: Coord::new(1, 0),
            tile: clb,
        });
        assert!(matches!(
            DeviceGrid::expand(&arch),
            Err(RrgError::MalformedArchitecture(ArchError::InvalidLayout(_)))
        ));
    }

    #[test]
    fn facing_sides() {
        let arch = testutil::arch(2, 2);
        let grid = DeviceGrid::expand(&arch).unwrap();
        assert_eq!(grid.core_facing_side(Coord::new(1, 3)), Some(Side::Bottom));
        assert_eq!(grid.core_facing_side(Coord::new(3, 1)), Some(Side::Left));
        assert_eq!(grid.core_facing_side(Coord::new(2, 0)), Some(Side::Top));
        assert_eq!(grid.core_facing_side(Coord::new(0, 2)), Some(Side::Right));
        assert_eq!(grid.core_facing_side(Coord::new(0, 0)), None);
        assert_eq!(grid.core_facing_side(Coord::new(1, 1)), None);
    }

    #[test]
    fn tall_column_sets_offsets() {
        let arch = testutil::arch_with_tall_column(3, 4);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let tall = arch.tile_type_by_name("tall");
        assert_eq!(grid.cell(Coord::new(2, 1)).unwrap().tile, tall);
        assert_eq!(grid.cell(Coord::new(2, 2)).unwrap().offset, 1);
        assert_eq!(grid.root(Coord::new(2, 2)), Some((Coord::new(2, 1), tall.unwrap())));
        assert_eq!(grid.cell(Coord::new(2, 3)).unwrap().offset, 0);
        let roots: Vec<Coord> = grid
            .roots()
            .filter(|(c, _)| c.x == 2)
            .map(|(c, _)| c)
            .collect();
        assert_eq!(
            roots,
            vec![Coord::new(2, 0), Coord::new(2, 1), Coord::new(2, 3), Coord::new(2, 5)]
        );
    }

    #[test]
    fn overlap_with_tall_block_rejected() {
        let mut arch = testutil::arch_with_tall_column(3, 4);
        let clb = arch.tile_type_by_name("clb").unwrap();
        arch.layout.tiles.push(TilePlacement {
            coord: Coord::new(2, 2),
            tile: clb,
        });
        match DeviceGrid::expand(&arch) {
            Err(RrgError::OverlappingBlocks { tile, root, existing_root }) => {
                assert_eq!(tile, "clb");
                assert_eq!(root, Coord::new(2, 2));
                assert_eq!(existing_root, Coord::new(2, 1));
            }
            other => panic!("expected OverlappingBlocks, got {other:?}"),
        }
    }

    #[test]
    fn roots_scan_column_major() {
        let arch = testutil::arch(1, 1);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let roots: Vec<Coord> = grid.roots().map(|(c, _)| c).collect();
        assert_eq!(
            roots,
            vec![
                Coord::new(0, 1),
                Coord::new(1, 0),
                Coord::new(1, 1),
                Coord::new(1, 2),
                Coord::new(2, 1),
            ]
        );
    }
}
