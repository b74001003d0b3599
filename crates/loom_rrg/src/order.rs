//! Bitstream traversal order.
//!
//! Configuration bits are numbered by visiting blocks in exactly this
//! sequence. Downstream bitstream and netlist writers index bits by it, so
//! any change here renumbers every bit of every device.

use crate::chan::ChanType;
use crate::grid::DeviceGrid;
use loom_common::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A configurable block of the device.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum BitstreamBlock {
    /// The tile block rooted at a grid cell.
    Tile(Coord),
    /// A switch block.
    Sb(Coord),
    /// A connection block on a channel.
    Cb(ChanType, Coord),
}

impl BitstreamBlock {
    /// Instance name, e.g. `grid_1__2_`, `sb_0__1_` or `cbx_1__0_`.
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BitstreamBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (prefix, c) = match self {
            BitstreamBlock::Tile(c) => ("grid", c),
            BitstreamBlock::Sb(c) => ("sb", c),
            BitstreamBlock::Cb(ct, c) => (ct.cb_name(), c),
        };
        write!(f, "{prefix}_{}__{}_", c.x, c.y)
    }
}

/// Root cells of every placed block in bitstream order: core tiles column
/// by column (x outer, y inner), then the top, right, bottom, and left I/O
/// borders. Cells covered by the upper part of a taller block are skipped.
pub fn device_tiles_in_bitstream_order(grid: &DeviceGrid) -> impl Iterator<Item = Coord> + '_ {
    let (nx, ny) = (grid.nx(), grid.ny());
    let core = (1..=nx).flat_map(move |x| (1..=ny).map(move |y| Coord::new(x, y)));
    let top = (1..=nx).map(move |x| Coord::new(x, ny + 1));
    let right = (1..=ny).map(move |y| Coord::new(nx + 1, y));
    let bottom = (1..=nx).map(move |x| Coord::new(x, 0));
    let left = (1..=ny).map(move |y| Coord::new(0, y));
    core.chain(top)
        .chain(right)
        .chain(bottom)
        .chain(left)
        .filter(move |&c| {
            grid.cell(c)
                .map_or(false, |cell| cell.tile.is_some() && cell.offset == 0)
        })
}

/// Every configurable block in bitstream order: tiles, then switch blocks
/// (x outer, y inner), then connection blocks on horizontal channels, then
/// on vertical channels. `cb_exists` filters out channels without a CB.
pub fn device_blocks_in_bitstream_order<'a>(
    grid: &'a DeviceGrid,
    cb_exists: impl Fn(ChanType, Coord) -> bool + 'a,
) -> impl Iterator<Item = BitstreamBlock> + 'a {
    let (nx, ny) = (grid.nx(), grid.ny());
    let tiles = device_tiles_in_bitstream_order(grid).map(BitstreamBlock::Tile);
    let sbs = (0..=nx).flat_map(move |x| (0..=ny).map(move |y| BitstreamBlock::Sb(Coord::new(x, y))));
    let cbs = ChanType::ALL.into_iter().flat_map(move |ct| {
        (0..=nx)
            .flat_map(move |x| (0..=ny).map(move |y| Coord::new(x, y)))
            .filter(move |&c| ct.exists(grid, c))
            .map(move |c| (ct, c))
    });
    tiles
        .chain(sbs)
        .chain(cbs.filter(move |&(ct, c)| cb_exists(ct, c)).map(|(ct, c)| BitstreamBlock::Cb(ct, c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn block_names() {
        assert_eq!(BitstreamBlock::Tile(Coord::new(1, 2)).name(), "grid_1__2_");
        assert_eq!(BitstreamBlock::Sb(Coord::new(0, 1)).name(), "sb_0__1_");
        assert_eq!(BitstreamBlock::Cb(ChanType::ChanY, Coord::new(2, 1)).name(), "cby_2__1_");
    }

    #[test]
    fn core_then_borders() {
        let arch = testutil::arch(2, 2);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let order: Vec<Coord> = device_tiles_in_bitstream_order(&grid).collect();
        let expected = [
            (1, 1), (1, 2), (2, 1), (2, 2),
            (1, 3), (2, 3),
            (3, 1), (3, 2),
            (1, 0), (2, 0),
            (0, 1), (0, 2),
        ];
        let expected: Vec<Coord> = expected.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn tall_blocks_visited_once() {
        let arch = testutil::arch_with_tall_column(3, 4);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let column: Vec<Coord> = device_tiles_in_bitstream_order(&grid)
            .filter(|c| c.x == 2 && (1..=4).contains(&c.y))
            .collect();
        assert_eq!(column, vec![Coord::new(2, 1), Coord::new(2, 3)]);
    }

    #[test]
    fn blocks_follow_tiles() {
        let arch = testutil::arch(1, 1);
        let grid = DeviceGrid::expand(&arch).unwrap();
        let blocks: Vec<BitstreamBlock> = device_blocks_in_bitstream_order(&grid, |_, _| true).collect();
        assert_eq!(blocks.len(), 5 + 4 + 2 + 2);
        assert_eq!(blocks[0], BitstreamBlock::Tile(Coord::new(1, 1)));
        assert_eq!(blocks[5], BitstreamBlock::Sb(Coord::new(0, 0)));
        assert_eq!(blocks[9], BitstreamBlock::Cb(ChanType::ChanX, Coord::new(1, 0)));
        assert_eq!(blocks[11], BitstreamBlock::Cb(ChanType::ChanY, Coord::new(0, 1)));
    }
}
