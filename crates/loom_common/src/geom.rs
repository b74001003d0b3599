//! Grid coordinates and tile sides.
//!
//! The device grid uses VPR conventions: `x` grows to the right, `y` grows
//! upwards, and the perimeter I/O ring occupies column `0`, column `nx + 1`,
//! row `0` and row `ny + 1`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the device grid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Coord {
    /// Column index, left to right.
    pub x: u32,
    /// Row index, bottom to top.
    pub y: u32,
}

impl Coord {
    /// Creates a coordinate.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate shifted by `(dx, dy)`, or `None` if it would
    /// leave the non-negative quadrant.
    pub fn offset(self, dx: i64, dy: i64) -> Option<Coord> {
        let x = u32::try_from(i64::from(self.x) + dx).ok()?;
        let y = u32::try_from(i64::from(self.y) + dy).ok()?;
        Some(Coord { x, y })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four sides of a tile, switch block or connection block.
///
/// Sides are declared in clockwise order starting from the top, so that a
/// quarter turn clockwise is `index + 1 (mod 4)`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Side {
    /// The side facing increasing `y`.
    Top,
    /// The side facing increasing `x`.
    Right,
    /// The side facing decreasing `y`.
    Bottom,
    /// The side facing decreasing `x`.
    Left,
}

impl Side {
    /// All sides in clockwise order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Returns the clockwise index of this side (`Top = 0`).
    pub fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Right => 1,
            Side::Bottom => 2,
            Side::Left => 3,
        }
    }

    /// Returns the side with the given clockwise index, wrapping modulo 4.
    pub fn from_index(index: usize) -> Side {
        Side::ALL[index % 4]
    }

    /// Rotates this side clockwise by `quarter_turns`.
    pub fn rotate(self, quarter_turns: u8) -> Side {
        Side::from_index(self.index() + usize::from(quarter_turns))
    }

    /// Returns the side facing the opposite direction.
    pub fn opposite(self) -> Side {
        self.rotate(2)
    }

    /// Number of clockwise quarter turns needed to go from `self` to `other`.
    pub fn turns_to(self, other: Side) -> u8 {
        ((other.index() + 4 - self.index()) % 4) as u8
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Top => write!(f, "top"),
            Side::Right => write!(f, "right"),
            Side::Bottom => write!(f, "bottom"),
            Side::Left => write!(f, "left"),
        }
    }
}
