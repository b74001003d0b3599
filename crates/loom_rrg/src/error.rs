//! Error taxonomy of routing-graph construction.

use crate::ids::NodeId;
use crate::node::{Bounds, NodeKind};
use loom_arch::ArchError;
use loom_common::Coord;

/// Errors raised while building or canonicalizing a routing graph.
///
/// Architecture problems (`UnsupportedInteriorIO`, `OverlappingBlocks`,
/// `DeviceTooSmall`, `MalformedArchitecture`) are fatal input errors. `OutOfRange`,
/// `CanonicalizationConflict`, and `InconsistentBlock` indicate a defect in
/// construction and abort the build.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RrgError {
    /// A channel node was allocated with an inverted rectangle.
    #[error("{kind} node has inverted bounds {bounds}")]
    InvalidBounds {
        /// Kind of the rejected node.
        kind: NodeKind,
        /// The rejected rectangle.
        bounds: Bounds,
    },

    /// A node ID does not name an allocated node.
    #[error("node {id} is out of range (store holds {len} nodes)")]
    OutOfRange {
        /// The offending ID.
        id: NodeId,
        /// Number of allocated nodes.
        len: usize,
    },

    /// An I/O tile was placed away from the device perimeter.
    #[error("I/O tile '{tile}' at {coord} is not on the device perimeter")]
    UnsupportedInteriorIO {
        /// Tile type name.
        tile: String,
        /// Where it was placed.
        coord: Coord,
    },

    /// A tile placement lands on a cell covered by a taller block.
    #[error("'{tile}' at {root} overlaps the block rooted at {existing_root}")]
    OverlappingBlocks {
        /// Tile type name of the new placement.
        tile: String,
        /// Root of the new placement.
        root: Coord,
        /// Root of the block already covering the cell.
        existing_root: Coord,
    },

    /// The device core has a zero dimension.
    #[error("device core is {nx} x {ny}; both dimensions must be non-zero")]
    DeviceTooSmall {
        /// Core columns.
        nx: u32,
        /// Core rows.
        ny: u32,
    },

    /// The architecture has inconsistent references or unusable parameters.
    #[error("malformed architecture: {0}")]
    MalformedArchitecture(#[from] ArchError),

    /// An instance matched two different representatives.
    #[error("{structure} at {coord} matches representatives at {first} and {second}")]
    CanonicalizationConflict {
        /// `sb`, `cbx`, `cby`, `chanx` or `chany`.
        structure: &'static str,
        /// The instance being classified.
        coord: Coord,
        /// First matching representative.
        first: Coord,
        /// Second matching representative.
        second: Coord,
    },

    /// A switch or connection block was requested where none exists.
    #[error("no {structure} exists at {coord}")]
    NoSuchBlock {
        /// `sb`, `cbx` or `cby`.
        structure: &'static str,
        /// The requested coordinate.
        coord: Coord,
    },

    /// A block's connectivity disagrees with the graph it was assembled from.
    #[error("inconsistent {structure} at {coord}: {reason}")]
    InconsistentBlock {
        /// `sb`, `cbx` or `cby`.
        structure: &'static str,
        /// The block coordinate.
        coord: Coord,
        /// What disagreed.
        reason: String,
    },

    /// Configuration bits ran past the end of the 32-bit address space.
    #[error("configuration bits overflow: {demand} bits requested at bit {next}")]
    ConfBitOverflow {
        /// First free bit when the request was made.
        next: u32,
        /// Regular bits requested.
        demand: u32,
    },

    /// A block signature could not be serialized for hashing.
    #[error("failed to encode block signature: {reason}")]
    Encoding {
        /// The encoder's message.
        reason: String,
    },
}
