//! Routing resource graph construction for tileable FPGA fabrics.
//!
//! Given a validated [`loom_arch::Architecture`], this crate expands the
//! device grid, allocates every routing node (pin classes, pins, and
//! channel wires), wires them through switch and connection blocks, and
//! then reduces the device's blocks to a small set of unique modules.
//!
//! # Pipeline
//!
//! 1. **Grid**: expand the layout into a [`DeviceGrid`] with the I/O ring
//! 2. **Nodes**: SOURCE/SINK per pin class, IPIN/OPIN per pin, then wires
//!    for every channel track
//! 3. **Edges**: tile hookups, switch-block patterns, connection-block
//!    patterns; duplicates are dropped
//! 4. **Blocks**: assemble a [`Gsb`] per switch-block coordinate and a
//!    [`Cb`] per populated channel
//! 5. **Canonicalize**: group blocks into mirror and rotation classes
//! 6. **Configuration bits**: number every block's bits in bitstream order
//!
//! # Usage
//!
//! ```ignore
//! use loom_rrg::build_device;
//!
//! let device = build_device(&fabric.arch, &fabric.build, &sink)?;
//! let rep = device.unique_sb_module(Coord::new(1, 1))?;
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod canon;
pub mod chan;
pub mod conf_bits;
pub mod connect;
pub mod device;
pub mod edges;
pub mod error;
pub mod graph;
pub mod grid;
pub mod gsb;
pub mod ids;
pub mod node;
pub mod order;
pub mod ports;
pub mod signature;
pub mod stats;
pub mod store;
mod track;

#[cfg(test)]
mod testutil;

pub use builder::{build_device, RrgBuilder};
pub use canon::{Assignment, Equivalence, ModuleTable};
pub use chan::{ChanType, ChannelNodes, TrackPlan};
pub use conf_bits::{BasicPort, ConfPorts};
pub use device::DeviceRrg;
pub use edges::FanInIndex;
pub use error::RrgError;
pub use graph::{RoutingGraph, TileNodes};
pub use grid::{DeviceGrid, GridCell};
pub use gsb::{Cb, Gsb, GsbSide, PortDir};
pub use ids::{ModuleId, NodeId};
pub use node::{Bounds, Direction, Edge, NodeKind, RoutingNode};
pub use order::{device_blocks_in_bitstream_order, device_tiles_in_bitstream_order, BitstreamBlock};
pub use signature::{Rotation, SideOffsets};
pub use stats::{MuxStats, RrgStats};
pub use store::NodeStore;
