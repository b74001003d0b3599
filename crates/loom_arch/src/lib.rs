//! Architecture model for tileable FPGA routing fabrics.
//!
//! This crate describes everything the routing-graph builder consumes from an
//! architecture description: the switch catalog, the wire segment catalog,
//! the switch-block pattern, tile types with their pin classes and per-side
//! pin locations, and the device layout. The model is plain data; the
//! [`Architecture::validate`] pass checks cross references and the
//! constraints the builder relies on.

#![warn(missing_docs)]

pub mod error;
pub mod ids;
pub mod types;
pub mod validate;

pub use error::ArchError;
pub use ids::{SegmentId, SwitchId, TileTypeId};
pub use types::*;
