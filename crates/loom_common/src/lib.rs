//! Shared foundational types used across the Loom fabric toolchain.
//!
//! This crate provides grid coordinates, the four sides of a tile or routing
//! junction, and content hashing used to bucket structural signatures.

#![warn(missing_docs)]

pub mod geom;
pub mod hash;

pub use geom::{Coord, Side};
pub use hash::ContentHash;
