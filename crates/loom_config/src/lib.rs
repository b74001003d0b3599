//! Parsing and validation of `fabric.toml` architecture descriptions.
//!
//! This crate reads a fabric description and produces a resolved
//! [`Fabric`]: a validated [`loom_arch::Architecture`] with every name
//! reference turned into a catalog ID, plus the [`BuildOptions`] that steer
//! routing-graph construction.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_fabric, load_fabric_from_str, FABRIC_FILE};
pub use resolve::{resolve_fabric, Fabric};
pub use types::*;
