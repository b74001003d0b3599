//! Grid locations attached to diagnostics.

use loom_common::Coord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the device a diagnostic applies.
///
/// A location is a grid coordinate plus the name of the structure found
/// there (a tile type, `sb`, `cbx`, ...). Device-wide diagnostics use
/// [`Location::DEVICE`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// The grid coordinate, if the diagnostic is tied to one.
    pub coord: Option<Coord>,
    /// The structure at that coordinate.
    pub context: String,
}

impl Location {
    /// A location covering the whole device.
    pub const DEVICE: Location = Location {
        coord: None,
        context: String::new(),
    };

    /// Creates a location at `coord` naming the structure found there.
    pub fn at(coord: Coord, context: impl Into<String>) -> Self {
        Self {
            coord: Some(coord),
            context: context.into(),
        }
    }

    /// Creates a location naming an architecture element with no coordinate.
    pub fn named(context: impl Into<String>) -> Self {
        Self {
            coord: None,
            context: context.into(),
        }
    }

    /// Returns `true` if this location carries neither coordinate nor name.
    pub fn is_device(&self) -> bool {
        self.coord.is_none() && self.context.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.coord, self.context.is_empty()) {
            (Some(c), true) => write!(f, "{c}"),
            (Some(c), false) => write!(f, "{c} {}", self.context),
            (None, false) => write!(f, "{}", self.context),
            (None, true) => write!(f, "<device>"),
        }
    }
}
