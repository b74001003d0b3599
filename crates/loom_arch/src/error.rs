//! Error types for architecture validation.

use crate::ids::{SwitchId, TileTypeId};

/// Inconsistencies found in an architecture description.
///
/// Every variant names the offending catalog entry so the caller can point
/// at the input that needs fixing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArchError {
    /// A catalog required by the builder is empty.
    #[error("architecture declares no {0}")]
    Empty(&'static str),

    /// A switch reference is out of range.
    #[error("{context} references unknown switch {id}")]
    UnknownSwitch {
        /// What holds the reference.
        context: String,
        /// The dangling ID.
        id: SwitchId,
    },

    /// A tile type reference is out of range.
    #[error("{context} references unknown tile type {id}")]
    UnknownTileType {
        /// What holds the reference.
        context: String,
        /// The dangling ID.
        id: TileTypeId,
    },

    /// A segment definition violates a construction constraint.
    #[error("segment '{name}': {reason}")]
    InvalidSegment {
        /// The segment name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A tile type definition is inconsistent.
    #[error("tile type '{name}': {reason}")]
    InvalidTileType {
        /// The tile type name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The switch-block parameters are unusable.
    #[error("switch block: {0}")]
    InvalidSwitchBlock(String),

    /// The device layout cannot be realized.
    #[error("layout: {0}")]
    InvalidLayout(String),

    /// The architecture asks for a feature the builder does not provide.
    #[error("unsupported architecture feature: {0}")]
    Unsupported(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_switch() {
        let err = ArchError::UnknownSwitch {
            context: "segment 'L4'".into(),
            id: SwitchId::from_raw(9),
        };
        assert_eq!(format!("{err}"), "segment 'L4' references unknown switch 9");
    }

    #[test]
    fn display_invalid_segment() {
        let err = ArchError::InvalidSegment {
            name: "L2".into(),
            reason: "length must be at least 1".into(),
        };
        assert_eq!(format!("{err}"), "segment 'L2': length must be at least 1");
    }

    #[test]
    fn display_empty() {
        assert_eq!(
            format!("{}", ArchError::Empty("segments")),
            "architecture declares no segments"
        );
    }
}
