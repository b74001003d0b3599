//! Opaque ID newtypes for architecture catalogs.
//!
//! [`SwitchId`], [`SegmentId`], and [`TileTypeId`] are thin `u32` wrappers
//! indexing the corresponding vectors of an [`Architecture`](crate::Architecture).

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }

            /// Returns the index as a `usize` for slice access.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Index into the switch catalog.
    SwitchId
);

define_id!(
    /// Index into the segment catalog.
    SegmentId
);

define_id!(
    /// Index into the tile type catalog.
    TileTypeId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn roundtrip() {
        assert_eq!(SwitchId::from_raw(3).as_raw(), 3);
        assert_eq!(SegmentId::from_raw(7).index(), 7);
    }

    #[test]
    fn hash_in_set() {
        let mut set = HashSet::new();
        set.insert(TileTypeId::from_raw(1));
        set.insert(TileTypeId::from_raw(2));
        set.insert(TileTypeId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serde_roundtrip() {
        let id = SegmentId::from_raw(5);
        let json = serde_json::to_string(&id).unwrap();
        let back: SegmentId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", SwitchId::from_raw(42)), "42");
    }
}
