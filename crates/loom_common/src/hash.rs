//! Structural fingerprints.
//!
//! A [`ContentHash`] is the XXH3-128 digest of a value's `bincode`
//! encoding. Equal values always hash equal; unequal values almost never
//! do, so callers bucket by hash and confirm with a full comparison.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit XXH3 fingerprint.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Hashes raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }

    /// Hashes the standard `bincode` encoding of `value`.
    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, bincode::error::EncodeError> {
        let bytes = bincode::serde::encode_to_vec(value, bincode::config::standard())?;
        Ok(Self::from_bytes(&bytes))
    }

    /// The low 32 bits, for compact log output.
    pub fn short(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.short())
    }
}
