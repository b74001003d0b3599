//! Configuration-bit ranges and their allocation.
//!
//! Every tile, switch block, and connection block receives a *regular* bit
//! range from a device-wide counter, visited in bitstream order. *Reserved*
//! bits are shared lines that every block indexes from zero, so a reserved
//! range always starts at bit 0.

use crate::error::RrgError;
use loom_config::ConfigStyle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive `[lsb, msb]` bit range. A port with `msb < lsb` is invalid
/// and has width zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BasicPort {
    lsb: u32,
    msb: u32,
}

impl Default for BasicPort {
    fn default() -> Self {
        Self::invalid()
    }
}

impl BasicPort {
    /// The zero-width port.
    pub const fn invalid() -> Self {
        Self { lsb: 1, msb: 0 }
    }

    /// A port spanning `lsb..=msb`; invalid if `lsb > msb`.
    pub fn new(lsb: u32, msb: u32) -> Self {
        if lsb > msb {
            Self::invalid()
        } else {
            Self { lsb, msb }
        }
    }

    /// A port spanning `0..width`; invalid if `width` is zero.
    pub fn with_width(width: u32) -> Self {
        match width {
            0 => Self::invalid(),
            w => Self { lsb: 0, msb: w - 1 },
        }
    }

    /// Lowest bit.
    pub fn lsb(&self) -> u32 {
        self.lsb
    }

    /// Highest bit.
    pub fn msb(&self) -> u32 {
        self.msb
    }

    /// Returns `true` if the port covers at least one bit.
    pub fn is_valid(&self) -> bool {
        self.lsb <= self.msb
    }

    /// Number of bits covered.
    pub fn width(&self) -> u32 {
        if self.is_valid() {
            self.msb - self.lsb + 1
        } else {
            0
        }
    }

    /// Grows the port by `width` bits at the MSB end. An invalid port
    /// becomes `0..width`.
    pub fn expand(&mut self, width: u32) {
        if width == 0 {
            return;
        }
        if self.is_valid() {
            self.msb += width;
        } else {
            *self = Self::with_width(width);
        }
    }

    /// Shifts the port up by `offset`. Returns `false` and leaves the port
    /// untouched if the shift would overflow.
    pub fn rotate(&mut self, offset: u32) -> bool {
        if offset == 0 || !self.is_valid() {
            return true;
        }
        match (self.lsb.checked_add(offset), self.msb.checked_add(offset)) {
            (Some(lsb), Some(msb)) => {
                self.lsb = lsb;
                self.msb = msb;
                true
            }
            _ => false,
        }
    }

    /// Shifts the port down by `offset`. Returns `false` and leaves the port
    /// untouched if the shift would go below bit 0.
    pub fn counter_rotate(&mut self, offset: u32) -> bool {
        if offset == 0 || !self.is_valid() {
            return true;
        }
        match (self.lsb.checked_sub(offset), self.msb.checked_sub(offset)) {
            (Some(lsb), Some(msb)) => {
                self.lsb = lsb;
                self.msb = msb;
                true
            }
            _ => false,
        }
    }

    /// Appends the width of `other` to this port. An invalid port stays
    /// invalid.
    pub fn combine(&mut self, other: &BasicPort) {
        if self.is_valid() {
            self.msb += other.width();
        }
    }

    /// Swaps LSB and MSB.
    pub fn revert(&mut self) {
        std::mem::swap(&mut self.lsb, &mut self.msb);
    }

    /// Makes the port invalid.
    pub fn reset(&mut self) {
        *self = Self::invalid();
    }
}

impl fmt::Display for BasicPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "[{}:{}]", self.msb, self.lsb)
        } else {
            f.write_str("[]")
        }
    }
}

/// Reserved and regular configuration ports of one block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ConfPorts {
    /// Shared lines, always starting at bit 0.
    pub reserved: BasicPort,
    /// The block's own bits in the device-wide numbering.
    pub regular: BasicPort,
}

impl ConfPorts {
    /// Total bits the block owns in the device-wide numbering.
    pub fn num_regular_bits(&self) -> u32 {
        self.regular.width()
    }

    /// Number of shared reserved lines the block uses.
    pub fn num_reserved_bits(&self) -> u32 {
        self.reserved.width()
    }

    /// Makes both ports invalid.
    pub fn reset(&mut self) {
        self.reserved.reset();
        self.regular.reset();
    }
}

/// Configuration bits demanded by one block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BitDemand {
    /// Shared reserved lines.
    pub reserved: u32,
    /// Bits owned by the block.
    pub regular: u32,
}

/// Bits needed to configure one multiplexer of `fan_in` inputs.
///
/// A mux of fan-in 0 or 1 is a plain wire and needs no bits. SRAM
/// configuration encodes the selection in `ceil(log2(fan_in))` bits; a
/// memory bank drives one bit line per input.
pub fn mux_conf_bits(fan_in: u32, style: ConfigStyle) -> u32 {
    if fan_in <= 1 {
        return 0;
    }
    match style {
        ConfigStyle::Sram => u32::BITS - (fan_in - 1).leading_zeros(),
        ConfigStyle::MemoryBank => fan_in,
    }
}

/// Bits needed by a block of multiplexers with the given fan-ins.
///
/// Memory banks reserve as many shared lines as the largest mux needs.
pub fn block_conf_bits(fan_ins: impl IntoIterator<Item = u32>, style: ConfigStyle) -> BitDemand {
    let mut demand = BitDemand::default();
    for fan_in in fan_ins {
        let bits = mux_conf_bits(fan_in, style);
        demand.regular = demand.regular.saturating_add(bits);
        if style == ConfigStyle::MemoryBank {
            demand.reserved = demand.reserved.max(bits);
        }
    }
    demand
}

/// Device-wide counter handing out regular bit ranges in visit order.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfBitCounter {
    next: u32,
    reserved: u32,
}

impl ConfBitCounter {
    /// A counter starting at bit 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next range for a block with the given demand. Fails,
    /// leaving the counter untouched, if the range would pass `u32::MAX`.
    pub fn allocate(&mut self, demand: BitDemand) -> Result<ConfPorts, RrgError> {
        let overflow = RrgError::ConfBitOverflow {
            next: self.next,
            demand: demand.regular,
        };
        let next = self.next.checked_add(demand.regular).ok_or_else(|| overflow.clone())?;
        let mut regular = BasicPort::with_width(demand.regular);
        if !regular.rotate(self.next) {
            return Err(overflow);
        }
        self.next = next;
        self.reserved = self.reserved.max(demand.reserved);
        Ok(ConfPorts {
            reserved: BasicPort::with_width(demand.reserved),
            regular,
        })
    }

    /// Regular bits handed out so far.
    pub fn total_regular(&self) -> u32 {
        self.next
    }

    /// Largest reserved demand seen so far.
    pub fn total_reserved(&self) -> u32 {
        self.reserved
    }
}
