//! DMA channels and their routing limits.
//!
//! ```text
//! Channel  Reads from              Writes to          Max units
//! ──────── ─────────────────────── ────────────────── ─────────
//! DMA0     internal memory only    internal memory    0x3FFF
//! DMA1     any                     internal memory    0x3FFF
//! DMA2     any                     internal memory    0x3FFF
//! DMA3     any                     any except ROM     0xFFFF
//! ```
//!
//! "Internal memory" is everything below the cartridge window, which covers
//! both RAM tiers. A unit count of zero is decoded by hardware as the maximum
//! plus one; this model never programs it.

use crate::memory::MemoryTier;
use crate::regs;
use std::fmt;

/// Largest unit count every channel accepts.
pub const MAX_UNITS_ANY_CHANNEL: u32 = 0x3FFF;

/// One of the four DMA channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Highest priority; cannot read the cartridge.
    Dma0,
    /// Sound FIFO channel in games; general purpose here.
    Dma1,
    /// Sound FIFO channel in games; general purpose here.
    Dma2,
    /// General purpose, lowest priority, widest reach.
    Dma3,
}

impl Channel {
    /// All channels in priority order.
    pub const ALL: [Self; 4] = [Self::Dma0, Self::Dma1, Self::Dma2, Self::Dma3];

    /// Channel number.
    pub const fn index(self) -> usize {
        match self {
            Self::Dma0 => 0,
            Self::Dma1 => 1,
            Self::Dma2 => 2,
            Self::Dma3 => 3,
        }
    }

    /// Address of the channel's `DMAxSAD` register.
    pub const fn register_base(self) -> usize {
        regs::DMA0SAD + self.index() * regs::DMA_CHANNEL_STRIDE
    }

    /// Largest unit count that can be programmed.
    pub const fn max_units(self) -> u32 {
        match self {
            Self::Dma3 => 0xFFFF,
            _ => MAX_UNITS_ANY_CHANNEL,
        }
    }

    /// Whether the channel can use `tier` as a source.
    pub const fn can_read(self, tier: MemoryTier) -> bool {
        !matches!((self, tier), (Self::Dma0, MemoryTier::Slow))
    }

    /// Whether the channel can use `tier` as a destination.
    pub const fn can_write(self, tier: MemoryTier) -> bool {
        tier.is_writable()
    }

    /// Whether the channel can move data from `from` to `to`.
    pub const fn can_route(self, from: MemoryTier, to: MemoryTier) -> bool {
        self.can_read(from) && self.can_write(to)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DMA{}", self.index())
    }
}
