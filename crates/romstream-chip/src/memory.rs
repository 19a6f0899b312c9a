//! Memory map and tier properties.
//!
//! ```text
//! Tier    Region   Base         Size     Bus     Wait (N/S)  Writable
//! ─────── ──────── ──────────── ──────── ─────── ─────────── ────────
//! Slow    ROM      0x0800_0000  32 MB    16-bit  4 / 2       no
//! Medium  EWRAM    0x0200_0000  256 KB   16-bit  2 / 2       yes
//! Fast    IWRAM    0x0300_0000  32 KB    32-bit  0 / 0       yes
//! ```
//!
//! Wait states are the power-on ROM setting (`WAITCNT` = 0) and the fixed
//! EWRAM timing. A 32-bit read from a 16-bit bus costs two accesses.

use std::fmt;

/// Cartridge ROM base address.
pub const ROM_BASE: usize = 0x0800_0000;
/// Cartridge ROM address window (wait state 0 mirror).
pub const ROM_SIZE: usize = 0x0200_0000;

/// External work RAM base address.
pub const EWRAM_BASE: usize = 0x0200_0000;
/// External work RAM size.
pub const EWRAM_SIZE: usize = 0x0004_0000;

/// Internal work RAM base address.
pub const IWRAM_BASE: usize = 0x0300_0000;
/// Internal work RAM size.
pub const IWRAM_SIZE: usize = 0x0000_8000;

/// One level of the memory hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryTier {
    /// Large, read-only, high latency per access (cartridge ROM).
    Slow,
    /// General purpose RAM behind a 16-bit bus with wait states (EWRAM).
    Medium,
    /// Small zero-wait-state RAM on the 32-bit bus (IWRAM).
    Fast,
}

impl MemoryTier {
    /// All tiers, slowest first.
    pub const ALL: [Self; 3] = [Self::Slow, Self::Medium, Self::Fast];

    /// Dense index, used by route matrices.
    pub const fn index(self) -> usize {
        match self {
            Self::Slow => 0,
            Self::Medium => 1,
            Self::Fast => 2,
        }
    }

    /// Base address of the backing region.
    pub const fn base(self) -> usize {
        match self {
            Self::Slow => ROM_BASE,
            Self::Medium => EWRAM_BASE,
            Self::Fast => IWRAM_BASE,
        }
    }

    /// Size of the backing region in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Slow => ROM_SIZE,
            Self::Medium => EWRAM_SIZE,
            Self::Fast => IWRAM_SIZE,
        }
    }

    /// Data bus width in bits.
    pub const fn bus_width_bits(self) -> u32 {
        match self {
            Self::Slow | Self::Medium => 16,
            Self::Fast => 32,
        }
    }

    /// Wait states of a non-sequential access.
    pub const fn wait_states(self) -> u32 {
        match self {
            Self::Slow => 4,
            Self::Medium => 2,
            Self::Fast => 0,
        }
    }

    /// Cycles for one 32-bit non-sequential read.
    pub const fn word_read_cycles(self) -> u32 {
        let accesses = 32 / self.bus_width_bits();
        accesses * (1 + self.wait_states())
    }

    /// Whether software (and DMA) may write to the tier.
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::Slow)
    }

    /// Linker section a static must be placed in to live in this tier.
    ///
    /// `None` for ROM: read-only statics land there by default.
    pub const fn link_section(self) -> Option<&'static str> {
        match self {
            Self::Slow => None,
            Self::Medium => Some(".ewram"),
            Self::Fast => Some(".iwram"),
        }
    }

    /// Whether `addr` falls inside the tier's region.
    pub const fn contains(self, addr: usize) -> bool {
        addr >= self.base() && addr - self.base() < self.size()
    }

    /// Tier backing `addr`, if any.
    pub const fn of_address(addr: usize) -> Option<Self> {
        if Self::Slow.contains(addr) {
            Some(Self::Slow)
        } else if Self::Medium.contains(addr) {
            Some(Self::Medium)
        } else if Self::Fast.contains(addr) {
            Some(Self::Fast)
        } else {
            None
        }
    }

    /// Short region name.
    pub const fn region_name(self) -> &'static str {
        match self {
            Self::Slow => "ROM",
            Self::Medium => "EWRAM",
            Self::Fast => "IWRAM",
        }
    }
}

impl fmt::Display for MemoryTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.region_name())
    }
}
