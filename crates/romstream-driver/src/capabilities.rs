//! Platform capabilities: which engine may move data between which tiers.
//!
//! Routes are configuration, not assumptions. [`Capabilities::target`]
//! derives them from the channel model in `romstream-chip`; tests and
//! ports tighten them with [`Capabilities::without_route`] and pipelines
//! check every hop with [`Capabilities::require`] before they run.

use crate::error::{Result, StreamError};
use romstream_chip::clock::CPU_HZ;
use romstream_chip::dma::Channel;
use romstream_chip::MemoryTier;
use std::fmt;
use tracing::debug;

/// Which bulk channel a pipeline stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelRole {
    /// Blocking fills and relay hops.
    Primary,
    /// Prefetches overlapped with compute.
    Secondary,
}

/// An engine that moves bytes between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mover {
    /// Addressed loads by the CPU itself.
    Cpu,
    /// The synchronous block-copy accelerator.
    BlockCopy,
    /// One of the two bulk channels.
    Channel(ChannelRole),
}

impl fmt::Display for Mover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => f.write_str("CPU"),
            Self::BlockCopy => f.write_str("block copy"),
            Self::Channel(ChannelRole::Primary) => f.write_str("primary channel"),
            Self::Channel(ChannelRole::Secondary) => f.write_str("secondary channel"),
        }
    }
}

/// Allowed `from -> to` pairs for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMatrix([[bool; 3]; 3]);

impl RouteMatrix {
    /// Every pair whose destination is writable.
    pub const fn any_writable() -> Self {
        let mut m = [[false; 3]; 3];
        let mut from = 0;
        while from < 3 {
            let mut to = 0;
            while to < 3 {
                m[from][to] = MemoryTier::ALL[to].is_writable();
                to += 1;
            }
            from += 1;
        }
        Self(m)
    }

    /// Routes of a hardware DMA channel.
    pub const fn for_channel(channel: Channel) -> Self {
        let mut m = [[false; 3]; 3];
        let mut from = 0;
        while from < 3 {
            let mut to = 0;
            while to < 3 {
                m[from][to] = channel.can_route(MemoryTier::ALL[from], MemoryTier::ALL[to]);
                to += 1;
            }
            from += 1;
        }
        Self(m)
    }

    /// Whether `from -> to` is allowed.
    pub const fn allows(&self, from: MemoryTier, to: MemoryTier) -> bool {
        self.0[from.index()][to.index()]
    }

    /// Forbid `from -> to`.
    #[must_use]
    pub const fn without(mut self, from: MemoryTier, to: MemoryTier) -> Self {
        self.0[from.index()][to.index()] = false;
        self
    }
}

/// Data-movement capabilities of a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Hardware channel in the primary role
    pub primary: Channel,
    /// Hardware channel in the secondary role
    pub secondary: Channel,
    /// CPU clock in Hz
    pub clock_hz: u32,
    primary_routes: RouteMatrix,
    secondary_routes: RouteMatrix,
    block_copy_routes: RouteMatrix,
}

impl Capabilities {
    /// The handheld target: DMA3 primary, DMA1 secondary, BIOS block copy.
    pub fn target() -> Self {
        Self::with_channels(Channel::Dma3, Channel::Dma1)
    }

    /// Capabilities for an arbitrary channel assignment.
    pub fn with_channels(primary: Channel, secondary: Channel) -> Self {
        let caps = Self {
            primary,
            secondary,
            clock_hz: CPU_HZ,
            primary_routes: RouteMatrix::for_channel(primary),
            secondary_routes: RouteMatrix::for_channel(secondary),
            block_copy_routes: RouteMatrix::any_writable(),
        };
        debug!(%primary, %secondary, "capabilities derived from channel model");
        caps
    }

    /// Same capabilities with one route removed from `mover`.
    ///
    /// Removing a CPU route has no effect: addressed loads reach every tier.
    #[must_use]
    pub fn without_route(mut self, mover: Mover, from: MemoryTier, to: MemoryTier) -> Self {
        match mover {
            Mover::Cpu => {}
            Mover::BlockCopy => self.block_copy_routes = self.block_copy_routes.without(from, to),
            Mover::Channel(ChannelRole::Primary) => {
                self.primary_routes = self.primary_routes.without(from, to);
            }
            Mover::Channel(ChannelRole::Secondary) => {
                self.secondary_routes = self.secondary_routes.without(from, to);
            }
        }
        self
    }

    /// Hardware channel for `role`.
    pub const fn channel(&self, role: ChannelRole) -> Channel {
        match role {
            ChannelRole::Primary => self.primary,
            ChannelRole::Secondary => self.secondary,
        }
    }

    /// Whether `mover` can move data from `from` to `to`.
    pub fn supports(&self, mover: Mover, from: MemoryTier, to: MemoryTier) -> bool {
        match mover {
            Mover::Cpu => to.is_writable(),
            Mover::BlockCopy => self.block_copy_routes.allows(from, to),
            Mover::Channel(ChannelRole::Primary) => self.primary_routes.allows(from, to),
            Mover::Channel(ChannelRole::Secondary) => self.secondary_routes.allows(from, to),
        }
    }

    /// Check that `mover` can move data from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnsupportedRoute`] if it cannot.
    pub fn require(&self, mover: Mover, from: MemoryTier, to: MemoryTier) -> Result<()> {
        if self.supports(mover, from, to) {
            Ok(())
        } else {
            Err(StreamError::unsupported_route(mover, from, to))
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::target()
    }
}
