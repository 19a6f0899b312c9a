//! Everything a streaming pipeline needs, bundled.
//!
//! ```text
//! Platform
//! ├── engines
//! │   ├── primary     TransferChannel (blocking fills, relay hops)
//! │   ├── secondary   TransferChannel (prefetch overlapped with compute)
//! │   └── block_copy  BlockCopy
//! ├── counter         CycleCounter
//! └── capabilities    which engine may move what where
//! ```
//!
//! `engines` and `counter` are separate fields so a harness can hold the
//! counter while a strategy borrows the engines.

use crate::backends::software::{Latency, SimulatedChannel, WallClock};
use crate::block_copy::{BlockCopy, SoftwareBlockCopy};
use crate::capabilities::Capabilities;
use crate::channel::TransferChannel;
use crate::counter::CycleCounter;
use crate::error::{Result, StreamError};
use tracing::info;

/// The data movers of a platform.
#[derive(Debug)]
pub struct Engines<C, B> {
    /// Primary bulk channel
    pub primary: C,
    /// Secondary bulk channel
    pub secondary: C,
    /// Block-copy accelerator
    pub block_copy: B,
}

/// Engines, counter and capabilities of one platform.
#[derive(Debug)]
pub struct Platform<C, B, K> {
    /// Data movers
    pub engines: Engines<C, B>,
    /// Cycle counter
    pub counter: K,
    /// Route and clock facts
    pub capabilities: Capabilities,
}

/// Host platform built from the software backends.
pub type SimulatedPlatform = Platform<SimulatedChannel, SoftwareBlockCopy, WallClock>;

impl<C: TransferChannel, B: BlockCopy, K: CycleCounter> Platform<C, B, K> {
    /// Assemble a platform.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidConfig`] if the channels do not match
    /// the roles in `capabilities`, or both roles use the same hardware
    /// channel.
    pub fn new(engines: Engines<C, B>, counter: K, capabilities: Capabilities) -> Result<Self> {
        if engines.primary.id() != capabilities.primary
            || engines.secondary.id() != capabilities.secondary
        {
            return Err(StreamError::invalid_config(format!(
                "channels {}/{} do not match capabilities {}/{}",
                engines.primary.id(),
                engines.secondary.id(),
                capabilities.primary,
                capabilities.secondary
            )));
        }
        if capabilities.primary == capabilities.secondary {
            return Err(StreamError::invalid_config(format!(
                "primary and secondary roles both use {}",
                capabilities.primary
            )));
        }
        info!(
            primary = %capabilities.primary,
            secondary = %capabilities.secondary,
            clock_hz = capabilities.clock_hz,
            "platform assembled"
        );
        Ok(Self {
            engines,
            counter,
            capabilities,
        })
    }
}

impl SimulatedPlatform {
    /// Host platform with target capabilities and simulated channels.
    ///
    /// A random latency seeds the two channels differently.
    pub fn simulated(latency: Latency) -> Self {
        Self::simulated_with(Capabilities::target(), latency)
    }

    /// Host platform with explicit capabilities.
    pub fn simulated_with(capabilities: Capabilities, latency: Latency) -> Self {
        let secondary_latency = match latency {
            Latency::Random { seed, max_polls } => Latency::Random {
                seed: seed.rotate_left(17) ^ 0x9E37_79B9_7F4A_7C15,
                max_polls,
            },
            other => other,
        };
        info!(?latency, "simulated platform");
        Self {
            engines: Engines {
                primary: SimulatedChannel::new(capabilities.primary, latency),
                secondary: SimulatedChannel::new(capabilities.secondary, secondary_latency),
                block_copy: SoftwareBlockCopy::new(),
            },
            counter: WallClock::new(capabilities.clock_hz),
            capabilities,
        }
    }
}

/// The handheld target: DMA3 primary, DMA1 secondary, BIOS block copy,
/// timers 2+3 cascaded at a 64-cycle prescaler.
#[cfg(target_arch = "arm")]
pub type TargetPlatform = Platform<
    crate::backends::mmio::MmioChannel,
    crate::block_copy::BiosFastSet,
    crate::backends::mmio::TimerPair,
>;

#[cfg(target_arch = "arm")]
impl TargetPlatform {
    /// Take the target's registers.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidConfig`] if the counter timer has no
    /// cascade partner.
    ///
    /// # Safety
    ///
    /// Must run on the target, at most once, with DMA1, DMA3 and timers 2
    /// and 3 unused by anything else.
    pub unsafe fn target() -> Result<Self> {
        use crate::backends::mmio::{MmioChannel, TimerPair};
        use romstream_chip::timer::{Prescaler, Timer};

        let capabilities = Capabilities::target();
        // SAFETY: forwarded from the caller.
        let (primary, secondary, counter) = unsafe {
            (
                MmioChannel::take(capabilities.primary),
                MmioChannel::take(capabilities.secondary),
                TimerPair::take(Timer::Tm2, Prescaler::Div64),
            )
        };
        let counter =
            counter.ok_or_else(|| StreamError::invalid_config("timer 2 has no cascade partner"))?;
        let engines = Engines {
            primary,
            secondary,
            block_copy: crate::block_copy::BiosFastSet,
        };
        Self::new(engines, counter, capabilities)
    }
}
