//! Data-movement layer for streaming through a three-tier memory hierarchy.
//!
//! This crate turns the platform model in `romstream-chip` into capabilities
//! a pipeline can program against, with a register-level backend for the
//! target and a software backend for hosts.
//!
//! # Capabilities
//!
//! | Trait / type | Target backend | Software backend |
//! |--------------|----------------|------------------|
//! | [`TransferChannel`] | [`MmioChannel`] (DMA1/DMA3) | [`SimulatedChannel`] |
//! | [`BlockCopy`] | `BiosFastSet` (`CpuFastSet`) | [`SoftwareBlockCopy`] |
//! | [`CycleCounter`] | [`TimerPair`] (TM2+TM3 cascade) | [`WallClock`] |
//! | [`ScratchRegion<Fast, N>`](ScratchRegion) | `.iwram` static | local |
//!
//! # Quick start
//!
//! ```
//! use romstream_driver::{Fast, Latency, ScratchRegion, SimulatedPlatform, TransferChannel};
//!
//! let mut platform = SimulatedPlatform::simulated(Latency::Fixed(4));
//! let rom = [7i8; 32];
//! let mut buf = ScratchRegion::<Fast, 32>::new();
//!
//! // `buf` is exclusively borrowed until the channel is idle again.
//! let sum: i32 = platform.engines.secondary.overlap(&rom, &mut buf, || 1 + 1);
//! assert_eq!(sum, 2);
//! assert_eq!(buf.as_array(), &rom);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod backends;
mod block_copy;
mod capabilities;
mod channel;
mod counter;
mod error;
mod platform;
mod region;
pub mod window;

/// Platform model constants (re-exported from romstream-chip).
pub mod chip {
    pub use romstream_chip::dma::Channel;
    pub use romstream_chip::timer::{Prescaler, Timer};
    pub use romstream_chip::{bios, clock, memory, regs, MemoryTier};
}

pub use backends::{Latency, MmioChannel, SimulatedChannel, TimerPair, WallClock, POISON};
#[cfg(target_arch = "arm")]
pub use block_copy::BiosFastSet;
pub use block_copy::{BlockCopy, FillAhead, SoftwareBlockCopy, BLOCK_BYTES};
pub use capabilities::{Capabilities, ChannelRole, Mover, RouteMatrix};
pub use channel::{AddressStep, Prefetch, TransferChannel, TransferFlags};
pub use counter::CycleCounter;
pub use error::{Result, StreamError};
#[cfg(target_arch = "arm")]
pub use platform::TargetPlatform;
pub use platform::{Engines, Platform, SimulatedPlatform};
pub use region::{Fast, Medium, ScratchRegion, Tier};
pub use romstream_chip::MemoryTier;
pub use window::{windows, Windows};
