//! Backend implementations
//!
//! Two families:
//! - **MMIO**: real DMA and timer registers on the target
//! - **Software**: simulated channel and wall-clock counter for hosts and CI

pub mod mmio;
pub mod software;

pub use mmio::{MmioChannel, RegisterBlock, TimerPair};
pub use software::{ChannelStats, Latency, SimulatedChannel, WallClock, POISON};
