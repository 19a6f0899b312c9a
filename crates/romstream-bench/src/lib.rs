//! Transfer-strategy benchmark harness.
//!
//! Streams a built-in 32 KiB payload from slow storage through fast scratch
//! with each registered strategy, folds every byte into a position-dependent
//! checksum, and ranks the strategies by elapsed cycles.
//!
//! | Module        | Contents                                      |
//! |---------------|-----------------------------------------------|
//! | [`payload`]   | The payload and its generator                 |
//! | [`checksum`]  | Windowed checksum and the oracle              |
//! | [`buffers`]   | Per-tier scratch sets the strategies use      |
//! | [`strategy`]  | The ten strategies and their route needs      |
//! | [`selector`]  | Timed runs, report, winner                    |
//! | [`config`]    | Passes, strategy list, simulated latency      |
//!
//! # Quick start
//!
//! ```
//! use romstream_bench::{
//!     BenchConfig, FastScratch, MediumScratch, ScratchSet, Selector, StrategyKind, PAYLOAD,
//! };
//! use romstream_driver::{Latency, SimulatedPlatform};
//!
//! let config = BenchConfig::default()
//!     .with_passes(1)
//!     .with_strategies([StrategyKind::SingleChannel, StrategyKind::DualChannel]);
//! let mut platform = SimulatedPlatform::simulated(Latency::Fixed(2));
//! let (mut fast, mut medium) = (FastScratch::new(), MediumScratch::new());
//! let mut scratch = ScratchSet::new(&mut fast, &mut medium);
//! let report = Selector::new(config)?.run(&mut platform, &mut scratch, &PAYLOAD)?;
//!
//! report.verify()?;
//! assert!(report.winner().is_some());
//! # Ok::<(), romstream_bench::BenchError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod buffers;
pub mod checksum;
pub mod config;
mod error;
pub mod payload;
pub mod selector;
pub mod strategy;

pub use buffers::{BufferPair, FastScratch, MediumScratch, ScratchSet};
pub use checksum::Checksum;
pub use config::{BenchConfig, DEFAULT_PASSES};
pub use error::{BenchError, Result};
pub use payload::{Payload, PAYLOAD, PAYLOAD_LEN};
pub use selector::{BenchReport, Entry, Outcome, Selector};
pub use strategy::{Route, StrategyKind};
