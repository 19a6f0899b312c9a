//! The transfer strategies.
//!
//! Every strategy streams the payload from slow storage through fast scratch
//! and folds it into a [`Checksum`] in 32-byte windows with global offsets,
//! so all correct strategies agree with [`Checksum::oracle`].
//!
//! | # | Strategy            | Chunk | Movers                                  |
//! |---|---------------------|-------|-----------------------------------------|
//! | 1 | `DirectRead`        | -     | CPU loads from slow storage             |
//! | 2 | `BlockCopy`         | 32    | block copy, blocking                    |
//! | 3 | `SingleChannel`     | 32    | primary, blocking                       |
//! | 4 | `Relay`             | 32    | primary slow→medium→fast, blocking      |
//! | 5 | `DualChannel`       | 32    | primary primes, secondary prefetches    |
//! | 6 | `LargeChunk`        | 512   | as 5                                    |
//! | 7 | `DualChannelRelay`  | 32    | secondary slow→medium, primary relays   |
//! | 8 | `PrimaryOnlyRelay`  | 32    | primary for both relay hops             |
//! | 9 | `StagedLargeChunk`  | 512   | as 7                                    |
//! | 10| `BlockCopyPingPong` | 128   | block copy fills ahead                  |
//!
//! Pipelined strategies prime the first chunk before the loop and drain the
//! last resident chunk after it.

use crate::buffers::{BufferPair, ScratchSet};
use crate::checksum::{Checksum, WINDOW};
use crate::payload::Payload;
use romstream_driver::{
    windows, BlockCopy, Capabilities, ChannelRole, Engines, Fast, FillAhead, Medium, MemoryTier, Mover,
    Prefetch, ScratchRegion, Tier, TransferChannel,
};
use std::fmt;
use std::mem;

const PRIMARY: Mover = Mover::Channel(ChannelRole::Primary);
const SECONDARY: Mover = Mover::Channel(ChannelRole::Secondary);

/// One hop a strategy needs the platform to support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Engine making the hop
    pub mover: Mover,
    /// Source tier
    pub from: MemoryTier,
    /// Destination tier
    pub to: MemoryTier,
}

const fn route(mover: Mover, from: MemoryTier, to: MemoryTier) -> Route {
    Route { mover, from, to }
}

const CPU_READ: &[Route] = &[route(Mover::Cpu, MemoryTier::Slow, MemoryTier::Fast)];
const BLOCK_COPY_FILL: &[Route] = &[route(Mover::BlockCopy, MemoryTier::Slow, MemoryTier::Fast)];
const PRIMARY_FILL: &[Route] = &[route(PRIMARY, MemoryTier::Slow, MemoryTier::Fast)];
const PRIMARY_RELAY: &[Route] = &[
    route(PRIMARY, MemoryTier::Slow, MemoryTier::Medium),
    route(PRIMARY, MemoryTier::Medium, MemoryTier::Fast),
];
const DUAL_FILL: &[Route] = &[
    route(PRIMARY, MemoryTier::Slow, MemoryTier::Fast),
    route(SECONDARY, MemoryTier::Slow, MemoryTier::Fast),
];
const DUAL_RELAY: &[Route] = &[
    route(PRIMARY, MemoryTier::Slow, MemoryTier::Fast),
    route(SECONDARY, MemoryTier::Slow, MemoryTier::Medium),
    route(PRIMARY, MemoryTier::Medium, MemoryTier::Fast),
];
const PIPELINED_PRIMARY_RELAY: &[Route] = &[
    route(PRIMARY, MemoryTier::Slow, MemoryTier::Fast),
    route(PRIMARY, MemoryTier::Slow, MemoryTier::Medium),
    route(PRIMARY, MemoryTier::Medium, MemoryTier::Fast),
];

/// A registered transfer strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Fold straight from slow storage.
    DirectRead,
    /// Block-copy each 32-byte chunk, then fold.
    BlockCopy,
    /// Primary channel fills each 32-byte chunk, then fold.
    SingleChannel,
    /// Primary channel slow → medium → fast per chunk, then fold.
    Relay,
    /// 32-byte double buffering with the secondary channel prefetching.
    DualChannel,
    /// As [`DualChannel`](Self::DualChannel) with 512-byte chunks.
    LargeChunk,
    /// Secondary prefetches into medium while primary relays to fast.
    DualChannelRelay,
    /// Pipelined relay on the primary channel alone.
    PrimaryOnlyRelay,
    /// As [`DualChannelRelay`](Self::DualChannelRelay) with 512-byte chunks.
    StagedLargeChunk,
    /// 128-byte double buffering filled ahead by the block copier.
    BlockCopyPingPong,
}

impl StrategyKind {
    /// Every strategy, in registration order.
    pub const ALL: [Self; 10] = [
        Self::DirectRead,
        Self::BlockCopy,
        Self::SingleChannel,
        Self::Relay,
        Self::DualChannel,
        Self::LargeChunk,
        Self::DualChannelRelay,
        Self::PrimaryOnlyRelay,
        Self::StagedLargeChunk,
        Self::BlockCopyPingPong,
    ];

    /// Label used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            Self::DirectRead => "direct read",
            Self::BlockCopy => "block copy 32B",
            Self::SingleChannel => "single channel 32B",
            Self::Relay => "relay via medium 32B",
            Self::DualChannel => "dual channel 32B",
            Self::LargeChunk => "dual channel 512B",
            Self::DualChannelRelay => "dual channel relay 32B",
            Self::PrimaryOnlyRelay => "primary-only relay 32B",
            Self::StagedLargeChunk => "staged relay 512B",
            Self::BlockCopyPingPong => "block copy ping-pong 128B",
        }
    }

    /// Transfer chunk size in bytes; `None` for direct reads.
    pub const fn chunk_bytes(self) -> Option<usize> {
        match self {
            Self::DirectRead => None,
            Self::LargeChunk | Self::StagedLargeChunk => Some(512),
            Self::BlockCopyPingPong => Some(128),
            _ => Some(32),
        }
    }

    /// Hops this strategy makes.
    pub const fn routes(self) -> &'static [Route] {
        match self {
            Self::DirectRead => CPU_READ,
            Self::BlockCopy | Self::BlockCopyPingPong => BLOCK_COPY_FILL,
            Self::SingleChannel => PRIMARY_FILL,
            Self::Relay => PRIMARY_RELAY,
            Self::DualChannel | Self::LargeChunk => DUAL_FILL,
            Self::DualChannelRelay | Self::StagedLargeChunk => DUAL_RELAY,
            Self::PrimaryOnlyRelay => PIPELINED_PRIMARY_RELAY,
        }
    }

    /// Check every hop against `capabilities`.
    ///
    /// # Errors
    ///
    /// Returns the first unsupported hop as
    /// [`StreamError::UnsupportedRoute`](romstream_driver::StreamError::UnsupportedRoute).
    pub fn check(self, capabilities: &Capabilities) -> romstream_driver::Result<()> {
        self.routes()
            .iter()
            .try_for_each(|r| capabilities.require(r.mover, r.from, r.to))
    }

    /// Stream `payload` `passes` times through this strategy.
    ///
    /// Does not check routes; see [`check`](Self::check).
    pub fn run<C: TransferChannel, B: BlockCopy>(
        self,
        engines: &mut Engines<C, B>,
        scratch: &mut ScratchSet<'_>,
        payload: &Payload,
        passes: u32,
    ) -> Checksum {
        let Engines {
            primary,
            secondary,
            block_copy,
        } = engines;
        match self {
            Self::DirectRead => direct(payload, passes),
            Self::BlockCopy => blocking(&mut scratch.fast.pair_32, payload, passes, |chunk, buf| {
                block_copy.copy(chunk, buf);
            }),
            Self::SingleChannel => blocking(&mut scratch.fast.pair_32, payload, passes, |chunk, buf| {
                primary.transfer(chunk, buf);
            }),
            Self::Relay => {
                let medium = &mut scratch.medium.stage_32;
                blocking(&mut scratch.fast.pair_32, payload, passes, |chunk, buf| {
                    primary.transfer(chunk, medium);
                    primary.transfer(medium.as_array(), buf);
                })
            }
            Self::DualChannel => double_buffered(
                Lanes::split(primary, secondary),
                &mut scratch.fast.pair_32,
                payload,
                passes,
            ),
            Self::LargeChunk => double_buffered(
                Lanes::split(primary, secondary),
                &mut scratch.fast.pair_512,
                payload,
                passes,
            ),
            Self::DualChannelRelay => {
                let (fast, _) = scratch.fast.pair_32.split();
                relay_pipelined(
                    Lanes::split(primary, secondary),
                    &mut scratch.medium.stage_32,
                    fast,
                    payload,
                    passes,
                )
            }
            Self::PrimaryOnlyRelay => {
                let (fast, _) = scratch.fast.pair_32.split();
                relay_pipelined(
                    Lanes::shared(primary),
                    &mut scratch.medium.stage_32,
                    fast,
                    payload,
                    passes,
                )
            }
            Self::StagedLargeChunk => {
                let (fast, _) = scratch.fast.pair_512.split();
                relay_pipelined(
                    Lanes::split(primary, secondary),
                    &mut scratch.medium.stage_512,
                    fast,
                    payload,
                    passes,
                )
            }
            Self::BlockCopyPingPong => double_buffered(
                Lanes::shared(&mut FillAhead(block_copy)),
                &mut scratch.fast.pair_128,
                payload,
                passes,
            ),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Pipelines ──────────────────────────────────────────────────────────────

/// Fold every window where it lies in slow storage.
fn direct(payload: &Payload, passes: u32) -> Checksum {
    let mut sum = Checksum::new();
    for _ in 0..passes {
        for (offset, window) in windows::<WINDOW>(payload.as_array(), 0) {
            sum.fold(window, offset);
        }
    }
    sum
}

/// Fill one chunk, fold it, repeat.
fn blocking<const N: usize>(
    pair: &mut BufferPair<Fast, N>,
    payload: &Payload,
    passes: u32,
    mut fill: impl FnMut(&[i8; N], &mut ScratchRegion<Fast, N>),
) -> Checksum {
    let (buf, _) = pair.split();
    let mut sum = Checksum::new();
    for _ in 0..passes {
        for (i, chunk) in payload.chunks::<N>().iter().enumerate() {
            fill(chunk, buf);
            sum.fold_windows(buf.as_array(), i * N);
        }
    }
    sum
}

/// The movers of a pipeline: blocking fills go to `fill`, overlapped
/// prefetches to `ahead`. With one engine both roles share it.
enum Lanes<'e, P, A> {
    Split { fill: &'e mut P, ahead: &'e mut A },
    Shared(&'e mut A),
}

impl<'e, P: Prefetch, A: Prefetch> Lanes<'e, P, A> {
    fn split(fill: &'e mut P, ahead: &'e mut A) -> Self {
        Self::Split { fill, ahead }
    }

    fn fill<T: Tier, const N: usize>(&mut self, src: &[i8; N], dst: &mut ScratchRegion<T, N>) {
        match self {
            Self::Split { fill, .. } => fill.fill(src, dst),
            Self::Shared(one) => one.fill(src, dst),
        }
    }

    fn ahead(&mut self) -> &mut A {
        match self {
            Self::Split { ahead, .. } => &mut **ahead,
            Self::Shared(one) => &mut **one,
        }
    }
}

impl<'e, A: Prefetch> Lanes<'e, A, A> {
    fn shared(one: &'e mut A) -> Self {
        Self::Shared(one)
    }
}

/// Prefetch chunk k+1 into `next` while folding chunk k in `current`; swap
/// once the prefetch has landed.
fn double_buffered<P: Prefetch, A: Prefetch, const N: usize>(
    mut lanes: Lanes<'_, P, A>,
    pair: &mut BufferPair<Fast, N>,
    payload: &Payload,
    passes: u32,
) -> Checksum {
    let mut sum = Checksum::new();
    let Some((first, rest)) = payload.chunks::<N>().split_first() else {
        return sum;
    };
    for _ in 0..passes {
        let (mut current, mut next) = pair.split();
        lanes.fill(first, current);
        let mut offset = 0;
        for chunk in rest {
            lanes
                .ahead()
                .prefetch(chunk, next, || sum.fold_windows(current.as_array(), offset));
            mem::swap(&mut current, &mut next);
            offset += N;
        }
        sum.fold_windows(current.as_array(), offset);
    }
    sum
}

/// Prefetch chunk k+1 slow → medium while folding chunk k in `fast`, then
/// relay it medium → fast.
fn relay_pipelined<P: Prefetch, A: Prefetch, const N: usize>(
    mut lanes: Lanes<'_, P, A>,
    medium: &mut ScratchRegion<Medium, N>,
    fast: &mut ScratchRegion<Fast, N>,
    payload: &Payload,
    passes: u32,
) -> Checksum {
    let mut sum = Checksum::new();
    let Some((first, rest)) = payload.chunks::<N>().split_first() else {
        return sum;
    };
    for _ in 0..passes {
        lanes.fill(first, fast);
        let mut offset = 0;
        for chunk in rest {
            lanes
                .ahead()
                .prefetch(chunk, medium, || sum.fold_windows(fast.as_array(), offset));
            lanes.fill(medium.as_array(), fast);
            offset += N;
        }
        sum.fold_windows(fast.as_array(), offset);
    }
    sum
}
