// SPDX-License-Identifier: AGPL-3.0-only

//! Software backends
//!
//! Host stand-ins for the target's engines, used by the benchmark binary and
//! by every test in the workspace:
//!
//! 1. **[`SimulatedChannel`]**: a DMA channel that lands its data only after
//!    a configurable number of busy polls. At `start` it overwrites the
//!    destination with [`POISON`], so any pipeline that reads a buffer
//!    before polling it idle sees garbage instead of stale-but-plausible
//!    data, and its checksum breaks.
//!
//! 2. **[`WallClock`]**: a [`CycleCounter`] over `std::time::Instant`,
//!    scaled to the target clock so reports read in target cycles.
//!
//! The block-copy stand-in is [`SoftwareBlockCopy`](crate::SoftwareBlockCopy).
//!
//! ## Latency model
//!
//! ```text
//! start()      poison dst, draw N from the latency model
//! is_busy() x N   -> true
//! is_busy()       -> lands src into dst, false
//! ```

use crate::channel::{AddressStep, TransferChannel, TransferFlags};
use crate::counter::CycleCounter;
use romstream_chip::dma::Channel;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Byte written over a destination while its transfer is in flight.
pub const POISON: u8 = 0xA5;

/// How many busy polls a simulated transfer takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Latency {
    /// Land at `start`; never reports busy.
    Immediate,
    /// Report busy for exactly this many polls.
    Fixed(u32),
    /// Report busy for a pseudo-random `0..=max_polls` polls per transfer.
    Random {
        /// Seed of the per-channel generator
        seed: u64,
        /// Upper bound of the draw
        max_polls: u32,
    },
}

impl Default for Latency {
    fn default() -> Self {
        Self::Fixed(4)
    }
}

/// Counters kept by a [`SimulatedChannel`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    /// Transfers started
    pub transfers: u64,
    /// Units landed
    pub units: u64,
    /// `is_busy` calls made while a transfer was pending
    pub polls: u64,
}

#[derive(Debug)]
struct Pending {
    src: *const u8,
    dst: *mut u8,
    units: u16,
    flags: TransferFlags,
    remaining_polls: u32,
}

/// A DMA channel simulated in software.
#[derive(Debug)]
pub struct SimulatedChannel {
    id: Channel,
    latency: Latency,
    rng: u64,
    pending: Option<Pending>,
    stats: ChannelStats,
}

impl SimulatedChannel {
    /// Create a simulated channel standing in for `id`.
    pub fn new(id: Channel, latency: Latency) -> Self {
        let seed = match latency {
            Latency::Random { seed, .. } => seed,
            _ => 0,
        };
        debug!(channel = %id, ?latency, "simulated channel created");
        Self {
            id,
            latency,
            rng: seed | 1,
            pending: None,
            stats: ChannelStats::default(),
        }
    }

    /// Latency model in use.
    pub fn latency(&self) -> Latency {
        self.latency
    }

    /// Transfer statistics so far.
    pub fn stats(&self) -> ChannelStats {
        self.stats
    }

    fn draw_polls(&mut self) -> u32 {
        match self.latency {
            Latency::Immediate => 0,
            Latency::Fixed(polls) => polls,
            Latency::Random { max_polls, .. } => {
                // xorshift64*
                let mut x = self.rng;
                x ^= x >> 12;
                x ^= x << 25;
                x ^= x >> 27;
                self.rng = x;
                let draw = x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 32;
                #[allow(clippy::cast_possible_truncation)] // < max_polls + 1
                let polls = (draw % (u64::from(max_polls) + 1)) as u32;
                polls
            }
        }
    }

    /// Land a pending transfer.
    ///
    /// # Safety
    ///
    /// `pending` must come from a `start` whose contract still holds.
    unsafe fn land(&mut self, pending: &Pending) {
        let unit = pending.flags.unit_bytes();
        for i in 0..usize::from(pending.units) {
            let src = step(pending.src, pending.flags.source_step(), i * unit);
            let dst = step(pending.dst.cast_const(), pending.flags.destination_step(), i * unit);
            // SAFETY: `start`'s contract makes every unit address in range
            // for reads (src) and exclusive writes (dst).
            unsafe { std::ptr::copy(src, dst.cast_mut(), unit) };
        }
        self.stats.units += u64::from(pending.units);
        trace!(channel = %self.id, units = pending.units, "simulated transfer landed");
    }
}

fn step(base: *const u8, step: AddressStep, offset: usize) -> *const u8 {
    match step {
        AddressStep::Increment => base.wrapping_add(offset),
        AddressStep::Decrement => base.wrapping_sub(offset),
        AddressStep::Fixed => base,
    }
}

impl TransferChannel for SimulatedChannel {
    fn id(&self) -> Channel {
        self.id
    }

    unsafe fn start(&mut self, src: *const u8, dst: *mut u8, units: u16, flags: TransferFlags) {
        if let Some(previous) = self.pending.take() {
            // Contract violation, but the hardware would also finish the
            // previous transfer first.
            // SAFETY: the previous start's contract still holds.
            unsafe { self.land(&previous) };
        }
        let unit = flags.unit_bytes();
        for i in 0..usize::from(units) {
            let at = step(dst.cast_const(), flags.destination_step(), i * unit);
            // SAFETY: `dst` is valid for writes of every unit per the contract.
            unsafe { std::ptr::write_bytes(at.cast_mut(), POISON, unit) };
        }
        self.stats.transfers += 1;
        let pending = Pending {
            src,
            dst,
            units,
            flags,
            remaining_polls: self.draw_polls(),
        };
        if matches!(self.latency, Latency::Immediate) {
            // SAFETY: just validated by the caller.
            unsafe { self.land(&pending) };
        } else {
            self.pending = Some(pending);
        }
    }

    fn is_busy(&mut self) -> bool {
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        self.stats.polls += 1;
        if pending.remaining_polls > 0 {
            pending.remaining_polls -= 1;
            return true;
        }
        if let Some(done) = self.pending.take() {
            // SAFETY: the transfer is still pending, so the contract of its
            // `start` holds until this poll reports idle.
            unsafe { self.land(&done) };
        }
        false
    }
}

/// [`CycleCounter`] over the host's monotonic clock.
#[derive(Debug, Clone)]
pub struct WallClock {
    clock_hz: u32,
    started: Option<Instant>,
    frozen: Option<u64>,
}

impl WallClock {
    /// Counter reporting cycles of a `clock_hz` clock.
    pub fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            started: None,
            frozen: None,
        }
    }

    fn to_cycles(&self, elapsed: Duration) -> u64 {
        let cycles = elapsed.as_nanos() * u128::from(self.clock_hz) / 1_000_000_000;
        u64::try_from(cycles).unwrap_or(u64::MAX)
    }
}

impl CycleCounter for WallClock {
    fn restart(&mut self) {
        self.frozen = None;
        self.started = Some(Instant::now());
    }

    fn elapsed(&self) -> u64 {
        self.frozen
            .unwrap_or_else(|| self.started.map_or(0, |t| self.to_cycles(t.elapsed())))
    }

    fn stop(&mut self) -> u64 {
        let cycles = self.elapsed();
        self.frozen = Some(cycles);
        cycles
    }

    fn clock_hz(&self) -> u32 {
        self.clock_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Fast, ScratchRegion};

    fn ramp<const N: usize>() -> [i8; N] {
        std::array::from_fn(|i| (i % 100) as i8)
    }

    #[test]
    fn destination_is_poisoned_until_polled_idle() {
        let src = ramp::<32>();
        let mut dst = ScratchRegion::<Fast, 32>::new();
        let mut ch = SimulatedChannel::new(Channel::Dma1, Latency::Fixed(3));
        // SAFETY: both buffers outlive the transfer, which is polled idle
        // below before they are dropped.
        unsafe { ch.start(src.as_ptr().cast(), dst.as_mut_ptr().cast(), 8, TransferFlags::WORDS) };
        assert!(dst.as_array().iter().all(|&b| b.to_ne_bytes()[0] == POISON));
        assert!(ch.is_busy());
        assert!(ch.is_busy());
        assert!(ch.is_busy());
        assert!(!ch.is_busy());
        assert_eq!(dst.as_array(), &src);
        assert_eq!(ch.stats().polls, 4);
        assert_eq!(ch.stats().units, 8);
    }

    #[test]
    fn immediate_latency_never_reports_busy() {
        let src = ramp::<64>();
        let mut dst = ScratchRegion::<Fast, 64>::new();
        let mut ch = SimulatedChannel::new(Channel::Dma3, Latency::Immediate);
        ch.transfer(&src, &mut dst);
        assert_eq!(dst.as_array(), &src);
        assert_eq!(ch.stats().polls, 0);
    }

    #[test]
    fn overlap_runs_work_while_busy_then_lands() {
        let src = ramp::<32>();
        let mut dst = ScratchRegion::<Fast, 32>::new();
        let mut ch = SimulatedChannel::new(Channel::Dma1, Latency::Fixed(5));
        let seen = ch.overlap(&src, &mut dst, || 7);
        assert_eq!(seen, 7);
        assert_eq!(dst.as_array(), &src);
        assert_eq!(ch.stats().polls, 6);
    }

    #[test]
    fn halfword_fixed_source_fills() {
        let src = [0x11i8, 0x22];
        let mut dst = [0i8; 8];
        let mut ch = SimulatedChannel::new(Channel::Dma3, Latency::Fixed(1));
        let flags = TransferFlags::HALFWORDS.with_fixed_source();
        // SAFETY: src covers one halfword (fixed), dst four halfwords.
        unsafe { ch.start(src.as_ptr().cast(), dst.as_mut_ptr().cast(), 4, flags) };
        ch.wait_until_idle();
        assert_eq!(dst, [0x11, 0x22, 0x11, 0x22, 0x11, 0x22, 0x11, 0x22]);
    }

    #[test]
    fn random_latency_is_bounded_and_reproducible() {
        let draws = |seed| {
            let mut ch = SimulatedChannel::new(Channel::Dma1, Latency::Random { seed, max_polls: 6 });
            (0..64).map(|_| ch.draw_polls()).collect::<Vec<_>>()
        };
        let a = draws(42);
        assert_eq!(a, draws(42));
        assert!(a.iter().all(|&p| p <= 6));
        assert!(a.iter().any(|&p| p != a[0]), "draws should vary");
    }

    #[test]
    fn wall_clock_freezes_on_stop() {
        let mut clock = WallClock::new(romstream_chip::clock::CPU_HZ);
        assert_eq!(clock.elapsed(), 0);
        clock.restart();
        std::thread::sleep(Duration::from_millis(1));
        let cycles = clock.stop();
        assert!(cycles > 0);
        assert_eq!(clock.elapsed(), cycles);
    }
}
