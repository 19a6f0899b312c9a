//! Bulk transfer channels.
//!
//! A [`TransferChannel`] mirrors a DMA channel: program source, destination
//! and control, then poll until the hardware drops its enable bit. The raw
//! [`TransferChannel::start`] is `unsafe`; the provided [`overlap`] and
//! [`transfer`] methods are the safe surface and encode the one rule that
//! matters for double buffering:
//!
//! ```text
//! overlap(src, dst, work)
//!   wait_until_idle()      previous transfer can no longer touch anything
//!   start(src -> dst)      dst is exclusively borrowed from here ...
//!   work()                 ... so work() cannot name it
//!   wait_until_idle()      ... until the channel reports quiescence
//! ```
//!
//! The final wait also runs when `work` panics, so a region is never
//! released while the engine may still write to it.
//!
//! [`overlap`]: TransferChannel::overlap
//! [`transfer`]: TransferChannel::transfer

use crate::region::{ScratchRegion, Tier};
use romstream_chip::dma::{self, Channel};
use romstream_chip::regs::dma_cnt;

/// Control bits of a transfer, excluding the unit count and enable bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferFlags(u32);

/// Address update after each unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressStep {
    /// Advance by one unit.
    Increment,
    /// Go back by one unit.
    Decrement,
    /// Stay on the same address.
    Fixed,
}

impl TransferFlags {
    /// 32-bit units, incrementing source and destination.
    pub const WORDS: Self = Self(dma_cnt::WORD_32 | dma_cnt::SRC_INCREMENT | dma_cnt::DST_INCREMENT);
    /// 16-bit units, incrementing source and destination.
    pub const HALFWORDS: Self = Self(dma_cnt::SRC_INCREMENT | dma_cnt::DST_INCREMENT);

    const VALID: u32 = dma_cnt::DST_MASK | dma_cnt::SRC_MASK | dma_cnt::WORD_32 | dma_cnt::IRQ;

    /// Flags from raw control bits. Count, enable, repeat and start-timing
    /// bits are dropped: transfers always start immediately.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & Self::VALID)
    }

    /// Raw control bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Keep the source address fixed, filling the destination with one unit.
    #[must_use]
    pub const fn with_fixed_source(self) -> Self {
        Self((self.0 & !dma_cnt::SRC_MASK) | dma_cnt::SRC_FIXED)
    }

    /// Bytes per unit.
    pub const fn unit_bytes(self) -> usize {
        if self.0 & dma_cnt::WORD_32 == 0 {
            2
        } else {
            4
        }
    }

    /// Source address update.
    pub const fn source_step(self) -> AddressStep {
        match self.0 & dma_cnt::SRC_MASK {
            dma_cnt::SRC_DECREMENT => AddressStep::Decrement,
            dma_cnt::SRC_FIXED => AddressStep::Fixed,
            _ => AddressStep::Increment,
        }
    }

    /// Destination address update. Reload counts as increment.
    pub const fn destination_step(self) -> AddressStep {
        match self.0 & dma_cnt::DST_MASK {
            dma_cnt::DST_DECREMENT => AddressStep::Decrement,
            dma_cnt::DST_FIXED => AddressStep::Fixed,
            _ => AddressStep::Increment,
        }
    }
}

/// Compile-time geometry of a whole-word transfer of `N` bytes.
struct WordTransfer<const N: usize>;

impl<const N: usize> WordTransfer<N> {
    #[allow(clippy::cast_possible_truncation)] // bounded by the assertion
    const UNITS: u16 = {
        assert!(N > 0 && N % 4 == 0, "transfer length must be a non-zero multiple of 4 bytes");
        assert!(
            N / 4 <= dma::MAX_UNITS_ANY_CHANNEL as usize,
            "transfer length exceeds the channel count register"
        );
        (N / 4) as u16
    };
}

/// A bulk transfer engine that runs concurrently with the CPU.
pub trait TransferChannel {
    /// Hardware channel this engine drives, or models.
    fn id(&self) -> Channel;

    /// Program and enable a transfer of `units` units. Returns immediately.
    ///
    /// # Safety
    ///
    /// - `src` must be valid for reads and `dst` valid for writes of
    ///   `units * flags.unit_bytes()` bytes, following the address steps in
    ///   `flags`, until [`is_busy`](Self::is_busy) has returned `false`.
    /// - Nothing else may access the destination bytes in that window.
    /// - The channel must be idle.
    /// - `units` must be non-zero and at most `self.id().max_units()`.
    unsafe fn start(&mut self, src: *const u8, dst: *mut u8, units: u16, flags: TransferFlags);

    /// Whether the last started transfer is still running.
    fn is_busy(&mut self) -> bool;

    /// Poll until the channel is idle. Unbounded.
    fn wait_until_idle(&mut self) {
        while self.is_busy() {
            std::hint::spin_loop();
        }
    }

    /// Start filling `dst` from `src`, run `work`, then poll until the
    /// transfer has landed.
    fn overlap<T: Tier, const N: usize, R>(
        &mut self,
        src: &[i8; N],
        dst: &mut ScratchRegion<T, N>,
        work: impl FnOnce() -> R,
    ) -> R
    where
        Self: Sized,
    {
        let units = WordTransfer::<N>::UNITS;
        self.wait_until_idle();
        // SAFETY: `src` and `dst` are borrowed for the whole call, both are
        // `N` bytes and `N == units * 4`. The channel is idle. `Quiesce`
        // polls it idle again before either borrow ends, on unwind too, so
        // `dst` is not reachable by anything but the engine meanwhile.
        unsafe {
            self.start(src.as_ptr().cast(), dst.as_mut_ptr().cast(), units, TransferFlags::WORDS);
        }
        let guard = Quiesce(self);
        let out = work();
        drop(guard);
        out
    }

    /// Copy `src` into `dst` and wait for it.
    fn transfer<T: Tier, const N: usize>(&mut self, src: &[i8; N], dst: &mut ScratchRegion<T, N>)
    where
        Self: Sized,
    {
        self.overlap(src, dst, || ());
    }
}

/// Blocks until the channel is idle when dropped.
struct Quiesce<'c, C: TransferChannel>(&'c mut C);

impl<C: TransferChannel> Drop for Quiesce<'_, C> {
    fn drop(&mut self) {
        self.0.wait_until_idle();
    }
}

/// Something that can fill a scratch region ahead of compute.
///
/// Implemented by every [`TransferChannel`] (asynchronously, through
/// [`TransferChannel::overlap`]) and by
/// [`FillAhead`](crate::block_copy::FillAhead) around a block-copy engine
/// (synchronously, before `work` runs). Pipelines written against this trait
/// work with either.
pub trait Prefetch {
    /// Fill `dst` from `src` while (or before) running `work`; `dst` holds
    /// `src` when this returns.
    fn prefetch<T: Tier, const N: usize, R>(
        &mut self,
        src: &[i8; N],
        dst: &mut ScratchRegion<T, N>,
        work: impl FnOnce() -> R,
    ) -> R;

    /// Fill `dst` from `src` and return.
    fn fill<T: Tier, const N: usize>(&mut self, src: &[i8; N], dst: &mut ScratchRegion<T, N>) {
        self.prefetch(src, dst, || ());
    }
}

impl<C: TransferChannel> Prefetch for C {
    fn prefetch<T: Tier, const N: usize, R>(
        &mut self,
        src: &[i8; N],
        dst: &mut ScratchRegion<T, N>,
        work: impl FnOnce() -> R,
    ) -> R {
        self.overlap(src, dst, work)
    }
}
