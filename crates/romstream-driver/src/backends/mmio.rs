//! Register-level backends for the handheld target.
//!
//! [`MmioChannel`] programs a DMA channel through its `SAD/DAD/CNT` block and
//! polls the enable bit. [`TimerPair`] cascades two 16-bit timers into one
//! 32-bit tick counter. Both sit on a [`RegisterBlock`], so tests can point
//! them at plain memory instead of the I/O window.

// Target addresses are 32-bit; pointer-to-register casts are exact there.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_ptr_alignment)]

use crate::channel::{TransferChannel, TransferFlags};
use crate::counter::CycleCounter;
use romstream_chip::clock::CPU_HZ;
use romstream_chip::dma::Channel;
use romstream_chip::regs::{self, dma_cnt, tm_cnt};
use romstream_chip::timer::{Prescaler, Timer};
use tracing::debug;

/// A window of memory-mapped registers.
pub struct RegisterBlock {
    ptr: *mut u8,
    size: usize,
}

impl std::fmt::Debug for RegisterBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterBlock")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("size", &self.size)
            .finish()
    }
}

impl RegisterBlock {
    /// Wrap `size` bytes of registers at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be word aligned and valid for volatile reads and writes of
    /// `size` bytes for the lifetime of the block, and nothing else may
    /// access those registers meanwhile.
    pub const unsafe fn from_raw(ptr: *mut u8, size: usize) -> Self {
        Self { ptr, size }
    }

    /// Read a 32-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the block or `offset` is not word aligned.
    pub fn read32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= self.size && offset % 4 == 0, "Register offset out of bounds");
        // SAFETY: read_volatile necessary for MMIO - hardware can change value.
        // Invariants: (1) ptr valid for self.size per from_raw; (2) offset+4 <= size;
        // (3) ptr word aligned and offset % 4 == 0.
        unsafe { std::ptr::read_volatile(self.ptr.add(offset).cast::<u32>()) }
    }

    /// Write a 32-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the block or `offset` is not word aligned.
    pub fn write32(&mut self, offset: usize, value: u32) {
        assert!(offset + 4 <= self.size && offset % 4 == 0, "Register offset out of bounds");
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // Invariants: (1) ptr valid for self.size; (2) offset+4 <= size; (3) aligned.
        unsafe { std::ptr::write_volatile(self.ptr.add(offset).cast::<u32>(), value) }
    }

    /// Read a 16-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 2` exceeds the block or `offset` is odd.
    pub fn read16(&self, offset: usize) -> u16 {
        assert!(offset + 2 <= self.size && offset % 2 == 0, "Register offset out of bounds");
        // SAFETY: as read32, with halfword alignment.
        unsafe { std::ptr::read_volatile(self.ptr.add(offset).cast::<u16>()) }
    }

    /// Write a 16-bit register
    ///
    /// # Panics
    ///
    /// Panics if `offset + 2` exceeds the block or `offset` is odd.
    pub fn write16(&mut self, offset: usize, value: u16) {
        assert!(offset + 2 <= self.size && offset % 2 == 0, "Register offset out of bounds");
        // SAFETY: as write32, with halfword alignment.
        unsafe { std::ptr::write_volatile(self.ptr.add(offset).cast::<u16>(), value) }
    }
}

/// A hardware DMA channel.
#[derive(Debug)]
pub struct MmioChannel {
    id: Channel,
    regs: RegisterBlock,
}

impl MmioChannel {
    /// Size of one channel's register block.
    pub const BLOCK_SIZE: usize = regs::DMA_CHANNEL_STRIDE;

    /// Drive the channel whose `SAD/DAD/CNT` block is `regs`.
    pub fn new(id: Channel, regs: RegisterBlock) -> Self {
        debug!(channel = %id, "MMIO channel attached");
        Self { id, regs }
    }

    /// Take the real register block of `id`.
    ///
    /// # Safety
    ///
    /// Must run on the target, and only once per channel: the returned
    /// value assumes exclusive ownership of the registers.
    pub unsafe fn take(id: Channel) -> Self {
        // SAFETY: the I/O window is always mapped on the target and the
        // caller hands over exclusive use of this channel's block.
        let regs = unsafe { RegisterBlock::from_raw(id.register_base() as *mut u8, Self::BLOCK_SIZE) };
        Self::new(id, regs)
    }
}

impl TransferChannel for MmioChannel {
    fn id(&self) -> Channel {
        self.id
    }

    unsafe fn start(&mut self, src: *const u8, dst: *mut u8, units: u16, flags: TransferFlags) {
        self.regs.write32(regs::DMA_SAD, src as usize as u32);
        self.regs.write32(regs::DMA_DAD, dst as usize as u32);
        self.regs
            .write32(regs::DMA_CNT, u32::from(units) | flags.bits() | dma_cnt::ENABLE);
    }

    fn is_busy(&mut self) -> bool {
        self.regs.read32(regs::DMA_CNT) & dma_cnt::ENABLE != 0
    }
}

/// Two cascaded timers read as one 32-bit tick counter.
///
/// The low timer runs at the prescaled clock, the high one counts its
/// overflows. At [`Prescaler::Div64`] that is ~4.7 hours before wrapping.
#[derive(Debug)]
pub struct TimerPair {
    regs: RegisterBlock,
    prescaler: Prescaler,
    frozen: Option<u64>,
}

const LOW_COUNT: usize = regs::TIMER_COUNT;
const LOW_CONTROL: usize = regs::TIMER_CONTROL;
const HIGH_COUNT: usize = regs::TIMER_STRIDE + regs::TIMER_COUNT;
const HIGH_CONTROL: usize = regs::TIMER_STRIDE + regs::TIMER_CONTROL;

impl TimerPair {
    /// Size of the two timer blocks.
    pub const BLOCK_SIZE: usize = 2 * regs::TIMER_STRIDE;

    /// Counter over the two timer blocks at `regs`.
    pub fn new(regs: RegisterBlock, prescaler: Prescaler) -> Self {
        debug!(?prescaler, "timer pair attached");
        Self {
            regs,
            prescaler,
            frozen: None,
        }
    }

    /// Take the real registers of `low` and its cascade partner.
    ///
    /// Returns `None` for the last timer, which has no partner.
    ///
    /// # Safety
    ///
    /// Must run on the target, and only once per timer pair.
    pub unsafe fn take(low: Timer, prescaler: Prescaler) -> Option<Self> {
        low.cascade_partner()?;
        // SAFETY: the I/O window is always mapped on the target; the two
        // timer blocks are contiguous and handed over by the caller.
        let regs = unsafe { RegisterBlock::from_raw(low.counter_addr() as *mut u8, Self::BLOCK_SIZE) };
        Some(Self::new(regs, prescaler))
    }

    /// Raw 32-bit tick count.
    ///
    /// Re-reads the high half until it is stable across the low read, so a
    /// carry between the two reads is never observed half-applied.
    pub fn ticks(&self) -> u32 {
        loop {
            let high = self.regs.read16(HIGH_COUNT);
            let low = self.regs.read16(LOW_COUNT);
            if self.regs.read16(HIGH_COUNT) == high {
                return (u32::from(high) << 16) | u32::from(low);
            }
        }
    }
}

impl CycleCounter for TimerPair {
    fn restart(&mut self) {
        self.regs.write16(LOW_CONTROL, 0);
        self.regs.write16(HIGH_CONTROL, 0);
        // Reload values, latched into the counters on enable.
        self.regs.write16(LOW_COUNT, 0);
        self.regs.write16(HIGH_COUNT, 0);
        self.regs.write16(HIGH_CONTROL, tm_cnt::ENABLE | tm_cnt::CASCADE);
        self.regs.write16(LOW_CONTROL, tm_cnt::ENABLE | self.prescaler.bits());
        self.frozen = None;
    }

    fn elapsed(&self) -> u64 {
        self.frozen
            .unwrap_or_else(|| u64::from(self.ticks()) * self.prescaler.divisor())
    }

    fn stop(&mut self) -> u64 {
        self.regs.write16(LOW_CONTROL, self.prescaler.bits());
        let cycles = u64::from(self.ticks()) * self.prescaler.divisor();
        self.frozen = Some(cycles);
        cycles
    }

    fn clock_hz(&self) -> u32 {
        CPU_HZ
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{Fast, ScratchRegion};

    fn fake_block(words: &mut [u32]) -> RegisterBlock {
        // SAFETY: `words` outlives every use in these tests and is only
        // touched through the block afterwards.
        unsafe { RegisterBlock::from_raw(words.as_mut_ptr().cast(), words.len() * 4) }
    }

    #[test]
    fn start_programs_sad_dad_cnt() {
        let mut fake = [0u32; 3];
        let mut ch = MmioChannel::new(Channel::Dma3, fake_block(&mut fake));
        // SAFETY: the fake block is plain memory; nothing dereferences
        // the programmed addresses.
        unsafe {
            ch.start(0x0800_0040 as *const u8, 0x0300_0000 as *mut u8, 8, TransferFlags::WORDS);
        }
        assert!(ch.is_busy());
        assert_eq!(ch.regs.read32(regs::DMA_SAD), 0x0800_0040);
        assert_eq!(ch.regs.read32(regs::DMA_DAD), 0x0300_0000);
        assert_eq!(
            ch.regs.read32(regs::DMA_CNT),
            8 | dma_cnt::WORD_32 | dma_cnt::ENABLE
        );
    }

    #[test]
    fn channel_idles_when_enable_clears() {
        let mut fake = [0u32; 3];
        let mut ch = MmioChannel::new(Channel::Dma1, fake_block(&mut fake));
        assert!(!ch.is_busy());
        ch.regs.write32(regs::DMA_CNT, dma_cnt::ENABLE | 4);
        assert!(ch.is_busy());
        ch.regs.write32(regs::DMA_CNT, 4);
        assert!(!ch.is_busy());
    }

    #[test]
    fn overlap_returns_once_hardware_clears_enable() {
        // The fake never clears ENABLE on its own, so clear it from `work`
        // through a second view of the same memory.
        let mut fake = [0u32; 3];
        let base = fake.as_mut_ptr();
        let cnt = base.wrapping_add(2);
        // SAFETY: `fake` outlives the channel and is only reached through `base`.
        let regs = unsafe { RegisterBlock::from_raw(base.cast(), 12) };
        let mut ch = MmioChannel::new(Channel::Dma3, regs);
        let src = [0i8; 16];
        let mut dst = ScratchRegion::<Fast, 16>::new();
        ch.overlap(&src, &mut dst, || {
            // SAFETY: `cnt` points into `fake`, alive for the whole test.
            unsafe { std::ptr::write_volatile(cnt, 0) };
        });
        assert!(!ch.is_busy());
    }

    #[test]
    fn timer_restart_cascades_high_from_low() {
        let mut fake = [0u32; 2];
        let mut timer = TimerPair::new(fake_block(&mut fake), Prescaler::Div64);
        timer.restart();
        assert_eq!(timer.regs.read16(LOW_CONTROL), tm_cnt::ENABLE | 1);
        assert_eq!(timer.regs.read16(HIGH_CONTROL), tm_cnt::ENABLE | tm_cnt::CASCADE);
        assert_eq!(timer.elapsed(), 0);
    }

    #[test]
    fn elapsed_combines_halves_and_scales_by_prescaler() {
        let mut fake = [0u32; 2];
        let mut timer = TimerPair::new(fake_block(&mut fake), Prescaler::Div64);
        timer.restart();
        timer.regs.write16(LOW_COUNT, 0x1234);
        timer.regs.write16(HIGH_COUNT, 0x0002);
        assert_eq!(timer.ticks(), 0x0002_1234);
        let cycles = timer.stop();
        assert_eq!(cycles, 0x0002_1234 * 64);
        assert_eq!(timer.regs.read16(LOW_CONTROL) & tm_cnt::ENABLE, 0);
        timer.regs.write16(LOW_COUNT, 0);
        assert_eq!(timer.elapsed(), cycles, "stopped counter stays frozen");
    }

    #[test]
    fn last_timer_has_no_pair() {
        // SAFETY: returns before touching any register.
        assert!(unsafe { TimerPair::take(Timer::Tm3, Prescaler::Div1) }.is_none());
    }
}
