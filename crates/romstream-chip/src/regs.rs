//! I/O register map.
//!
//! All addresses are absolute. The I/O block starts at `0x0400_0000`; only
//! the DMA and timer registers used for streaming are modelled.
//!
//! ```text
//! 0x0400_00B0  DMA0SAD / DMA0DAD / DMA0CNT   (12-byte block per channel)
//! 0x0400_00BC  DMA1SAD / DMA1DAD / DMA1CNT
//! 0x0400_00C8  DMA2SAD / DMA2DAD / DMA2CNT
//! 0x0400_00D4  DMA3SAD / DMA3DAD / DMA3CNT
//! 0x0400_0100  TM0CNT_L / TM0CNT_H           (4-byte block per timer)
//! 0x0400_0104  TM1CNT_L / TM1CNT_H
//! 0x0400_0108  TM2CNT_L / TM2CNT_H
//! 0x0400_010C  TM3CNT_L / TM3CNT_H
//! ```

// ── DMA ──────────────────────────────────────────────────────────────────────

/// DMA0 source address register; channels follow at [`DMA_CHANNEL_STRIDE`].
pub const DMA0SAD: usize = 0x0400_00B0;
/// Bytes between consecutive DMA channel register blocks.
pub const DMA_CHANNEL_STRIDE: usize = 0x0C;

/// Source address offset within a channel block (32-bit, write-only).
pub const DMA_SAD: usize = 0x0;
/// Destination address offset within a channel block (32-bit, write-only).
pub const DMA_DAD: usize = 0x4;
/// Count and control offset within a channel block.
///
/// The low half is the unit count, the high half the control bits. Written
/// as one 32-bit word so count and enable land together.
pub const DMA_CNT: usize = 0x8;

/// `DMAxCNT` bit definitions, as seen through a 32-bit access.
pub mod dma_cnt {
    /// Unit count field (low half).
    pub const COUNT_MASK: u32 = 0x0000_FFFF;

    /// Destination address increments after each unit.
    pub const DST_INCREMENT: u32 = 0;
    /// Destination address decrements after each unit.
    pub const DST_DECREMENT: u32 = 1 << 21;
    /// Destination address stays fixed.
    pub const DST_FIXED: u32 = 2 << 21;
    /// Destination increments, reloaded on repeat.
    pub const DST_RELOAD: u32 = 3 << 21;
    /// Destination control field.
    pub const DST_MASK: u32 = 3 << 21;

    /// Source address increments after each unit.
    pub const SRC_INCREMENT: u32 = 0;
    /// Source address decrements after each unit.
    pub const SRC_DECREMENT: u32 = 1 << 23;
    /// Source address stays fixed (fill).
    pub const SRC_FIXED: u32 = 2 << 23;
    /// Source control field.
    pub const SRC_MASK: u32 = 3 << 23;

    /// Restart on every trigger (non-immediate timing only).
    pub const REPEAT: u32 = 1 << 25;
    /// Transfer 32-bit units; clear for 16-bit units.
    pub const WORD_32: u32 = 1 << 26;

    /// Start immediately.
    pub const START_IMMEDIATE: u32 = 0;
    /// Start at vertical blank.
    pub const START_VBLANK: u32 = 1 << 28;
    /// Start at horizontal blank.
    pub const START_HBLANK: u32 = 2 << 28;
    /// Start timing field.
    pub const START_MASK: u32 = 3 << 28;

    /// Raise an interrupt at end of transfer.
    pub const IRQ: u32 = 1 << 30;
    /// Channel enable. Hardware clears it when a non-repeating transfer ends.
    pub const ENABLE: u32 = 1 << 31;
}

// ── Timers ───────────────────────────────────────────────────────────────────

/// TM0 counter/reload register; timers follow at [`TIMER_STRIDE`].
pub const TM0CNT_L: usize = 0x0400_0100;
/// Bytes between consecutive timer register blocks.
pub const TIMER_STRIDE: usize = 0x4;

/// Counter offset within a timer block (16-bit). Reads the live count,
/// writes the reload value latched on enable.
pub const TIMER_COUNT: usize = 0x0;
/// Control offset within a timer block (16-bit).
pub const TIMER_CONTROL: usize = 0x2;

/// `TMxCNT_H` bit definitions.
pub mod tm_cnt {
    /// Prescaler selection field.
    pub const PRESCALER_MASK: u16 = 0b11;
    /// Count up when the previous timer overflows, ignoring the prescaler.
    pub const CASCADE: u16 = 1 << 2;
    /// Raise an interrupt on overflow.
    pub const IRQ: u16 = 1 << 6;
    /// Timer enable.
    pub const ENABLE: u16 = 1 << 7;
}
