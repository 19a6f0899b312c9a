//! BIOS calls used for block copies.
//!
//! `CpuFastSet` copies (or fills) memory in 8-word bursts using `LDMIA/STMIA`.
//! Arguments go in `r0` (source), `r1` (destination) and `r2` (control);
//! `r0`-`r3` are clobbered.
//!
//! ```text
//! r2 bits  0-20  word count (rounded up to a multiple of 8 by the BIOS)
//! r2 bit   24    fill: repeat the word at r0 instead of copying
//! ```
//!
//! Both addresses must be word aligned.

/// Software interrupt number of `CpuFastSet`.
pub const SWI_CPU_FAST_SET: u8 = 0x0C;

/// Bytes moved per `CpuFastSet` burst.
pub const FAST_SET_BLOCK_BYTES: usize = 32;

/// `CpuFastSet` control word bits.
pub mod fast_set {
    /// Word count field.
    pub const WORD_COUNT_MASK: u32 = 0x001F_FFFF;
    /// Fill mode. Clear for a copy.
    pub const FILL: u32 = 1 << 24;
}

/// Control word for copying `bytes` bytes.
///
/// Returns `None` when `bytes` is not a whole number of bursts or does not
/// fit the count field.
pub const fn fast_copy_control(bytes: usize) -> Option<u32> {
    if bytes == 0 || bytes % FAST_SET_BLOCK_BYTES != 0 {
        return None;
    }
    let words = bytes / 4;
    if words > fast_set::WORD_COUNT_MASK as usize {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)] // bounded by WORD_COUNT_MASK
    let words = words as u32;
    Some(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_control_has_no_fill_bit() {
        assert_eq!(fast_copy_control(32), Some(8));
        assert_eq!(fast_copy_control(512), Some(128));
        assert_eq!(fast_copy_control(512).map(|c| c & fast_set::FILL), Some(0));
    }

    #[test]
    fn partial_bursts_are_rejected() {
        assert_eq!(fast_copy_control(0), None);
        assert_eq!(fast_copy_control(36), None);
    }
}
