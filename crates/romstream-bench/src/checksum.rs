//! Position-dependent checksum over the streamed bytes.
//!
//! Each 32-byte compute window folds into per-window accumulators that
//! depend on every byte and its global offset, then contributes the low 16
//! bits of their mix to the running total:
//!
//! ```text
//! idx = offset + i, d = data[i] sign-extended to u32 (all wrapping)
//! sum  += d * (idx + 1)              ; > 0xFFFF => sum  % 0x8000 + 1000
//! hash  = hash * 9 + d + idx         ; > 0xFFFF => hash % 0x7FFF + 500
//! idx % 4 == 0 => product = (product * (d + 1)) & 0xFFFF, 0 => 1
//! d > 0 ? sum += idx * 2 : sum -= idx
//! total += (sum ^ hash ^ product) & 0xFFFF
//! ```
//!
//! Windows are always 32 bytes regardless of transfer chunk size, so any
//! strategy that delivers the right bytes in the right order agrees with the
//! oracle.

use crate::payload::Payload;
use romstream_driver::windows;
use std::fmt;

/// Compute window in bytes.
pub const WINDOW: usize = 32;

/// Running checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Checksum(u32);

impl Checksum {
    /// Empty checksum.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Accumulated value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Fold one window whose first byte sits at `global_offset`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fold(&mut self, window: &[i8], global_offset: usize) {
        let mut sum: u32 = 0;
        let mut product: u32 = 1;
        let mut hash: u32 = 0;

        for (i, &byte) in window.iter().enumerate() {
            // offsets are reduced mod 2^32 like every other term
            let idx = (global_offset + i) as u32;
            let d = i32::from(byte).cast_unsigned();

            sum = sum.wrapping_add(d.wrapping_mul(idx.wrapping_add(1)));
            hash = (hash << 3).wrapping_add(hash).wrapping_add(d).wrapping_add(idx);

            if sum > 0xFFFF {
                sum = sum % 0x8000 + 1000;
            }
            if hash > 0xFFFF {
                hash = hash % 0x7FFF + 500;
            }
            if idx & 3 == 0 {
                product = product.wrapping_mul(d.wrapping_add(1)) & 0xFFFF;
                if product == 0 {
                    product = 1;
                }
            }
            if byte > 0 {
                sum = sum.wrapping_add(idx.wrapping_mul(2));
            } else {
                sum = sum.wrapping_sub(idx);
            }
        }

        self.0 = self.0.wrapping_add((sum ^ hash ^ product) & 0xFFFF);
    }

    /// Fold `data` in [`WINDOW`]-byte steps starting at `base_offset`; a
    /// short tail is folded as one final window.
    pub fn fold_windows(&mut self, data: &[i8], base_offset: usize) {
        let mut iter = windows::<WINDOW>(data, base_offset);
        for (offset, window) in iter.by_ref() {
            self.fold(window, offset);
        }
        let (offset, tail) = iter.remainder();
        if !tail.is_empty() {
            self.fold(tail, offset);
        }
    }

    /// Reference value: `passes` plain in-memory folds of `payload`.
    pub fn oracle(payload: &Payload, passes: u32) -> Self {
        let mut checksum = Self::new();
        for _ in 0..passes {
            checksum.fold_windows(payload.as_array(), 0);
        }
        checksum
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
