//! Fixed-point requantization.
//!
//! Accumulators are 64-bit. Rescaling multiplies by an integer multiplier
//! and shifts by a per-layer amount:
//!
//! ```text
//! shift > 0   (acc * m + 2^(shift-1)) >> shift     round half up
//! shift = 0   acc * m
//! shift < 0   (acc * m) << -shift                   no rounding
//! ```
//!
//! then saturates to the output type. Saturation is the intended result for
//! out-of-range values, never an error.

/// Clamp to the `i8` range.
pub const fn saturate_i8(value: i64) -> i8 {
    if value > 127 {
        i8::MAX
    } else if value < -128 {
        i8::MIN
    } else {
        #[allow(clippy::cast_possible_truncation)] // range checked above
        let narrowed = value as i8;
        narrowed
    }
}

/// Clamp to the `i32` range.
pub const fn saturate_i32(value: i64) -> i32 {
    if value > 0x7FFF_FFFF {
        i32::MAX
    } else if value < -0x8000_0000 {
        i32::MIN
    } else {
        #[allow(clippy::cast_possible_truncation)] // range checked above
        let narrowed = value as i32;
        narrowed
    }
}

/// Scale `acc` by `multiplier / 2^shift`, round half up, saturate to `i8`.
///
/// Right shifts are capped at 63 and left shifts at 62; a left shift that
/// overflows saturates at the `i64` bounds instead of wrapping.
pub fn requantize(acc: i64, multiplier: i32, shift: i32) -> i8 {
    let scaled = acc.saturating_mul(i64::from(multiplier));
    let shifted = if shift > 0 {
        let s = shift.unsigned_abs().min(63);
        scaled.saturating_add(1i64 << (s - 1)) >> s
    } else if shift < 0 {
        let s = shift.unsigned_abs().min(62);
        scaled.saturating_mul(1i64 << s)
    } else {
        scaled
    };
    saturate_i8(shifted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up() {
        assert_eq!(requantize(3, 1, 1), 2);
        assert_eq!(requantize(2, 1, 1), 1);
        assert_eq!(requantize(1, 1, 1), 1);
        assert_eq!(requantize(-1, 1, 1), 0);
        assert_eq!(requantize(-3, 1, 1), -1);
    }

    #[test]
    fn zero_shift_only_clamps() {
        assert_eq!(requantize(100, 1, 0), 100);
        assert_eq!(requantize(100, 2, 0), 127);
        assert_eq!(requantize(-100, 2, 0), -128);
    }

    #[test]
    fn left_shift_does_not_round() {
        assert_eq!(requantize(3, 1, -2), 12);
        assert_eq!(requantize(-5, 3, -1), -30);
        assert_eq!(requantize(1, 1, -40), 127);
    }

    #[test]
    fn extreme_inputs_saturate() {
        assert_eq!(requantize(i64::MAX, i32::MAX, 0), 127);
        assert_eq!(requantize(i64::MIN, i32::MAX, 0), -128);
        assert_eq!(requantize(i64::MAX, i32::MAX, -62), 127);
        assert_eq!(requantize(1_000_000, 1, 80), 0);
    }

    #[test]
    fn saturating_helpers() {
        assert_eq!(saturate_i8(128), 127);
        assert_eq!(saturate_i8(-129), -128);
        assert_eq!(saturate_i8(-7), -7);
        assert_eq!(saturate_i32(i64::from(i32::MAX) + 1), i32::MAX);
        assert_eq!(saturate_i32(i64::MIN), i32::MIN);
    }
}
