//! CPU clock.

/// CPU clock rate in Hz (2^24).
pub const CPU_HZ: u32 = 16_777_216;

/// Convert a cycle count at `clock_hz` into microseconds.
#[allow(clippy::cast_precision_loss)]
pub fn cycles_to_micros(cycles: u64, clock_hz: u32) -> f64 {
    cycles as f64 * 1e6 / f64::from(clock_hz)
}
