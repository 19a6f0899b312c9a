//! Cycle counters.

/// A free-running cycle counter bracketing a measured region.
pub trait CycleCounter {
    /// Reset the count to zero and start counting.
    fn restart(&mut self);

    /// Cycles since the last [`restart`](Self::restart). Frozen after
    /// [`stop`](Self::stop).
    fn elapsed(&self) -> u64;

    /// Stop counting and return the elapsed cycles.
    fn stop(&mut self) -> u64;

    /// CPU clock the counts refer to.
    fn clock_hz(&self) -> u32;
}
