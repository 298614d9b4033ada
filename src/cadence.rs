//! Fixed-cadence cycle gate.
//!
//! Polled from a free running loop. Fires at most once per period and never blocks.

use fugit::{MillisDurationU32, TimerInstantU32};

/// Millisecond timestamps from the system monotonic.
pub type Instant = TimerInstantU32<1_000>;

#[derive(Copy, Clone, Debug)]
pub struct Cadence {
    period: MillisDurationU32,
    last: Instant,
}

impl Cadence {
    /// The first cycle fires one period after `start`.
    pub fn new(period: MillisDurationU32, start: Instant) -> Self {
        Self {
            period,
            last: start,
        }
    }

    pub fn period(&self) -> MillisDurationU32 {
        self.period
    }

    /// Check for a cycle boundary at `now`. Returns true and restarts the period once at least
    /// one period has elapsed since the last boundary.
    ///
    /// Elapsed time is computed modulo the counter width so a wrapping clock is fine as long as
    /// the loop polls more often than once per wrap.
    pub fn poll(&mut self, now: Instant) -> bool {
        let elapsed = now.ticks().wrapping_sub(self.last.ticks());
        if elapsed < self.period.ticks() {
            return false;
        }
        self.last = now;
        true
    }
}
