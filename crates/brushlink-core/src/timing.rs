//! Simulated-time rate limiting.
//!
//! Both engines gate their expensive work behind a [`RateLimiter`]. Time is
//! fed in as per-tick deltas, so tests drive it without a clock.

use std::time::Duration;

/// Accumulator-based rate limiter.
///
/// Each tick adds its delta to an accumulator. Work is admitted once the
/// accumulator exceeds the interval, which then resets to zero. Rejected
/// ticks keep what they accumulated.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimiter {
    interval: Duration,
    elapsed: Duration,
    primed: bool,
}

impl RateLimiter {
    /// Limiter admitting at most `rate_hz` cycles per simulated second.
    ///
    /// A non-positive or non-finite rate admits every tick.
    pub fn from_rate(rate_hz: f32) -> Self {
        let interval = if rate_hz.is_finite() && rate_hz > 0.0 {
            Duration::from_secs_f32(1.0 / rate_hz)
        } else {
            Duration::ZERO
        };
        Self::new(interval)
    }

    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            primed: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time accumulated since the last admitted cycle.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Advances by `dt` and reports whether a cycle is admitted.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.primed {
            self.primed = false;
            self.elapsed = Duration::ZERO;
            return true;
        }
        if self.elapsed > self.interval || self.interval.is_zero() {
            self.elapsed = Duration::ZERO;
            return true;
        }
        false
    }

    /// Admits the next tick regardless of accumulated time.
    pub fn prime(&mut self) {
        self.primed = true;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.primed = false;
    }
}
