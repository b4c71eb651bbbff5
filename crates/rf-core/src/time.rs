//! Time-related types for the cooperative frame loop

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Seconds as used by motion and timing code
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Seconds(pub f64);

impl Seconds {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn from_ms(ms: f64) -> Self {
        Self(ms / 1000.0)
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn to_duration(self) -> Duration {
        Duration::from_secs_f64(self.0.max(0.0))
    }
}

impl std::ops::Add for Seconds {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Seconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl From<Seconds> for Duration {
    fn from(s: Seconds) -> Self {
        s.to_duration()
    }
}

/// Monotonic time source snapshotted once per tick.
///
/// `now` is the elapsed time since the clock's origin. `tick` is called at
/// the start of every update with the frame delta.
pub trait Clock {
    fn now(&self) -> Duration;

    fn tick(&mut self, _dt: f64) {}
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when the frame loop says so.
///
/// Deterministic: the same sequence of `tick` calls always yields the same
/// timestamps, which is what tests and the headless simulator want.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    elapsed: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for FrameClock {
    fn now(&self) -> Duration {
        self.elapsed
    }

    fn tick(&mut self, dt: f64) {
        if dt > 0.0 {
            self.elapsed += Duration::from_secs_f64(dt);
        }
    }
}
