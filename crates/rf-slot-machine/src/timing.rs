//! Timing profiles and the postponed-event queue

use std::time::Duration;

use serde::{Deserialize, Serialize};

use rf_core::{Seconds, SlotError, SlotResult};

/// Timing profile for a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal gameplay timing
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (short spins for testing)
    Studio,
    /// Custom timing
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// Closed interval a random duration is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub min: Seconds,
    pub max: Seconds,
}

impl TimeRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min: Seconds(min),
            max: Seconds(max),
        }
    }

    fn validate(&self, name: &str) -> SlotResult<()> {
        let ordered = self.min.0 > 0.0 && self.max >= self.min;
        if !ordered || !self.max.0.is_finite() {
            return Err(SlotError::InvalidConfig(format!(
                "{name}: expected 0 < min <= max, got [{}, {}]",
                self.min.0, self.max.0
            )));
        }
        Ok(())
    }

    fn scaled(&self, factor: f64) -> Self {
        Self::new(self.min.0 * factor, self.max.0 * factor)
    }
}

/// Durations driving the game controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Profile type
    pub profile: TimingProfile,

    /// Time for a reel to reach full speed
    pub speed_up: TimeRange,

    /// Spin time before the stop control is enabled
    pub min_spin: Seconds,

    /// Spin time after which the reels stop on their own
    pub max_spin: Seconds,

    /// Time for a reel to come to rest
    pub stop: TimeRange,

    /// How long a result stays on screen
    pub result_show: Seconds,

    /// Pause before an automatic respin
    pub auto_spin_delay: Seconds,

    /// Stop duration used when a row is injected
    pub test_stop: Seconds,
}

impl TimingConfig {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            speed_up: TimeRange::new(3.0, 6.0),
            min_spin: Seconds(3.0),
            max_spin: Seconds(6.0),
            stop: TimeRange::new(3.0, 6.0),
            result_show: Seconds(2.0),
            auto_spin_delay: Seconds(0.5),
            test_stop: Seconds(1.0),
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            speed_up: TimeRange::new(1.0, 2.0),
            min_spin: Seconds(1.0),
            max_spin: Seconds(2.0),
            stop: TimeRange::new(1.0, 2.0),
            result_show: Seconds(1.0),
            auto_spin_delay: Seconds(0.25),
            test_stop: Seconds(0.5),
        }
    }

    /// Studio mode (short, tight ranges for automated runs)
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            speed_up: TimeRange::new(0.5, 0.75),
            min_spin: Seconds(0.5),
            max_spin: Seconds(1.0),
            stop: TimeRange::new(0.5, 1.0),
            result_show: Seconds(0.5),
            auto_spin_delay: Seconds(0.1),
            test_stop: Seconds(0.25),
        }
    }

    /// Get config for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale timing by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |s: Seconds| Seconds(s.0 * factor);
        Self {
            profile: TimingProfile::Custom,
            speed_up: self.speed_up.scaled(factor),
            min_spin: scale(self.min_spin),
            max_spin: scale(self.max_spin),
            stop: self.stop.scaled(factor),
            result_show: scale(self.result_show),
            auto_spin_delay: scale(self.auto_spin_delay),
            test_stop: scale(self.test_stop),
        }
    }

    /// Window in which the stop control is enabled
    pub fn stop_wait(&self) -> Seconds {
        self.max_spin - self.min_spin
    }

    pub fn validate(&self) -> SlotResult<()> {
        self.speed_up.validate("speed_up")?;
        self.stop.validate("stop")?;

        if self.max_spin < self.min_spin {
            return Err(SlotError::InvalidConfig(format!(
                "max_spin ({}) is shorter than min_spin ({})",
                self.max_spin.0, self.min_spin.0
            )));
        }
        for (name, value) in [
            ("min_spin", self.min_spin),
            ("result_show", self.result_show),
            ("auto_spin_delay", self.auto_spin_delay),
            ("test_stop", self.test_stop),
        ] {
            if value.0 < 0.0 || !value.0.is_finite() {
                return Err(SlotError::InvalidConfig(format!(
                    "{name} must be >= 0, got {}",
                    value.0
                )));
            }
        }
        if self.test_stop.0 <= 0.0 {
            return Err(SlotError::InvalidConfig("test_stop must be positive".into()));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::normal()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// POSTPONED EVENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// An event due at an absolute clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostponedEvent<E> {
    pub expires_at: Duration,
    pub event: E,
}

impl<E> PostponedEvent<E> {
    pub fn is_expired(&self, now: Duration) -> bool {
        now >= self.expires_at
    }
}

/// Pending timers, checked once per tick
///
/// Unordered; expired entries are handed out in the order they were
/// scheduled and removed.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    pending: Vec<PostponedEvent<E>>,
}

impl<E: Copy> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Fire `event` once `after` has elapsed from `now`
    pub fn schedule(&mut self, now: Duration, after: Seconds, event: E) {
        self.pending.push(PostponedEvent {
            expires_at: now + after.to_duration(),
            event,
        });
    }

    /// Remove and return every event due at `now`
    pub fn take_expired(&mut self, now: Duration) -> Vec<E> {
        let mut expired = Vec::new();
        self.pending.retain(|pe| {
            if pe.is_expired(now) {
                expired.push(pe.event);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Drop all pending events unrun
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<E: Copy> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
