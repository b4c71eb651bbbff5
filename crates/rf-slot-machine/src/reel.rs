//! Reel motion controller
//!
//! Drives a looping reel of length `L` with jerk motion so that it can be
//! told "be at card `n` in exactly `t` seconds, with zero speed" and get
//! there without any instantaneous speed change.

use serde::{Deserialize, Serialize};

use crate::motion::{Motion, SpeedLimitedMotion};

/// Slack when deciding whether the stop instant falls inside a frame
pub const STOP_TIME_TOLERANCE: f64 = 1e-6;

/// Reel lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReelState {
    /// Not moving, never integrates
    Rest,
    /// A new command was issued; the next advance re-derives the stop time
    HadImpact,
    /// Integrating; stops at the instant speed reaches zero
    Moving,
}

/// Speed-limited jerk motion over a looping reel
#[derive(Debug, Clone, PartialEq)]
pub struct ReelMotion {
    motion: SpeedLimitedMotion,
    state: ReelState,
    length: f64,
    preferred_min_speed: f64,
    preferred_max_speed: f64,
    /// Remaining time of the last `stop_in` command
    stop_deadline: Option<f64>,
}

impl ReelMotion {
    /// Reel at rest at position 0
    pub fn new(length: f64) -> Self {
        assert!(length > 0.0, "reel length must be positive");
        Self {
            motion: SpeedLimitedMotion::new(Motion::default(), 0.0, 0.0),
            state: ReelState::Rest,
            length,
            preferred_min_speed: 0.0,
            preferred_max_speed: 0.0,
            stop_deadline: None,
        }
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.motion.motion().position()
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.motion.motion().speed()
    }

    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.motion.motion().acceleration()
    }

    #[inline]
    pub fn jerk(&self) -> f64 {
        self.motion.motion().jerk()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn state(&self) -> ReelState {
        self.state
    }

    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.state == ReelState::Rest
    }

    /// Active `(min, max)` speed bounds
    pub fn speed_bounds(&self) -> (f64, f64) {
        (self.motion.min_speed(), self.motion.max_speed())
    }

    pub fn preferred_min_speed(&self) -> f64 {
        self.preferred_min_speed
    }

    pub fn preferred_max_speed(&self) -> f64 {
        self.preferred_max_speed
    }

    /// Preferred lower bound, applied by [`Self::slow_to_minimal_in`]
    pub fn set_min_speed(&mut self, speed: f64) {
        self.preferred_min_speed = speed;
    }

    /// Preferred upper bound, applied by [`Self::go_full_speed_in`]
    pub fn set_max_speed(&mut self, speed: f64) {
        self.preferred_max_speed = speed;
    }

    /// Change the reel length, re-wrapping the position
    pub fn set_reel_length(&mut self, length: f64) {
        assert!(length > 0.0, "reel length must be positive");
        self.length = length;
        self.wrap_position();
    }

    /// Place the reel at `position` (wrapped) without changing its motion
    pub fn set_position(&mut self, position: f64) {
        self.motion.motion_mut().set_position(position);
        self.wrap_position();
    }

    /// Stop exactly at `end` after `time` seconds
    ///
    /// Picks the fewest extra rotations that keep the speed non-negative
    /// over the whole stop.
    pub fn stop_in(&mut self, end: f64, time: f64) {
        assert!(time != 0.0, "stop time must be non-zero");
        assert!(end <= self.length, "stop position {end} beyond reel length {}", self.length);

        let speed = self.speed();
        let start = self.position();
        let length = self.length;

        let rotations = ((speed * time / 3.0 + start - end) / length).ceil().max(0.0);
        let jerk = 12.0 * (start - end - rotations * length + speed * time / 2.0) / time.powi(3);
        let acceleration = -speed / time - jerk * time / 2.0;

        log::debug!(
            "Reel stop_in: {start:.3} -> {end} in {time:.3}s \
             ({rotations} rotations, a={acceleration:.3}, j={jerk:.3})"
        );

        let motion = self.motion.motion_mut();
        motion.set_acceleration(acceleration);
        motion.set_jerk(jerk);
        self.motion.set_bounds(0.0, f64::INFINITY);
        self.stop_deadline = Some(time);
        self.state = ReelState::HadImpact;
    }

    /// Reach the preferred max speed after `time` seconds, then cruise
    ///
    /// From above the target the reel coasts down freely and the target
    /// becomes its floor, so it settles there instead of snapping to it.
    pub fn go_full_speed_in(&mut self, time: f64) {
        let max = self.preferred_max_speed;
        if self.speed() > max {
            self.motion.set_bounds(max, f64::INFINITY);
        } else {
            self.motion.set_max_speed(max);
        }

        let acceleration = self.motion.motion().acceleration_to_speed(max, time);
        let motion = self.motion.motion_mut();
        motion.set_acceleration(acceleration);
        motion.set_jerk(0.0);

        log::debug!("Reel go_full_speed_in: {max:.3} in {time:.3}s");

        self.stop_deadline = None;
        self.state = ReelState::HadImpact;
    }

    /// Reach the preferred min speed after `time` seconds, then crawl
    ///
    /// From below the target the reel speeds up freely and the target
    /// becomes its ceiling.
    pub fn slow_to_minimal_in(&mut self, time: f64) {
        let min = self.preferred_min_speed;
        if self.speed() < min {
            self.motion.set_bounds(0.0, min);
        } else {
            self.motion.set_min_speed(min);
        }

        let acceleration = self.motion.motion().acceleration_to_speed(min, time);
        let motion = self.motion.motion_mut();
        motion.set_acceleration(acceleration);
        motion.set_jerk(0.0);

        log::debug!("Reel slow_to_minimal_in: {min:.3} in {time:.3}s");

        self.stop_deadline = None;
    }

    /// Advance the reel by `dt` seconds
    pub fn advance(&mut self, dt: f64) {
        if dt == 0.0 {
            return;
        }

        let stop_time = match self.state {
            ReelState::Rest => return,
            ReelState::HadImpact => {
                self.state = ReelState::Moving;
                self.time_to_stop(true)
            }
            ReelState::Moving => self.time_to_stop(false),
        };

        if stop_time <= dt + STOP_TIME_TOLERANCE {
            self.motion.advance(stop_time);
            self.full_stop();
        } else {
            self.motion.advance(dt);
            if let Some(deadline) = self.stop_deadline.as_mut() {
                *deadline -= dt;
            }
            if self.motion.max_speed() <= 0.0 {
                self.full_stop();
            }
        }

        self.wrap_position();
    }

    /// Time until speed hits zero under the current command
    ///
    /// A fresh command issued at rest has a root at `t = 0`; `fresh` skips it.
    fn time_to_stop(&self, fresh: bool) -> f64 {
        let natural = if self.motion.min_speed() > 0.0 {
            f64::INFINITY
        } else if fresh {
            let (first, second) = self.motion.motion().time_to_speed_both(0.0);
            if first == 0.0 { second } else { first }
        } else {
            self.motion.motion().time_to_speed(0.0)
        };

        match self.stop_deadline {
            Some(deadline) => natural.min(deadline.max(0.0)),
            None => natural,
        }
    }

    /// Zero the motion and snap to the nearest card
    pub fn full_stop(&mut self) {
        let motion = self.motion.motion_mut();
        motion.set_speed(0.0);
        motion.set_acceleration(0.0);
        motion.set_jerk(0.0);
        let snapped = motion.position().round();
        motion.set_position(snapped);

        self.stop_deadline = None;
        self.state = ReelState::Rest;
        self.wrap_position();
    }

    fn wrap_position(&mut self) {
        let position = self.position();
        if position >= self.length || position < 0.0 {
            let rotations = (position / self.length).floor();
            self.motion
                .motion_mut()
                .set_position(position - rotations * self.length);
        }
    }
}
