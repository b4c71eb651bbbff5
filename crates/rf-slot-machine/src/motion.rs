//! Kinematic motion model
//!
//! One-dimensional polynomial motion up to third order (jerk), advanced
//! exactly in closed form. [`SpeedLimitedMotion`] clamps the speed between
//! two bounds while still following the true quadratic speed curve, so a
//! reel can ramp up to a cruise speed and coast there without drifting.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// ORDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Highest derivative a motion carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionOrder {
    /// Position only
    Stationary = 0,
    /// Position + speed
    Uniform = 1,
    /// Position + speed + acceleration
    Accelerated = 2,
    /// Position + speed + acceleration + jerk
    Jerked = 3,
}

impl MotionOrder {
    #[inline]
    fn has(self, component: usize) -> bool {
        component <= self as usize
    }
}

const POSITION: usize = 0;
const SPEED: usize = 1;
const ACCELERATION: usize = 2;
const JERK: usize = 3;

// ═══════════════════════════════════════════════════════════════════════════════
// QUADRATIC SOLVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Real roots of `a·x² + b·x + c = 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuadraticRoots {
    /// No real solution
    None,
    /// Single solution (linear equation or double root)
    One(f64),
    /// Two distinct solutions, ascending
    Two(f64, f64),
    /// Every x is a solution (`0 = 0`)
    All,
}

/// Solve `a·x² + b·x + c = 0`, degrading to the linear case when `a == 0`
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> QuadraticRoots {
    if a == 0.0 {
        if b == 0.0 {
            return if c == 0.0 {
                QuadraticRoots::All
            } else {
                QuadraticRoots::None
            };
        }
        return QuadraticRoots::One(-c / b);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 || !discriminant.is_finite() {
        return QuadraticRoots::None;
    }
    if discriminant == 0.0 {
        return QuadraticRoots::One(-b / (2.0 * a));
    }

    // Cancellation-free form; q != 0 since the discriminant is positive
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let (x1, x2) = (q / a, c / q);

    if x1 <= x2 {
        QuadraticRoots::Two(x1, x2)
    } else {
        QuadraticRoots::Two(x2, x1)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MOTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Polynomial motion of fixed order
///
/// Components above the order always read as zero; setting them is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    order: MotionOrder,
    components: [f64; 4],
}

impl Motion {
    fn with_order(order: MotionOrder) -> Self {
        Self {
            order,
            components: [0.0; 4],
        }
    }

    /// Motion that never moves
    pub fn stationary(position: f64) -> Self {
        let mut motion = Self::with_order(MotionOrder::Stationary);
        motion.components[POSITION] = position;
        motion
    }

    /// Constant speed
    pub fn uniform(position: f64, speed: f64) -> Self {
        let mut motion = Self::with_order(MotionOrder::Uniform);
        motion.components[POSITION] = position;
        motion.components[SPEED] = speed;
        motion
    }

    /// Constant acceleration
    pub fn accelerated(position: f64, speed: f64, acceleration: f64) -> Self {
        let mut motion = Self::with_order(MotionOrder::Accelerated);
        motion.components = [position, speed, acceleration, 0.0];
        motion
    }

    /// Constant jerk
    pub fn jerked(position: f64, speed: f64, acceleration: f64, jerk: f64) -> Self {
        Self {
            order: MotionOrder::Jerked,
            components: [position, speed, acceleration, jerk],
        }
    }

    #[inline]
    pub fn order(&self) -> MotionOrder {
        self.order
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.components[POSITION]
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.components[SPEED]
    }

    #[inline]
    pub fn acceleration(&self) -> f64 {
        self.components[ACCELERATION]
    }

    #[inline]
    pub fn jerk(&self) -> f64 {
        self.components[JERK]
    }

    fn set(&mut self, component: usize, value: f64) {
        if self.order.has(component) {
            self.components[component] = value;
        }
    }

    pub fn set_position(&mut self, position: f64) {
        self.set(POSITION, position);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.set(SPEED, speed);
    }

    pub fn set_acceleration(&mut self, acceleration: f64) {
        self.set(ACCELERATION, acceleration);
    }

    pub fn set_jerk(&mut self, jerk: f64) {
        self.set(JERK, jerk);
    }

    /// Advance by `dt` seconds using the exact Taylor expansion
    pub fn advance(&mut self, dt: f64) {
        if dt == 0.0 {
            return;
        }
        let [s, v, a, j] = self.components;
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;

        self.components[POSITION] = s + v * dt + a * dt2 / 2.0 + j * dt3 / 6.0;
        self.set(SPEED, v + a * dt + j * dt2 / 2.0);
        self.set(ACCELERATION, a + j * dt);
    }

    /// Speed `t` seconds from now, without advancing
    #[inline]
    pub fn speed_after(&self, t: f64) -> f64 {
        self.speed() + self.acceleration() * t + self.jerk() * t * t / 2.0
    }

    /// Position `t` seconds from now, without advancing
    #[inline]
    pub fn position_after(&self, t: f64) -> f64 {
        let t2 = t * t;
        self.position()
            + self.speed() * t
            + self.acceleration() * t2 / 2.0
            + self.jerk() * t2 * t / 6.0
    }

    /// Smallest non-negative time at which speed equals `target`
    ///
    /// Returns `f64::INFINITY` when the speed never gets there.
    pub fn time_to_speed(&self, target: f64) -> f64 {
        self.time_to_speed_both(target).0
    }

    /// Both non-negative times at which speed equals `target`, ascending
    ///
    /// Missing solutions are `f64::INFINITY`. Only jerked motion can report
    /// a finite second time.
    pub fn time_to_speed_both(&self, target: f64) -> (f64, f64) {
        if !target.is_finite() {
            return (f64::INFINITY, f64::INFINITY);
        }

        let roots = solve_quadratic(
            self.jerk() / 2.0,
            self.acceleration(),
            self.speed() - target,
        );

        match roots {
            QuadraticRoots::None => (f64::INFINITY, f64::INFINITY),
            QuadraticRoots::All => (0.0, f64::INFINITY),
            QuadraticRoots::One(t) if t >= 0.0 => (t, f64::INFINITY),
            QuadraticRoots::One(_) => (f64::INFINITY, f64::INFINITY),
            QuadraticRoots::Two(t1, t2) => match (t1 >= 0.0, t2 >= 0.0) {
                (true, true) => (t1, t2),
                (false, true) => (t2, f64::INFINITY),
                _ => (f64::INFINITY, f64::INFINITY),
            },
        }
    }

    /// Constant acceleration that reaches `end` position after `time`
    pub fn acceleration_to_position(&self, end: f64, time: f64) -> f64 {
        assert!(time != 0.0, "time must be non-zero");
        2.0 * (end - self.position() - self.speed() * time) / (time * time)
    }

    /// Constant acceleration that reaches `speed` after `time`
    pub fn acceleration_to_speed(&self, speed: f64, time: f64) -> f64 {
        assert!(time != 0.0, "time must be non-zero");
        (speed - self.speed()) / time
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self::jerked(0.0, 0.0, 0.0, 0.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPEED-LIMITED MOTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Min,
    Max,
}

/// Motion whose speed is clamped to `[min_speed, max_speed]`
///
/// While the free trajectory would leave the band, speed is held at the
/// bound and the motion advances uniformly; acceleration keeps evolving by
/// jerk so the trajectory re-enters the band exactly where the unclamped
/// parabola does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimitedMotion {
    motion: Motion,
    min_speed: f64,
    max_speed: f64,
}

impl SpeedLimitedMotion {
    /// Wrap an accelerated or jerked motion
    pub fn new(motion: Motion, min_speed: f64, max_speed: f64) -> Self {
        assert!(
            motion.order() >= MotionOrder::Accelerated,
            "speed limiting needs at least accelerated motion"
        );
        Self {
            motion,
            min_speed,
            max_speed,
        }
    }

    #[inline]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    #[inline]
    pub fn motion_mut(&mut self) -> &mut Motion {
        &mut self.motion
    }

    #[inline]
    pub fn min_speed(&self) -> f64 {
        self.min_speed
    }

    #[inline]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn set_min_speed(&mut self, speed: f64) {
        self.min_speed = speed;
    }

    pub fn set_max_speed(&mut self, speed: f64) {
        self.max_speed = speed;
    }

    pub fn set_bounds(&mut self, min_speed: f64, max_speed: f64) {
        self.min_speed = min_speed;
        self.max_speed = max_speed;
    }

    /// Speed sits on (or outside) one of the bounds
    pub fn limit_reached(&self) -> bool {
        let speed = self.motion.speed();
        speed >= self.max_speed || speed <= self.min_speed
    }

    fn bound_value(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Min => self.min_speed,
            Bound::Max => self.max_speed,
        }
    }

    /// Advance by `dt`, integrating piecewise between bound crossings
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        let mut crossings: Vec<(f64, Bound)> = Vec::with_capacity(4);
        for bound in [Bound::Min, Bound::Max] {
            let (t1, t2) = self.motion.time_to_speed_both(self.bound_value(bound));
            for t in [t1, t2] {
                if t > 0.0 && t < dt {
                    crossings.push((t, bound));
                }
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut elapsed = 0.0;
        for (at, bound) in crossings {
            self.advance_segment(at - elapsed);
            elapsed = at;
            self.motion.set_speed(self.bound_value(bound));
        }
        self.advance_segment(dt - elapsed);
    }

    /// Advance a span that contains no bound crossing
    fn advance_segment(&mut self, span: f64) {
        if span <= 0.0 {
            return;
        }
        // The span has a single regime; its midpoint tells which
        let midpoint = self.motion.speed_after(span / 2.0);
        if midpoint > self.max_speed {
            self.hold_at(self.max_speed, span);
        } else if midpoint < self.min_speed {
            self.hold_at(self.min_speed, span);
        } else {
            self.motion.advance(span);
        }
    }

    /// Uniform advance at a clamped speed
    fn hold_at(&mut self, speed: f64, span: f64) {
        let position = self.motion.position() + speed * span;
        let acceleration = self.motion.acceleration() + self.motion.jerk() * span;
        self.motion.set_position(position);
        self.motion.set_speed(speed);
        self.motion.set_acceleration(acceleration);
    }
}
