//! Motion and scoring properties checked across many inputs

use approx::assert_abs_diff_eq;

use rf_slot_machine::{
    Motion, PayoutConfig, Range, ReelMotion, SYMBOL_COUNT, SpeedLimitedMotion, Symbol,
    continuous_ranges, evaluate, parse_row,
};

const FRAME: f64 = 1.0 / 60.0;
const REEL_LENGTH: f64 = SYMBOL_COUNT as f64;

fn step_frames(reel: &mut ReelMotion, seconds: f64) {
    let frames = (seconds / FRAME).ceil() as usize;
    for _ in 0..frames {
        reel.advance(FRAME);
    }
}

/// Reel cruising at `speed` cards per second
fn cruising_reel(speed: f64, offset: f64) -> ReelMotion {
    let mut reel = ReelMotion::new(REEL_LENGTH);
    reel.set_position(offset);
    reel.set_max_speed(speed);
    reel.go_full_speed_in(0.8);
    step_frames(&mut reel, 1.3);
    reel
}

// ═══════════════════════════════════════════════════════════════════════════════
// REEL LANDING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_stop_lands_on_every_card_from_rest() {
    for target in 0..=SYMBOL_COUNT {
        for time in [0.25, 0.5, 1.0, 2.7] {
            let mut reel = ReelMotion::new(REEL_LENGTH);
            reel.set_position(3.0);
            reel.stop_in(target as f64, time);
            step_frames(&mut reel, time + FRAME);

            assert!(reel.is_at_rest(), "target {target} in {time}s");
            assert_eq!(reel.speed(), 0.0);
            assert_abs_diff_eq!(reel.position(), (target % SYMBOL_COUNT) as f64, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_stop_lands_on_every_card_while_spinning() {
    for speed in [1.5, 15.0, 24.0] {
        for target in 0..SYMBOL_COUNT {
            for time in [0.5, 1.0, 3.0] {
                let mut reel = cruising_reel(speed, 5.25);
                assert_abs_diff_eq!(reel.speed(), speed, epsilon = 1e-9);

                reel.stop_in(target as f64, time);
                let mut previous = reel.position();
                let mut travelled = 0.0;
                let frames = (time / FRAME).ceil() as usize + 1;
                for _ in 0..frames {
                    reel.advance(FRAME);
                    assert!(reel.speed() >= -1e-9, "reel ran backwards");
                    let mut delta = reel.position() - previous;
                    if delta < -REEL_LENGTH / 2.0 {
                        delta += REEL_LENGTH;
                    }
                    travelled += delta;
                    previous = reel.position();
                }

                assert!(reel.is_at_rest(), "speed {speed}, target {target}, time {time}");
                assert_eq!(reel.speed(), 0.0);
                assert_abs_diff_eq!(reel.position(), target as f64, epsilon = 1e-9);
                // At least the cards covered by the speed the stop started from
                assert!(travelled >= speed * time / 3.0 - 1e-6);
            }
        }
    }
}

#[test]
fn test_fractional_stop_lands_on_nearest_card() {
    for target in [0.4_f64, 7.6, 15.7, 3.49] {
        let expected = (target.round() as usize % SYMBOL_COUNT) as f64;
        for time in [0.5, 1.0, 2.7] {
            let mut resting = ReelMotion::new(REEL_LENGTH);
            resting.set_position(3.0);
            resting.stop_in(target, time);
            step_frames(&mut resting, time + FRAME);

            assert!(resting.is_at_rest(), "target {target} in {time}s from rest");
            assert_abs_diff_eq!(resting.position(), expected, epsilon = 1e-9);

            let mut spinning = cruising_reel(15.0, 5.25);
            spinning.stop_in(target, time);
            step_frames(&mut spinning, time + FRAME);

            assert!(spinning.is_at_rest(), "target {target} in {time}s at speed");
            assert_abs_diff_eq!(spinning.position(), expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_single_advance_over_stop_time_lands() {
    for target in [0.0_f64, 6.0, 11.0, 7.6, 15.7] {
        let expected = (target.round() as usize % SYMBOL_COUNT) as f64;
        for time in [0.5, 1.0, 3.0] {
            let mut reel = cruising_reel(15.0, 5.25);
            reel.stop_in(target, time);
            reel.advance(time);

            assert!(reel.is_at_rest(), "target {target} in {time}s");
            assert_eq!(reel.speed(), 0.0);
            assert_abs_diff_eq!(reel.position(), expected, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_stop_duration_is_honoured() {
    let mut reel = cruising_reel(15.0, 0.0);
    reel.stop_in(9.0, 2.0);

    step_frames(&mut reel, 2.0 - 3.0 * FRAME);
    assert!(!reel.is_at_rest());

    step_frames(&mut reel, 4.0 * FRAME);
    assert!(reel.is_at_rest());
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPEED COMMANDS OUTSIDE THE BAND
// ═══════════════════════════════════════════════════════════════════════════════

/// Reel at the peak of a stop from rest, where it runs at 1.5 * end / time
fn reel_at_stop_peak(end: f64) -> ReelMotion {
    let mut reel = ReelMotion::new(REEL_LENGTH);
    reel.set_max_speed(15.0);
    reel.stop_in(end, 1.0);
    for _ in 0..30 {
        reel.advance(FRAME);
    }
    reel
}

#[test]
fn test_go_full_speed_from_above_reaches_max_on_time() {
    for end in [12.0, 15.0] {
        for time in [0.5, 1.0, 3.0] {
            let mut reel = reel_at_stop_peak(end);
            let start = reel.speed();
            assert!(start > 15.0);

            reel.go_full_speed_in(time);
            let step = (start - 15.0) / time * FRAME;
            let mut previous = start;
            let frames = (time / FRAME).round() as usize;
            for frame in 1..=frames + 60 {
                reel.advance(FRAME);
                let speed = reel.speed();
                assert!(speed >= 15.0 - 1e-9, "end {end}, time {time}: {speed} below max");
                assert!(speed <= previous + 1e-9, "end {end}, time {time}: sped up");
                assert!(previous - speed <= step + 1e-9, "end {end}, time {time}: jumped");
                if frame < frames {
                    assert!(speed > 15.0 + 1e-9, "end {end}, time {time}: early at frame {frame}");
                }
                previous = speed;
            }
            assert_abs_diff_eq!(reel.speed(), 15.0, epsilon = 1e-9);
            assert!(!reel.is_at_rest());
        }
    }
}

#[test]
fn test_slow_to_minimal_from_below_reaches_min_on_time() {
    for time in [0.5, 1.0, 2.0] {
        let mut reel = ReelMotion::new(REEL_LENGTH);
        reel.set_max_speed(15.0);
        reel.set_min_speed(6.0);
        reel.go_full_speed_in(1.0);
        for _ in 0..6 {
            reel.advance(FRAME);
        }
        let start = reel.speed();
        assert!(start > 0.0 && start < 6.0);

        reel.slow_to_minimal_in(time);
        let step = (6.0 - start) / time * FRAME;
        let mut previous = start;
        let frames = (time / FRAME).round() as usize;
        for frame in 1..=frames + 60 {
            reel.advance(FRAME);
            let speed = reel.speed();
            assert!(speed <= 6.0 + 1e-9, "time {time}: {speed} above min");
            assert!(speed >= previous - 1e-9, "time {time}: slowed down");
            assert!(speed - previous <= step + 1e-9, "time {time}: jumped");
            if frame < frames {
                assert!(speed < 6.0 - 1e-9, "time {time}: early at frame {frame}");
            }
            previous = speed;
        }
        assert_abs_diff_eq!(reel.speed(), 6.0, epsilon = 1e-9);
        assert!(!reel.is_at_rest());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MOTION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_split_advance_matches_single_advance() {
    let cases = [
        Motion::uniform(1.0, 2.5),
        Motion::accelerated(-3.0, 1.0, 0.75),
        Motion::jerked(1.0, 2.0, 0.5, -0.3),
        Motion::jerked(0.0, -4.0, 6.0, 1.25),
    ];

    for motion in cases {
        for (first, second) in [(0.1, 0.6), (0.35, 0.35), (1.2, 0.05)] {
            let mut whole = motion;
            whole.advance(first + second);

            let mut split = motion;
            split.advance(first);
            split.advance(second);

            assert_abs_diff_eq!(whole.position(), split.position(), epsilon = 1e-9);
            assert_abs_diff_eq!(whole.speed(), split.speed(), epsilon = 1e-9);
            assert_abs_diff_eq!(whole.acceleration(), split.acceleration(), epsilon = 1e-9);
        }
    }
}

#[test]
fn test_limited_motion_stays_within_bounds() {
    let mut limited = SpeedLimitedMotion::new(Motion::jerked(0.0, 1.0, 4.0, -6.0), 0.5, 2.0);
    let mut peak = f64::MIN;
    let mut last_position = limited.motion().position();

    for _ in 0..600 {
        limited.advance(1.0 / 120.0);
        let speed = limited.motion().speed();
        assert!(speed >= 0.5 - 1e-9 && speed <= 2.0 + 1e-9, "speed {speed} out of band");
        assert!(limited.motion().position() > last_position);

        peak = peak.max(speed);
        last_position = limited.motion().position();
    }

    assert_abs_diff_eq!(peak, 2.0, epsilon = 1e-9);
    // Settles on the lower bound once the jerk drags it down
    assert_abs_diff_eq!(limited.motion().speed(), 0.5, epsilon = 1e-9);
    assert!(limited.limit_reached());
}

#[test]
fn test_limited_motion_without_crossing_is_free_motion() {
    let motion = Motion::jerked(2.0, 3.0, 0.5, -0.2);
    let mut limited = SpeedLimitedMotion::new(motion, 0.0, 100.0);
    let mut free = motion;

    for _ in 0..30 {
        limited.advance(FRAME);
        free.advance(FRAME);
    }
    assert_abs_diff_eq!(limited.motion().position(), free.position(), epsilon = 1e-9);
    assert_abs_diff_eq!(limited.motion().speed(), free.speed(), epsilon = 1e-9);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCORING
// ═══════════════════════════════════════════════════════════════════════════════

fn score(text: &str) -> (u32, Range, bool) {
    let row = parse_row(text).expect("valid row");
    let result = evaluate(row, &PayoutConfig::default());
    (result.points, result.range, result.free_spin)
}

#[test]
fn test_identical_symbols_form_one_range() {
    for symbol in Symbol::ALL {
        for n in 1..=5 {
            assert_eq!(continuous_ranges(&vec![symbol; n]), vec![Range::new(0, n)]);
        }
    }
}

#[test]
fn test_reference_rows() {
    assert_eq!(
        score("seven, question, question, question, seven"),
        (32 * 5u32.pow(3) * 2u32.pow(2), Range::new(0, 5), false)
    );
    assert_eq!(score("apple apple cross apple apple").0, 0);
    assert_eq!(
        score("apple,carrot,carrot,carrot,grape"),
        (8 * 5u32.pow(3) * 2u32.pow(2), Range::new(0, 5), false)
    );
}

#[test]
fn test_five_of_a_kind_pays_full_multiplier() {
    for symbol in Symbol::ALL {
        let row = [symbol; 5];
        let result = evaluate(row, &PayoutConfig::default());
        assert_eq!(result.range, Range::new(0, 5));
        assert_eq!(result.points, symbol.base_value() * 5u32.pow(5), "{symbol}");
        assert_eq!(result.free_spin, symbol == Symbol::Respin);
    }
}

#[test]
fn test_custom_payout_multipliers() {
    let payout = PayoutConfig {
        big_multiplier: 3,
        small_multiplier: 1,
        ..Default::default()
    };
    let row = parse_row("heart,heart,heart,corn,topaz").expect("valid row");
    let result = evaluate(row, &payout);
    assert_eq!(result.range, Range::new(0, 3));
    assert_eq!(result.points, 16 * 27);
}
