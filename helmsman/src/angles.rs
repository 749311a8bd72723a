//! Angle arithmetic and unit conversions.
//!
//! Two angle classes exist: *normalised* in [0, 2π) and *symmetric* in
//! [−π, π). Every operation states which class it returns; differences of
//! symmetric angles are unnormalised and must be re-symmetrised before use.

use std::f64::consts::{PI, TAU};

/// Force an angle into [0, 360).
pub fn normalize_deg(deg: f64) -> f64 {
    let x = deg.rem_euclid(360.0);
    if x >= 360.0 {
        0.0
    } else {
        x
    }
}

/// Force an angle into [−180, 180).
pub fn symmetric_deg(deg: f64) -> f64 {
    let x = normalize_deg(deg);
    if x >= 180.0 {
        x - 360.0
    } else {
        x
    }
}

/// Force an angle into [0, 2π).
pub fn normalize_rad(rad: f64) -> f64 {
    let x = rad.rem_euclid(TAU);
    if x >= TAU {
        0.0
    } else {
        x
    }
}

/// Force an angle into [−π, π).
pub fn symmetric_rad(rad: f64) -> f64 {
    let x = normalize_rad(rad);
    if x >= PI {
        x - TAU
    } else {
        x
    }
}

/// Shortest signed arc from `a` to `b`: |result| ≤ π and
/// `symmetric_rad(a + delta_rad(a, b)) == symmetric_rad(b)`.
pub fn delta_rad(a: f64, b: f64) -> f64 {
    symmetric_rad(b - a)
}

/// Degree variant of [`delta_rad`].
pub fn delta_deg(a: f64, b: f64) -> f64 {
    symmetric_deg(b - a)
}

/// Out of the two options, the one with the shorter arc to the target.
/// Returns `(choice, took_first)`; ties go to `opt1`.
pub fn nearest_rad(target: f64, opt1: f64, opt2: f64) -> (f64, bool) {
    if delta_rad(target, opt1).abs() <= delta_rad(target, opt2).abs() {
        (opt1, true)
    } else {
        (opt2, false)
    }
}

/// One rate-limiter step: move `state` toward `target` by at most
/// `max_delta`.
pub fn rate_limit(target: f64, max_delta: f64, state: &mut f64) {
    *state += (target - *state).clamp(-max_delta, max_delta);
}

/// Wrap-aware variant: takes the shortest path modulo 2π and keeps the state
/// symmetric.
pub fn rate_limit_wrap_rad(target: f64, max_delta: f64, state: &mut f64) {
    let step = delta_rad(*state, target).clamp(-max_delta, max_delta);
    *state = symmetric_rad(*state + step);
}

/// −1 for negative, 0 for 0, +1 for positive.
pub fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Like [`sign`], but 0 maps to +1.
pub fn sign_not_zero(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

pub fn nautical_mile_to_meter(miles: f64) -> f64 {
    miles * METERS_PER_NAUTICAL_MILE
}

pub fn meter_to_nautical_mile(meters: f64) -> f64 {
    meters / METERS_PER_NAUTICAL_MILE
}

pub fn knots_to_meter_per_second(knots: f64) -> f64 {
    nautical_mile_to_meter(knots) / 3600.0
}

pub fn meter_per_second_to_knots(mps: f64) -> f64 {
    meter_to_nautical_mile(mps) * 3600.0
}

/// (angle, magnitude) pair. Magnitude-0 polars carry angle 0 by convention;
/// code paths that care must special-case them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub angle_rad: f64,
    pub mag: f64,
}

impl Polar {
    pub fn new(angle_rad: f64, mag: f64) -> Self {
        Self { angle_rad, mag }
    }

    pub fn from_xy(x: f64, y: f64) -> Self {
        let mag = x.hypot(y);
        if mag == 0.0 {
            Self { angle_rad: 0.0, mag: 0.0 }
        } else {
            Self {
                angle_rad: y.atan2(x),
                mag,
            }
        }
    }

    pub fn x(&self) -> f64 {
        self.mag * self.angle_rad.cos()
    }

    pub fn y(&self) -> f64 {
        self.mag * self.angle_rad.sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalize_and_symmetric_ranges() {
        for &x in &[-720.0, -361.0, -180.0, -0.5, 0.0, 0.5, 179.0, 180.0, 359.0, 360.0, 720.5] {
            let n = normalize_deg(x);
            assert!((0.0..360.0).contains(&n), "normalize_deg({x}) = {n}");
            let s = symmetric_deg(x);
            assert!((-180.0..180.0).contains(&s), "symmetric_deg({x}) = {s}");
        }
        for &x in &[-10.0, -PI, -0.1, 0.0, 0.1, PI - 1e-9, PI, TAU, 10.0] {
            let n = normalize_rad(x);
            assert!((0.0..TAU).contains(&n), "normalize_rad({x}) = {n}");
            let s = symmetric_rad(x);
            assert!((-PI..PI).contains(&s), "symmetric_rad({x}) = {s}");
        }
        assert_eq!(symmetric_rad(PI), -PI);
        assert_eq!(symmetric_deg(180.0), -180.0);
        assert_eq!(normalize_deg(360.0), 0.0);
    }

    #[test]
    fn symmetric_is_periodic() {
        for &x in &[-3.0, -0.5, 0.0, 1.0, 2.5] {
            assert_relative_eq!(symmetric_rad(x + TAU), symmetric_rad(x), epsilon = 1e-12);
            assert_relative_eq!(symmetric_rad(x - TAU), symmetric_rad(x), epsilon = 1e-12);
        }
    }

    #[test]
    fn delta_closes_the_arc() {
        let cases = [
            (0.0, 1.0),
            (3.0, -3.0),
            (-3.1, 3.1),
            (0.1, TAU - 0.1),
            (-PI, PI - 0.2),
        ];
        for &(a, b) in &cases {
            let d = delta_rad(a, b);
            assert!(d.abs() <= PI, "delta_rad({a}, {b}) = {d}");
            assert_relative_eq!(
                symmetric_rad(a + d),
                symmetric_rad(b),
                epsilon = 1e-12
            );
        }
        assert_relative_eq!(delta_deg(170.0, -170.0), 20.0, epsilon = 1e-12);
        assert_relative_eq!(delta_deg(-170.0, 170.0), -20.0, epsilon = 1e-12);
    }

    #[test]
    fn nearest_prefers_shorter_arc_and_ties_left() {
        let (choice, first) = nearest_rad(0.1, 1.0, -2.0);
        assert_eq!(choice, 1.0);
        assert!(first);
        let (choice, first) = nearest_rad(-1.8, 1.0, -2.0);
        assert_eq!(choice, -2.0);
        assert!(!first);
        // Equidistant: opt1 wins.
        let (choice, first) = nearest_rad(0.0, 1.0, -1.0);
        assert_eq!(choice, 1.0);
        assert!(first);
    }

    #[test]
    fn rate_limit_steps() {
        let mut state = 0.0;
        rate_limit(1.0, 0.3, &mut state);
        assert_relative_eq!(state, 0.3);
        rate_limit(1.0, 0.3, &mut state);
        rate_limit(1.0, 0.3, &mut state);
        rate_limit(1.0, 0.3, &mut state);
        assert_relative_eq!(state, 1.0);
        rate_limit(-0.1, 0.3, &mut state);
        assert_relative_eq!(state, 0.7);
    }

    #[test]
    fn rate_limit_wrap_takes_the_short_way_through_pi() {
        let mut state = 3.0;
        rate_limit_wrap_rad(-3.0, 0.2, &mut state);
        // Toward −3.0 means increasing past π and wrapping negative.
        assert_relative_eq!(state, symmetric_rad(3.2), epsilon = 1e-12);
        for _ in 0..10 {
            rate_limit_wrap_rad(-3.0, 0.2, &mut state);
        }
        assert_relative_eq!(state, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_conversions_round_trip() {
        assert_relative_eq!(knots_to_meter_per_second(1.0), 1852.0 / 3600.0);
        let v = 7.3;
        assert_relative_eq!(
            knots_to_meter_per_second(meter_per_second_to_knots(v)),
            v,
            epsilon = 1e-12
        );
        let d = 1234.5;
        assert_relative_eq!(
            nautical_mile_to_meter(meter_to_nautical_mile(d)),
            d,
            epsilon = 1e-9
        );
    }

    #[test]
    fn polar_cartesian_round_trip() {
        let p = Polar::new(1.2, 4.5);
        let q = Polar::from_xy(p.x(), p.y());
        assert_relative_eq!(q.angle_rad, 1.2, epsilon = 1e-12);
        assert_relative_eq!(q.mag, 4.5, epsilon = 1e-12);
        // Zero magnitude has a defined, harmless angle.
        let z = Polar::from_xy(0.0, 0.0);
        assert_eq!(z.angle_rad, 0.0);
        assert_eq!(z.mag, 0.0);
    }

    #[test]
    fn signs() {
        assert_eq!(sign(-0.5), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(2.0), 1.0);
        assert_eq!(sign_not_zero(0.0), 1.0);
        assert_eq!(sign_not_zero(-1e-300), -1.0);
    }
}
