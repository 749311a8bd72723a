//! Actuator reference and actual values.
//!
//! The wire carries degrees in [−180, 180); internally everything is
//! radians. An un-homed drive reports `NaN` and must not be commanded.

use std::f64::consts::PI;

use bus_types::{DriveStatusRecord, RudderCtlRecord};

use crate::angles::symmetric_rad;

/// Mechanical limits. The rudders can physically block each other's shafts,
/// so the envelopes are asymmetric.
pub const RUDDER_LEFT_MIN_RAD: f64 = -25.0 * PI / 180.0;
pub const RUDDER_LEFT_MAX_RAD: f64 = 90.0 * PI / 180.0;
pub const RUDDER_RIGHT_MIN_RAD: f64 = -90.0 * PI / 180.0;
pub const RUDDER_RIGHT_MAX_RAD: f64 = 25.0 * PI / 180.0;

/// Actual drive positions in radians plus homed flags.
/// homed == "ready to be used"; commands for un-homed drives are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveActualRad {
    pub gamma_rudder_left_rad: f64,
    pub gamma_rudder_right_rad: f64,
    pub gamma_sail_rad: f64,
    pub homed_rudder_left: bool,
    pub homed_rudder_right: bool,
    pub homed_sail: bool,
}

impl DriveActualRad {
    pub fn all_homed(&self) -> bool {
        self.homed_rudder_left && self.homed_rudder_right && self.homed_sail
    }

    /// Take over a full `ruddersts:` record; `NaN` per axis means un-homed.
    pub fn apply_status(&mut self, rec: &DriveStatusRecord) {
        self.homed_rudder_left = rec.rudder_l_deg.is_finite();
        if self.homed_rudder_left {
            self.gamma_rudder_left_rad = rec.rudder_l_deg.to_radians();
        }
        self.homed_rudder_right = rec.rudder_r_deg.is_finite();
        if self.homed_rudder_right {
            self.gamma_rudder_right_rad = rec.rudder_r_deg.to_radians();
        }
        self.homed_sail = rec.sail_deg.is_finite();
        if self.homed_sail {
            self.gamma_sail_rad = rec.sail_deg.to_radians();
        }
    }

    pub fn apply_status_left(&mut self, rudder_l_deg: f64) {
        self.homed_rudder_left = rudder_l_deg.is_finite();
        if self.homed_rudder_left {
            self.gamma_rudder_left_rad = rudder_l_deg.to_radians();
        }
    }

    pub fn apply_status_right(&mut self, rudder_r_deg: f64) {
        self.homed_rudder_right = rudder_r_deg.is_finite();
        if self.homed_rudder_right {
            self.gamma_rudder_right_rad = rudder_r_deg.to_radians();
        }
    }

    pub fn apply_status_sail(&mut self, sail_deg: f64) {
        self.homed_sail = sail_deg.is_finite();
        if self.homed_sail {
            self.gamma_sail_rad = sail_deg.to_radians();
        }
    }
}

/// Reference values commanded to the drives, radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveReferenceRad {
    pub gamma_rudder_star_left_rad: f64,
    pub gamma_rudder_star_right_rad: f64,
    pub gamma_sail_star_rad: f64,
}

impl DriveReferenceRad {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clamp into the mechanical envelope and re-symmetrise the sail. The
    /// controllers stay inside these limits by construction; this is the
    /// final guard before the wire.
    pub fn clamp_to_limits(&mut self) {
        self.gamma_rudder_star_left_rad = self
            .gamma_rudder_star_left_rad
            .clamp(RUDDER_LEFT_MIN_RAD, RUDDER_LEFT_MAX_RAD);
        self.gamma_rudder_star_right_rad = self
            .gamma_rudder_star_right_rad
            .clamp(RUDDER_RIGHT_MIN_RAD, RUDDER_RIGHT_MAX_RAD);
        self.gamma_sail_star_rad = symmetric_rad(self.gamma_sail_star_rad);
    }

    /// Wire form. Commands for un-homed axes are stripped to `NaN`.
    pub fn to_record(&self, timestamp_ms: u64, actual: &DriveActualRad) -> RudderCtlRecord {
        RudderCtlRecord {
            timestamp_ms,
            rudder_l_deg: if actual.homed_rudder_left {
                self.gamma_rudder_star_left_rad.to_degrees()
            } else {
                f64::NAN
            },
            rudder_r_deg: if actual.homed_rudder_right {
                self.gamma_rudder_star_right_rad.to_degrees()
            } else {
                f64::NAN
            },
            sail_deg: if actual.homed_sail {
                self.gamma_sail_star_rad.to_degrees()
            } else {
                f64::NAN
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn status_with_nan_marks_unhomed() {
        let mut act = DriveActualRad::default();
        act.apply_status(&DriveStatusRecord {
            timestamp_ms: 0,
            rudder_l_deg: 5.0,
            rudder_r_deg: f64::NAN,
            sail_deg: -90.0,
        });
        assert!(act.homed_rudder_left);
        assert!(!act.homed_rudder_right);
        assert!(act.homed_sail);
        assert!(!act.all_homed());
        assert_relative_eq!(act.gamma_rudder_left_rad, 5.0_f64.to_radians());
        assert_relative_eq!(act.gamma_sail_rad, -std::f64::consts::FRAC_PI_2);

        act.apply_status_right(-10.0);
        assert!(act.all_homed());
    }

    #[test]
    fn unhomed_axes_are_stripped_on_the_wire() {
        let mut act = DriveActualRad::default();
        act.apply_status_left(0.0);
        act.apply_status_sail(0.0);
        let reference = DriveReferenceRad {
            gamma_rudder_star_left_rad: 0.1,
            gamma_rudder_star_right_rad: 0.1,
            gamma_sail_star_rad: 1.0,
        };
        let rec = reference.to_record(42, &act);
        assert_relative_eq!(rec.rudder_l_deg, 0.1_f64.to_degrees());
        assert!(rec.rudder_r_deg.is_nan());
        assert_relative_eq!(rec.sail_deg, 1.0_f64.to_degrees());
        assert_eq!(rec.timestamp_ms, 42);
    }

    #[test]
    fn clamp_respects_the_blocking_envelope() {
        let mut reference = DriveReferenceRad {
            gamma_rudder_star_left_rad: -0.6,
            gamma_rudder_star_right_rad: 0.6,
            gamma_sail_star_rad: 4.0,
        };
        reference.clamp_to_limits();
        assert_relative_eq!(reference.gamma_rudder_star_left_rad, RUDDER_LEFT_MIN_RAD);
        assert_relative_eq!(reference.gamma_rudder_star_right_rad, RUDDER_RIGHT_MAX_RAD);
        assert!(reference.gamma_sail_star_rad < std::f64::consts::PI);
    }
}
