//! Wind vector math and the hysteretic wind-strength classifier.
//!
//! All wind angles name the direction the wind vector points TO. The wind
//! sensor is the exception: it reports where the wind comes FROM, relative
//! to the mast top, and the mast rotates with the sail.

use std::f64::consts::PI;

use crate::angles::{symmetric_rad, Polar};

/// Mounting offset between the sensor's zero mark and the boom axis.
pub const WIND_SENSOR_OFFSET_RAD: f64 = 0.0;

/// Apparent wind in the boat frame: the true wind vector minus the boat's
/// velocity over ground, rotated by the boat's heading `phi_z`.
pub fn apparent(wind_true: &Polar, boat: &Polar, phi_z: f64) -> Polar {
    let ax = wind_true.x() - boat.x();
    let ay = wind_true.y() - boat.y();
    let global = Polar::from_xy(ax, ay);
    Polar::new(symmetric_rad(global.angle_rad - phi_z), global.mag)
}

/// Inverse of [`apparent`]: reconstruct the true wind (global frame) from
/// the boat-frame apparent wind and the boat's motion.
pub fn true_from_apparent(apparent_boat: &Polar, boat: &Polar, phi_z: f64) -> Polar {
    let global_angle = symmetric_rad(apparent_boat.angle_rad + phi_z);
    let wx = apparent_boat.mag * global_angle.cos() + boat.x();
    let wy = apparent_boat.mag * global_angle.sin() + boat.y();
    Polar::from_xy(wx, wy)
}

/// Boat-frame apparent wind TO-angle from the raw sensor reading and the
/// actual sail angle carrying the mast.
pub fn sensor_to_boat_angle(angle_from_deg: f64, gamma_sail_rad: f64) -> f64 {
    symmetric_rad(angle_from_deg.to_radians() + WIND_SENSOR_OFFSET_RAD + gamma_sail_rad + PI)
}

/// Mast-frame apparent wind TO-angle, i.e. relative to the boom axis.
pub fn sensor_to_mast_angle(angle_from_deg: f64) -> f64 {
    symmetric_rad(angle_from_deg.to_radians() + WIND_SENSOR_OFFSET_RAD + PI)
}

/// Wind strength classes used by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindStrength {
    Calm,
    Normal,
    Storm,
}

const CALM_TO_NORMAL_M_S: f64 = 2.5;
const NORMAL_TO_CALM_M_S: f64 = 1.5;
const NORMAL_TO_STORM_M_S: f64 = 15.0;
const STORM_TO_NORMAL_M_S: f64 = 12.0;

/// One classification step with hysteresis bands. Sustained-crossing
/// behaviour comes from feeding this the strongly filtered wind magnitude.
pub fn wind_strength(previous: WindStrength, mag_m_s: f64) -> WindStrength {
    match previous {
        WindStrength::Calm => {
            if mag_m_s >= CALM_TO_NORMAL_M_S {
                WindStrength::Normal
            } else {
                WindStrength::Calm
            }
        }
        WindStrength::Normal => {
            if mag_m_s >= NORMAL_TO_STORM_M_S {
                WindStrength::Storm
            } else if mag_m_s < NORMAL_TO_CALM_M_S {
                WindStrength::Calm
            } else {
                WindStrength::Normal
            }
        }
        WindStrength::Storm => {
            if mag_m_s < STORM_TO_NORMAL_M_S {
                WindStrength::Normal
            } else {
                WindStrength::Storm
            }
        }
    }
}

impl WindStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindStrength::Calm => "calm",
            WindStrength::Normal => "normal",
            WindStrength::Storm => "storm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn apparent_wind_of_a_backing_boat() {
        // True wind to the North at 10 m/s, boat creeping backwards on a
        // 0.1 rad heading: the relative airflow grows.
        let wind_true = Polar::new(0.0, 10.0);
        let boat = Polar::new(0.1, -2.0);
        let app = apparent(&wind_true, &boat, 0.1);
        assert_relative_eq!(app.angle_rad, -0.0833488, epsilon = 1e-6);
        assert_relative_eq!(app.mag, 11.9917, epsilon = 1e-4);
    }

    #[test]
    fn headwind_for_a_boat_sailing_into_the_wind_vector() {
        // Boat and wind vector both pointing North, boat slower: apparent
        // from dead behind.
        let app = apparent(&Polar::new(0.0, 2.0), &Polar::new(0.0, 1.0), 0.0);
        assert_relative_eq!(app.angle_rad, 0.0, epsilon = 1e-12);
        assert_relative_eq!(app.mag, 1.0, epsilon = 1e-12);
        // Boat faster than the wind: airflow reverses to dead ahead.
        let app = apparent(&Polar::new(0.0, 2.0), &Polar::new(0.0, 3.0), 0.0);
        assert_relative_eq!(app.angle_rad.abs(), std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(app.mag, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn apparent_inverts_back_to_true() {
        let wind_true = Polar::new(1.1, 7.5);
        let boat = Polar::new(-2.0, 1.8);
        let app = apparent(&wind_true, &boat, -2.0);
        let back = true_from_apparent(&app, &boat, -2.0);
        assert_relative_eq!(back.angle_rad, wind_true.angle_rad, epsilon = 1e-9);
        assert_relative_eq!(back.mag, wind_true.mag, epsilon = 1e-9);
    }

    #[test]
    fn sensor_angles() {
        // Wind coming from dead ahead of the boom, boom centred: the
        // apparent vector points astern.
        assert_relative_eq!(
            sensor_to_boat_angle(180.0, 0.0),
            0.0,
            epsilon = 1e-12
        );
        // Boom rotated 90° to starboard shifts the boat-frame angle with it.
        assert_relative_eq!(
            sensor_to_boat_angle(180.0, std::f64::consts::FRAC_PI_2),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            sensor_to_mast_angle(90.0),
            -std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }

    #[test]
    fn wind_strength_hysteresis() {
        use WindStrength::*;
        assert_eq!(wind_strength(Calm, 2.0), Calm);
        assert_eq!(wind_strength(Calm, 2.6), Normal);
        // Inside the band the previous class sticks.
        assert_eq!(wind_strength(Normal, 2.0), Normal);
        assert_eq!(wind_strength(Normal, 1.4), Calm);
        assert_eq!(wind_strength(Normal, 15.5), Storm);
        assert_eq!(wind_strength(Storm, 13.0), Storm);
        assert_eq!(wind_strength(Storm, 11.9), Normal);
    }
}
