//! Bearing from the IMU's electronic compass, used when the fused yaw is
//! missing. The magnetometer is assumed mounted with its x-axis pointing
//! forward in the boat; axes are x forward, y starboard, z down.

use std::f64::consts::PI;

use crate::angles::symmetric_rad;

const ACC_MAG_MIN_M_S2: f64 = 8.0;
const ACC_MAG_MAX_M_S2: f64 = 12.0;
const TILT_LIMIT_RAD: f64 = 30.0 * PI / 180.0;

fn acc_magnitude_ok(acc_x: f64, acc_y: f64, acc_z: f64) -> bool {
    let mag2 = acc_x * acc_x + acc_y * acc_y + acc_z * acc_z;
    (ACC_MAG_MIN_M_S2 * ACC_MAG_MIN_M_S2..=ACC_MAG_MAX_M_S2 * ACC_MAG_MAX_M_S2).contains(&mag2)
}

/// Pitch and roll from the gravity vector. `None` when the boat is
/// accelerating too hard for the vector to be gravity, or heeled beyond the
/// usable tilt range. A resting, level accelerometer reads (0, 0, −g).
pub fn gravity_to_pitch_roll(acc_x: f64, acc_y: f64, acc_z: f64) -> Option<(f64, f64)> {
    if !acc_magnitude_ok(acc_x, acc_y, acc_z) {
        return None;
    }
    let pitch = acc_x.atan2(-acc_z);
    let roll = (-acc_y).atan2(-acc_z);
    if pitch * pitch + roll * roll < TILT_LIMIT_RAD * TILT_LIMIT_RAD {
        Some((pitch, roll))
    } else {
        None
    }
}

/// Tilt-compensated bearing of the boat from accelerometer and magnetometer
/// vectors, symmetric radians. `None` when the tilt compensation cannot be
/// trusted.
pub fn vectors_to_bearing(
    acc_x: f64,
    acc_y: f64,
    acc_z: f64,
    mag_x: f64,
    mag_y: f64,
    mag_z: f64,
) -> Option<f64> {
    if !(mag_x.is_finite() && mag_y.is_finite() && mag_z.is_finite()) {
        return None;
    }
    let (pitch, roll) = gravity_to_pitch_roll(acc_x, acc_y, acc_z)?;
    // De-rotate the magnetic vector back to the horizontal plane.
    let proj_x = mag_x * pitch.cos()
        + mag_y * roll.sin() * pitch.sin()
        + mag_z * roll.cos() * pitch.sin();
    let proj_y = mag_y * roll.cos() - mag_z * roll.sin();
    // The boat's bearing relative to the magnetic vector is the inverse of
    // the magnetic vector's angle in the boat frame.
    Some(symmetric_rad(-proj_y.atan2(proj_x)))
}
