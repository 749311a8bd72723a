//! Sensor fusion: from one raw [`ControllerInput`] per tick to a stable
//! [`FilteredMeasurements`] snapshot.
//!
//! A missing raw signal leaves the affected fields at their previous values
//! and clears their validity for the tick. The validity flags form a chain:
//! `valid_true_wind` implies `valid_app_wind` implies `valid`.

use crate::angles::{symmetric_rad, Polar};
use crate::compass;
use crate::controller::ControllerInput;
use crate::filters::{AngleLowpass, Lowpass1, Median3Filter, VectorLowpass};
use crate::wind::{sensor_to_boat_angle, sensor_to_mast_angle};
use crate::SAMPLING_PERIOD;

/// Fused measurements in controller units (radians, m/s; degrees only for
/// geographic coordinates).
#[derive(Debug, Clone)]
pub struct FilteredMeasurements {
    /// Boat heading, symmetric.
    pub phi_z_boat: f64,
    /// Boat speed through the water, magnitude of the x-velocity.
    pub mag_boat: f64,
    /// Signed boat x-velocity; negative when making sternway.
    pub v_x_boat: f64,
    /// Yaw rate.
    pub omega_boat: f64,
    /// True wind TO-direction, global frame; filtered very slowly.
    pub alpha_true: f64,
    pub mag_true: f64,
    /// Apparent wind TO-angle, boat frame.
    pub angle_app: f64,
    pub mag_app: f64,
    /// Apparent wind TO-angle relative to the boom axis, slow filter.
    /// A positive angle of attack pushes the straight sail to port.
    pub angle_aoa: f64,
    pub mag_aoa: f64,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    /// Roll (heel) and pitch.
    pub phi_x_rad: f64,
    pub phi_y_rad: f64,
    pub temperature_c: f64,
    /// All per-tick filters are warmed up and fed this tick.
    pub valid: bool,
    /// Apparent wind info is reliable and well filtered.
    pub valid_app_wind: bool,
    /// True wind info is reliable; needs the long warm-up.
    pub valid_true_wind: bool,
}

impl Default for FilteredMeasurements {
    fn default() -> Self {
        Self {
            phi_z_boat: 0.0,
            mag_boat: 0.0,
            v_x_boat: 0.0,
            omega_boat: 0.0,
            alpha_true: 0.0,
            mag_true: 0.0,
            angle_app: 0.0,
            mag_app: 0.0,
            angle_aoa: 0.0,
            mag_aoa: 0.0,
            longitude_deg: f64::NAN,
            latitude_deg: f64::NAN,
            phi_x_rad: 0.0,
            phi_y_rad: 0.0,
            temperature_c: f64::NAN,
            valid: false,
            valid_app_wind: false,
            valid_true_wind: false,
        }
    }
}

/// Filter time constants, seconds.
const T1_OMEGA_S: f64 = 1.0;
const T1_SPEED_S: f64 = 1.0;
const T1_APPARENT_S: f64 = 1.0;
const T1_TRUE_WIND_S: f64 = 30.0;
const T1_AOA_S: f64 = 2.0;
const T1_TEMPERATURE_S: f64 = 10.0;

#[derive(Debug)]
pub struct FilterBlock {
    omega_filter: Lowpass1,
    speed_median: Median3Filter,
    speed_filter: Lowpass1,
    apparent_filter: VectorLowpass,
    true_wind_filter: VectorLowpass,
    aoa_filter: AngleLowpass,
    temperature_filter: Lowpass1,
    /// Consecutive ticks the true-wind filter has been fed.
    true_wind_ticks: u32,
    true_wind_warmup_ticks: u32,
}

impl FilterBlock {
    /// `true_wind_warmup_s` is the uninterrupted feeding time required
    /// before the true-wind estimate counts as reliable (≥ 30 s).
    pub fn new(true_wind_warmup_s: f64) -> Self {
        Self {
            omega_filter: Lowpass1::new(T1_OMEGA_S, SAMPLING_PERIOD),
            speed_median: Median3Filter::new(),
            speed_filter: Lowpass1::new(T1_SPEED_S, SAMPLING_PERIOD),
            apparent_filter: VectorLowpass::new(T1_APPARENT_S, SAMPLING_PERIOD),
            true_wind_filter: VectorLowpass::new(T1_TRUE_WIND_S, SAMPLING_PERIOD),
            aoa_filter: AngleLowpass::new(T1_AOA_S, SAMPLING_PERIOD),
            temperature_filter: Lowpass1::new(T1_TEMPERATURE_S, SAMPLING_PERIOD),
            true_wind_ticks: 0,
            true_wind_warmup_ticks: (true_wind_warmup_s / SAMPLING_PERIOD).ceil() as u32,
        }
    }

    pub fn valid_true_wind(&self) -> bool {
        self.true_wind_ticks >= self.true_wind_warmup_ticks && self.true_wind_filter.valid()
    }

    /// Run every filter once, in a fixed order, so equal inputs reproduce
    /// equal outputs.
    pub fn filter(&mut self, input: &ControllerInput, filtered: &mut FilteredMeasurements) {
        // Heading: fused yaw first, tilt-compensated magnetometer second,
        // the standalone compass unit last.
        let heading_ok = if input.imu.yaw_rad.is_finite() {
            filtered.phi_z_boat = symmetric_rad(input.imu.yaw_rad);
            true
        } else if let Some(bearing) = compass::vectors_to_bearing(
            input.imu.acc_x_m_s2,
            input.imu.acc_y_m_s2,
            input.imu.acc_z_m_s2,
            input.imu.mag_x_au,
            input.imu.mag_y_au,
            input.imu.mag_z_au,
        ) {
            filtered.phi_z_boat = bearing;
            true
        } else if input.compass.phi_z_rad.is_finite() {
            filtered.phi_z_boat = symmetric_rad(input.compass.phi_z_rad);
            true
        } else {
            false
        };

        // Yaw rate.
        let omega_ok = input.imu.gyro_z_rad_s.is_finite();
        if omega_ok {
            filtered.omega_boat = self.omega_filter.filter(input.imu.gyro_z_rad_s);
        }

        // Boat speed: median against GPS/IMU glitches, then low-pass.
        let speed_ok = input.imu.vel_x_m_s.is_finite();
        if speed_ok {
            let despiked = self.speed_median.filter(input.imu.vel_x_m_s);
            filtered.v_x_boat = self.speed_filter.filter(despiked);
            filtered.mag_boat = filtered.v_x_boat.abs();
        }

        // Attitude, temperature, position.
        if input.imu.roll_rad.is_finite() {
            filtered.phi_x_rad = input.imu.roll_rad;
        }
        if input.imu.pitch_rad.is_finite() {
            filtered.phi_y_rad = input.imu.pitch_rad;
        }
        if input.imu.temp_c.is_finite() {
            filtered.temperature_c = self.temperature_filter.filter(input.imu.temp_c);
        }
        if input.imu.lat_deg.is_finite() && input.imu.lng_deg.is_finite() {
            filtered.latitude_deg = input.imu.lat_deg;
            filtered.longitude_deg = input.imu.lng_deg;
        } else if input.gps.lat_deg.is_finite() && input.gps.lng_deg.is_finite() {
            filtered.latitude_deg = input.gps.lat_deg;
            filtered.longitude_deg = input.gps.lng_deg;
        }

        // Apparent wind: sensor reading taken at the mast, converted to the
        // boat frame with the actual sail rotation, filtered as vector
        // components to dodge the angle wrap.
        let wind_raw_ok = input.wind_sensor.valid
            && input.wind_sensor.angle_deg.is_finite()
            && input.wind_sensor.mag_m_s.is_finite();
        if wind_raw_ok {
            let to_boat =
                sensor_to_boat_angle(input.wind_sensor.angle_deg, input.drives.gamma_sail_rad);
            let (ax, ay) = self.apparent_filter.filter(
                input.wind_sensor.mag_m_s * to_boat.cos(),
                input.wind_sensor.mag_m_s * to_boat.sin(),
            );
            let apparent = Polar::from_xy(ax, ay);
            if apparent.mag > 0.0 {
                filtered.angle_app = apparent.angle_rad;
            }
            filtered.mag_app = apparent.mag;

            filtered.angle_aoa = self
                .aoa_filter
                .filter(sensor_to_mast_angle(input.wind_sensor.angle_deg));
            filtered.mag_aoa = apparent.mag;
        }

        // True wind: apparent rotated to the global frame plus the boat's
        // velocity over ground, through the slow filter. Any gap restarts
        // the warm-up.
        if wind_raw_ok && heading_ok && speed_ok {
            let to_boat =
                sensor_to_boat_angle(input.wind_sensor.angle_deg, input.drives.gamma_sail_rad);
            let global = symmetric_rad(to_boat + filtered.phi_z_boat);
            let wx = input.wind_sensor.mag_m_s * global.cos()
                + filtered.v_x_boat * filtered.phi_z_boat.cos();
            let wy = input.wind_sensor.mag_m_s * global.sin()
                + filtered.v_x_boat * filtered.phi_z_boat.sin();
            let (tx, ty) = self.true_wind_filter.filter(wx, wy);
            let true_wind = Polar::from_xy(tx, ty);
            if true_wind.mag > 0.0 {
                filtered.alpha_true = true_wind.angle_rad;
            }
            filtered.mag_true = true_wind.mag;
            self.true_wind_ticks = self.true_wind_ticks.saturating_add(1);
        } else {
            self.true_wind_ticks = 0;
        }

        // Validity chain.
        filtered.valid = heading_ok
            && omega_ok
            && speed_ok
            && self.omega_filter.valid()
            && self.speed_filter.valid();
        filtered.valid_app_wind = filtered.valid && wind_raw_ok && self.apparent_filter.valid();
        filtered.valid_true_wind = filtered.valid_app_wind && self.valid_true_wind();
    }
}
