//! The controller interface and its per-tick input/output records.

use crate::drive::{DriveActualRad, DriveReferenceRad};
use crate::filter_block::FilteredMeasurements;

/// One IMU snapshot in controller units (radians, m/s, degrees only for
/// geographic coordinates). Missing fields are `NaN`.
#[derive(Debug, Clone, Copy)]
pub struct ImuInput {
    pub temp_c: f64,
    pub lat_deg: f64,
    pub lng_deg: f64,
    pub alt_m: f64,
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
    pub vel_x_m_s: f64,
    pub vel_y_m_s: f64,
    pub vel_z_m_s: f64,
    pub acc_x_m_s2: f64,
    pub acc_y_m_s2: f64,
    pub acc_z_m_s2: f64,
    pub gyro_x_rad_s: f64,
    pub gyro_y_rad_s: f64,
    pub gyro_z_rad_s: f64,
    pub mag_x_au: f64,
    pub mag_y_au: f64,
    pub mag_z_au: f64,
}

impl Default for ImuInput {
    fn default() -> Self {
        Self {
            temp_c: f64::NAN,
            lat_deg: f64::NAN,
            lng_deg: f64::NAN,
            alt_m: f64::NAN,
            roll_rad: f64::NAN,
            pitch_rad: f64::NAN,
            yaw_rad: f64::NAN,
            vel_x_m_s: f64::NAN,
            vel_y_m_s: f64::NAN,
            vel_z_m_s: f64::NAN,
            acc_x_m_s2: f64::NAN,
            acc_y_m_s2: f64::NAN,
            acc_z_m_s2: f64::NAN,
            gyro_x_rad_s: f64::NAN,
            gyro_y_rad_s: f64::NAN,
            gyro_z_rad_s: f64::NAN,
            mag_x_au: f64::NAN,
            mag_y_au: f64::NAN,
            mag_z_au: f64::NAN,
        }
    }
}

/// Raw wind sensor reading, relative to the mast top. `angle_deg` is where
/// the wind comes FROM; `valid` is the sensor's self check.
#[derive(Debug, Clone, Copy)]
pub struct WindSensorInput {
    pub angle_deg: f64,
    pub mag_m_s: f64,
    pub valid: bool,
}

impl Default for WindSensorInput {
    fn default() -> Self {
        Self {
            angle_deg: f64::NAN,
            mag_m_s: f64::NAN,
            valid: false,
        }
    }
}

/// Standalone compass unit bearing.
#[derive(Debug, Clone, Copy)]
pub struct CompassInput {
    pub phi_z_rad: f64,
}

impl Default for CompassInput {
    fn default() -> Self {
        Self { phi_z_rad: f64::NAN }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GpsInput {
    pub lat_deg: f64,
    pub lng_deg: f64,
    pub speed_m_s: f64,
    pub cog_rad: f64,
}

impl Default for GpsInput {
    fn default() -> Self {
        Self {
            lat_deg: f64::NAN,
            lng_deg: f64::NAN,
            speed_m_s: f64::NAN,
            cog_rad: f64::NAN,
        }
    }
}

/// Everything the supervisor sees at one tick, accumulated from the bus
/// records received since the last one.
#[derive(Debug, Clone, Default)]
pub struct ControllerInput {
    pub imu: ImuInput,
    pub wind_sensor: WindSensorInput,
    pub drives: DriveActualRad,
    pub compass: CompassInput,
    pub gps: GpsInput,
    /// Desired heading from the route planner; `None` until the first
    /// `helm:` (or Override `remote:`) record arrives.
    pub alpha_star_rad: Option<f64>,
}

/// Position and true wind for the route planner.
#[derive(Debug, Clone, Copy)]
pub struct SkipperData {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub angle_true_deg: f64,
    pub mag_true_kn: f64,
}

impl Default for SkipperData {
    fn default() -> Self {
        Self {
            latitude_deg: f64::NAN,
            longitude_deg: f64::NAN,
            angle_true_deg: f64::NAN,
            mag_true_kn: f64::NAN,
        }
    }
}

/// Health counters and the true-wind estimate; survives tick resets.
#[derive(Debug, Clone, Copy)]
pub struct HelmsmanStatus {
    pub tacks: u32,
    pub jibes: u32,
    pub inits: u32,
    pub direction_true_deg: f64,
    pub mag_true_m_s: f64,
}

impl Default for HelmsmanStatus {
    fn default() -> Self {
        Self {
            tacks: 0,
            jibes: 0,
            inits: 0,
            direction_true_deg: f64::NAN,
            mag_true_m_s: f64::NAN,
        }
    }
}

/// Controller output for one tick. The status block keeps its counters
/// across ticks; drives and skipper data are rewritten every cycle.
#[derive(Debug, Clone, Default)]
pub struct ControllerOutput {
    pub drives_reference: DriveReferenceRad,
    pub skipper_input: SkipperData,
    pub status: HelmsmanStatus,
}

impl ControllerOutput {
    pub fn reset_tick(&mut self) {
        self.drives_reference.reset();
        self.skipper_input = SkipperData::default();
    }
}

/// One controller of the supervisor's state machine. `entry` must refresh
/// every piece of variable state; `run` executes synchronously once per
/// 100 ms tick and never blocks, panics or fails.
pub trait Controller {
    fn entry(&mut self, _input: &ControllerInput, _filtered: &FilteredMeasurements) {}
    fn run(
        &mut self,
        input: &ControllerInput,
        filtered: &FilteredMeasurements,
        out: &mut ControllerOutput,
    );
    fn exit(&mut self) {}
    fn done(&self) -> bool {
        false
    }
    fn name(&self) -> &'static str;
}
