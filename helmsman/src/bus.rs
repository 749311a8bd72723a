//! Plumbing between bus records and the controller input/output, shared by
//! the main loop and the end-to-end tests.

use tracing::debug;

use bus_types::{BusRecord, HelmsmanStatusRecord, ImuRecord, SkipperInputRecord};

use crate::angles::{normalize_deg, symmetric_deg, symmetric_rad};
use crate::controller::{ControllerInput, ControllerOutput, ImuInput};
use crate::ship_control::ShipControl;

impl ImuInput {
    pub fn from_record(rec: &ImuRecord) -> Self {
        Self {
            temp_c: rec.temp_c,
            lat_deg: rec.lat_deg,
            lng_deg: rec.lng_deg,
            alt_m: rec.alt_m,
            roll_rad: rec.roll_deg.to_radians(),
            pitch_rad: rec.pitch_deg.to_radians(),
            yaw_rad: symmetric_rad(rec.yaw_deg.to_radians()),
            vel_x_m_s: rec.vel_x_m_s,
            vel_y_m_s: rec.vel_y_m_s,
            vel_z_m_s: rec.vel_z_m_s,
            acc_x_m_s2: rec.acc_x_m_s2,
            acc_y_m_s2: rec.acc_y_m_s2,
            acc_z_m_s2: rec.acc_z_m_s2,
            gyro_x_rad_s: rec.gyr_x_rad_s,
            gyro_y_rad_s: rec.gyr_y_rad_s,
            gyro_z_rad_s: rec.gyr_z_rad_s,
            mag_x_au: rec.mag_x_au,
            mag_y_au: rec.mag_y_au,
            mag_z_au: rec.mag_z_au,
        }
    }
}

/// Fold one parsed bus line into the accumulated controller input. Remote
/// records additionally steer the supervisor's meta state.
pub fn apply_record(
    record: &BusRecord,
    input: &mut ControllerInput,
    ship: &mut ShipControl,
    now_ms: u64,
) {
    match record {
        BusRecord::Wind(w) => {
            input.wind_sensor.angle_deg = symmetric_deg(normalize_deg(w.angle_deg));
            input.wind_sensor.mag_m_s = w.speed_m_s;
            input.wind_sensor.valid = w.valid;
        }
        BusRecord::Imu(imu) => {
            input.imu = ImuInput::from_record(imu);
        }
        BusRecord::DriveStatus(sts) => input.drives.apply_status(sts),
        BusRecord::StatusLeft(sts) => input.drives.apply_status_left(sts.rudder_l_deg),
        BusRecord::StatusRight(sts) => input.drives.apply_status_right(sts.rudder_r_deg),
        BusRecord::StatusSail(sts) => input.drives.apply_status_sail(sts.sail_deg),
        BusRecord::Compass(c) => {
            input.compass.phi_z_rad = c.yaw_deg.to_radians();
        }
        BusRecord::Gps(gps) => {
            input.gps.lat_deg = gps.lat_deg;
            input.gps.lng_deg = gps.lng_deg;
            input.gps.speed_m_s = gps.speed_m_s;
            input.gps.cog_rad = gps.cog_deg.to_radians();
        }
        BusRecord::Helm(helm) => {
            if ship.accepts_helm_alpha() && helm.alpha_star_deg.is_finite() {
                input.alpha_star_rad = Some(helm.alpha_star_deg.to_radians());
            }
        }
        BusRecord::Remote(remote) => {
            if let Some(alpha_override) = ship.handle_remote(remote, now_ms) {
                input.alpha_star_rad = Some(alpha_override);
            }
        }
        // Our own output kinds looping back on a shared bus are not inputs.
        BusRecord::RudderCtl(_) | BusRecord::SkipperInput(_) | BusRecord::HelmsmanStatus(_) => {
            debug!("ignoring echoed output record");
        }
    }
}

/// `skipper_input:` snapshot of this tick's output, if there is a fix.
pub fn skipper_record(out: &ControllerOutput, timestamp_ms: u64) -> Option<SkipperInputRecord> {
    let rec = SkipperInputRecord {
        timestamp_ms,
        latitude_deg: out.skipper_input.latitude_deg,
        longitude_deg: out.skipper_input.longitude_deg,
        angle_true_deg: out.skipper_input.angle_true_deg,
        mag_true_kn: out.skipper_input.mag_true_kn,
    };
    rec.valid().then_some(rec)
}

/// `helmsman_st:` snapshot.
pub fn status_record(out: &ControllerOutput, timestamp_ms: u64) -> HelmsmanStatusRecord {
    HelmsmanStatusRecord {
        timestamp_ms,
        tacks: out.status.tacks,
        jibes: out.status.jibes,
        inits: out.status.inits,
        direction_true_deg: out.status.direction_true_deg,
        mag_true_m_s: out.status.mag_true_m_s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HelmsmanConfig;

    fn ship() -> ShipControl {
        ShipControl::new(&HelmsmanConfig::default())
    }

    #[test]
    fn helm_record_sets_alpha_star() {
        let mut input = ControllerInput::default();
        let mut ship = ship();
        assert_eq!(input.alpha_star_rad, None);
        let rec = BusRecord::parse("helm: timestamp_ms:1 alpha_star_deg:90").unwrap();
        apply_record(&rec, &mut input, &mut ship, 0);
        assert_eq!(input.alpha_star_rad, Some(90.0_f64.to_radians()));
        // NaN does not clobber a known value.
        let rec = BusRecord::parse("helm: timestamp_ms:2 alpha_star_deg:NaN").unwrap();
        apply_record(&rec, &mut input, &mut ship, 0);
        assert_eq!(input.alpha_star_rad, Some(90.0_f64.to_radians()));
    }

    #[test]
    fn override_mode_blocks_helm_and_honours_remote_alpha() {
        let mut input = ControllerInput::default();
        let mut ship = ship();
        let rec = BusRecord::parse("remote: timestamp_s:10 command:4 alpha_star_deg:45").unwrap();
        apply_record(&rec, &mut input, &mut ship, 10_000);
        assert_eq!(input.alpha_star_rad, Some(45.0_f64.to_radians()));
        assert!(!ship.accepts_helm_alpha());
        let rec = BusRecord::parse("helm: timestamp_ms:1 alpha_star_deg:90").unwrap();
        apply_record(&rec, &mut input, &mut ship, 10_100);
        assert_eq!(input.alpha_star_rad, Some(45.0_f64.to_radians()));
    }

    #[test]
    fn wind_record_lands_in_sensor_input() {
        let mut input = ControllerInput::default();
        let mut ship = ship();
        let rec =
            BusRecord::parse("wind: timestamp_ms:5 angle_deg:350 speed_m_s:7.5 valid:1").unwrap();
        apply_record(&rec, &mut input, &mut ship, 0);
        assert!(input.wind_sensor.valid);
        assert_eq!(input.wind_sensor.mag_m_s, 7.5);
        // Normalised into the symmetric convention.
        assert_eq!(input.wind_sensor.angle_deg, -10.0);
    }
}
