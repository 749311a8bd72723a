//! Supervisor behaviour: meta-state overrides, the remote failsafe, and the
//! Initial → Normal hand-over.

use std::f64::consts::PI;

use approx::assert_relative_eq;

use bus_types::BusRecord;
use helmsman::bus::apply_record;
use helmsman::config::HelmsmanConfig;
use helmsman::controller::ControllerInput;
use helmsman::ship_control::ShipControl;
use helmsman::simple_controllers::RUDDER_BRAKE_ANGLE_RAD;

const D: f64 = PI / 180.0;

fn fresh() -> (ShipControl, ControllerInput) {
    (
        ShipControl::new(&HelmsmanConfig::default()),
        ControllerInput::default(),
    )
}

fn remote(input: &mut ControllerInput, ship: &mut ShipControl, command: i32, now_ms: u64) {
    let line = format!(
        "remote: timestamp_s:{} command:{command} alpha_star_deg:NaN",
        now_ms / 1000
    );
    let rec = BusRecord::parse(&line).unwrap();
    apply_record(&rec, input, ship, now_ms);
}

/// A complete, healthy sensor set: sailing north-ish with wind on the mast.
fn feed_sailing_records(input: &mut ControllerInput, ship: &mut ShipControl, wind_angle_deg: f64) {
    for line in [
        "imu: timestamp_ms:1 temp_c:18 acc_x_m_s2:0 acc_y_m_s2:0 acc_z_m_s2:-9.81 \
         gyr_x_rad_s:0 gyr_y_rad_s:0 gyr_z_rad_s:0 mag_x_au:0.4 mag_y_au:0 mag_z_au:0.2 \
         roll_deg:0 pitch_deg:0 yaw_deg:0 lat_deg:47.3 lng_deg:8.5 alt_m:400 \
         vel_x_m_s:1.0 vel_y_m_s:0 vel_z_m_s:0"
            .to_string(),
        format!("wind: timestamp_ms:1 angle_deg:{wind_angle_deg} speed_m_s:6 valid:1"),
        "ruddersts: timestamp_ms:1 rudder_l_deg:0 rudder_r_deg:0 sail_deg:0".to_string(),
        "gps: timestamp_ms:1 lat_deg:47.3 lng_deg:8.5 speed_m_s:1.0 cog_deg:0".to_string(),
    ] {
        let rec = BusRecord::parse(&line).unwrap();
        apply_record(&rec, input, ship, 0);
    }
}

#[test]
fn starts_in_initial_with_zero_drives() {
    let (mut ship, input) = fresh();
    let out = ship.run(&input, 0).clone();
    assert_eq!(ship.active_controller_name(), "Initial");
    assert!(!ship.idling());
    assert_eq!(out.drives_reference.gamma_rudder_star_left_rad, 0.0);
    assert_eq!(out.drives_reference.gamma_sail_star_rad, 0.0);
    // Nothing homed yet: the wire record strips every axis.
    let rec = out.drives_reference.to_record(0, &input.drives);
    assert!(rec.rudder_l_deg.is_nan());
    assert!(rec.rudder_r_deg.is_nan());
    assert!(rec.sail_deg.is_nan());
}

#[test]
fn brake_command_puts_the_rudders_hard_over() {
    let (mut ship, mut input) = fresh();
    remote(&mut input, &mut ship, 3, 1000);
    let out = ship.run(&input, 1000).clone();
    assert_eq!(ship.active_controller_name(), "Brake");
    assert_relative_eq!(
        out.drives_reference.gamma_rudder_star_left_rad,
        RUDDER_BRAKE_ANGLE_RAD
    );
    assert_relative_eq!(
        out.drives_reference.gamma_rudder_star_right_rad,
        -RUDDER_BRAKE_ANGLE_RAD
    );
}

#[test]
fn docking_and_idle_commands() {
    let (mut ship, mut input) = fresh();
    remote(&mut input, &mut ship, 2, 1000);
    let out = ship.run(&input, 1000).clone();
    assert_eq!(ship.active_controller_name(), "Docking");
    assert_eq!(out.drives_reference.gamma_rudder_star_left_rad, 0.0);

    remote(&mut input, &mut ship, 6, 2000);
    ship.run(&input, 2000);
    assert_eq!(ship.active_controller_name(), "Idle");
    assert!(ship.idling());
}

#[test]
fn power_cycle_brakes_first() {
    let (mut ship, mut input) = fresh();
    remote(&mut input, &mut ship, 5, 1000);
    ship.run(&input, 1000);
    assert_eq!(ship.active_controller_name(), "Brake");
}

#[test]
fn unknown_remote_command_is_ignored() {
    let (mut ship, mut input) = fresh();
    remote(&mut input, &mut ship, 9, 1000);
    ship.run(&input, 1000);
    assert_eq!(ship.active_controller_name(), "Initial");
}

#[test]
fn stale_remote_in_idle_mode_fails_safe_to_brake() {
    let (mut ship, mut input) = fresh();
    remote(&mut input, &mut ship, 6, 1_000_000);
    ship.run(&input, 1_000_000);
    assert!(ship.idling());
    // Heartbeats keep coming for a while.
    remote(&mut input, &mut ship, 6, 1_002_000);
    ship.run(&input, 1_002_100);
    assert!(ship.idling());
    // Then the shore link dies: more than 5 s of silence → brake within
    // the next tick.
    let out = ship.run(&input, 1_007_200).clone();
    assert_eq!(ship.active_controller_name(), "Brake");
    assert_relative_eq!(
        out.drives_reference.gamma_rudder_star_left_rad,
        RUDDER_BRAKE_ANGLE_RAD
    );
}

#[test]
fn autonomous_mode_has_no_remote_timeout() {
    let (mut ship, mut input) = fresh();
    remote(&mut input, &mut ship, 1, 1000);
    ship.run(&input, 1000);
    // Hours later, still not braking: Normal mode has no heartbeat
    // dependency.
    ship.run(&input, 10_000_000);
    assert_eq!(ship.active_controller_name(), "Initial");
}

#[test]
fn initial_hands_over_to_normal_and_homing_loss_falls_back() {
    let (mut ship, mut input) = fresh();
    input.alpha_star_rad = Some(90.0 * D);

    // Sleep phase with the wind square on the starboard side of the mast
    // (sensor from-angle 270 → mast-frame to-angle +90): the initial
    // controller picks the negative working side.
    feed_sailing_records(&mut input, &mut ship, 270.0);
    for t in 0..200 {
        ship.run(&input, t * 100);
    }
    assert_eq!(ship.active_controller_name(), "Initial");

    // The wind settles abeam on the working side and the true-wind warm-up
    // runs its course.
    feed_sailing_records(&mut input, &mut ship, 90.0);
    for t in 200..1100 {
        ship.run(&input, t * 100);
    }
    assert_eq!(ship.active_controller_name(), "Normal");
    let out = ship.run(&input, 100_100).clone();
    // With the true wind known, the skipper gets position and wind.
    assert!(out.status.mag_true_m_s > 0.0);
    assert!(out.skipper_input.latitude_deg.is_finite());
    assert!((0.0..360.0).contains(&out.skipper_input.angle_true_deg));

    // A drive losing its homing reference mid-sail forces a restart.
    let inits_before = out.status.inits;
    input.drives.homed_sail = false;
    let out = ship.run(&input, 100_200).clone();
    assert_eq!(ship.active_controller_name(), "Initial");
    assert_eq!(out.status.inits, inits_before + 1);
}

#[test]
fn alpha_star_is_required_for_normal() {
    let (mut ship, mut input) = fresh();
    // Full sensor health, but the route planner never spoke.
    feed_sailing_records(&mut input, &mut ship, 270.0);
    for t in 0..200 {
        ship.run(&input, t * 100);
    }
    feed_sailing_records(&mut input, &mut ship, 90.0);
    for t in 200..1100 {
        ship.run(&input, t * 100);
    }
    assert_eq!(ship.active_controller_name(), "Initial");
    // The first helm record unlocks the hand-over.
    input.alpha_star_rad = Some(45.0 * D);
    ship.run(&input, 100_100);
    assert_eq!(ship.active_controller_name(), "Normal");
}
