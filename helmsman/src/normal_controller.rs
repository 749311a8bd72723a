//! Normal sailing operation: α* shaping, maneuver planning, and the inner
//! rudder and sail loops.
//!
//! Assumes reliable heading, speed and true-wind estimates and enough wind
//! to keep the boat controllable; the supervisor guards those conditions.

use std::f64::consts::PI;

use tracing::{debug, info, warn};

use crate::angles::{delta_rad, rate_limit_wrap_rad, sign_not_zero, symmetric_rad};
use crate::controller::{Controller, ControllerInput, ControllerOutput};
use crate::filter_block::FilteredMeasurements;
use crate::filters::Lowpass1;
use crate::maneuver::{classify, Maneuver};
use crate::polar_diagram::stable_sailable_heading;
use crate::reference_values::ReferenceValues;
use crate::rudder_controller::RudderController;
use crate::sail_controller::SailController;
use crate::SAMPLING_PERIOD;

/// Rate limit on the shaped desired heading.
pub const ALPHA_STAR_RATE_LIMIT_RAD_S: f64 = 13.0 * PI / 180.0;
/// The sail drive's rotation rate; a jibe's 180° swing takes ~14 s.
pub const SAIL_DRIVE_RATE_RAD_S: f64 = 13.0 * PI / 180.0;
/// Heading changes below this just ramp; above it they get a planned
/// trajectory (and may be a tack or jibe).
const NEAR_BAND_RAD: f64 = 15.0 * PI / 180.0;

/// Close-hauled proximity: within this of the tack-zone edge the sail is
/// trimmed to the measured apparent wind instead of the planned one.
const CLOSE_HAULED_LIMIT_RAD: f64 = 10.0 * PI / 180.0;
/// When the measured apparent wind swings nearly dead ahead while close
/// hauled, hold the sail on its side this far off the centre line instead
/// of letting it slam across (luffing/back-winding guard).
const CLOSE_HAULED_APP_BAND_RAD: f64 = 20.0 * PI / 180.0;
const CLOSE_HAULED_SAIL_RAD: f64 = 4.0 * PI / 180.0;

/// Give up when boat speed and apparent wind stay below these for the
/// give-up time; the supervisor then restarts from Initial.
const GIVE_UP_SPEED_M_S: f64 = 0.05;
const GIVE_UP_WIND_M_S: f64 = 0.5;

const OFFSET_FILTER_T1_S: f64 = 1.0;

#[derive(Debug)]
pub struct NormalController {
    rudder: RudderController,
    sail: SailController,
    reference: ReferenceValues,
    /// Last shaped heading, the base for maneuver classification.
    old_phi_z_star: f64,
    /// Last commanded sail angle, holds the close-hauled side.
    old_gamma_sail: f64,
    running_maneuver: Option<Maneuver>,
    give_up_ticks: u32,
    give_up_limit_ticks: u32,
    offset_filter: Lowpass1,
    fallen_off_rad: f64,
}

impl NormalController {
    pub fn new(rudder: RudderController, sail: SailController, give_up_s: f64) -> Self {
        Self {
            rudder,
            sail,
            reference: ReferenceValues::new(),
            old_phi_z_star: 0.0,
            old_gamma_sail: 0.0,
            running_maneuver: None,
            give_up_ticks: 0,
            give_up_limit_ticks: (give_up_s / SAMPLING_PERIOD).ceil() as u32,
            offset_filter: Lowpass1::new(OFFSET_FILTER_T1_S, SAMPLING_PERIOD),
            fallen_off_rad: 0.0,
        }
    }

    pub fn rate_limit(&self) -> f64 {
        ALPHA_STAR_RATE_LIMIT_RAD_S
    }

    pub fn tacking_or_jibing(&self) -> bool {
        self.running_maneuver.is_some() && self.reference.running_plan()
    }

    /// Wind and speed both gone for the give-up time: this controller
    /// cannot sail, hand back to Initial.
    pub fn give_up(&mut self, _input: &ControllerInput, filtered: &FilteredMeasurements) -> bool {
        if filtered.mag_boat < GIVE_UP_SPEED_M_S && filtered.mag_app < GIVE_UP_WIND_M_S {
            self.give_up_ticks += 1;
        } else {
            self.give_up_ticks = 0;
        }
        self.give_up_ticks >= self.give_up_limit_ticks
    }

    /// Lock the sail to wing trim (storm) or release it again.
    pub fn lock_sail_in_wing_mode(&mut self, lock: bool) {
        if lock {
            self.sail.lock_in_wing_mode();
        } else {
            self.sail.unlock_mode();
        }
    }

    /// Bias smoother for reference hand-offs; exposed for tests.
    pub fn filter_offset(&mut self, offset_rad: f64) -> f64 {
        self.offset_filter.filter(offset_rad)
    }

    /// Shape the raw α* into this tick's reference triple (ϕz*, ωz*,
    /// γsail*), planning tacks and jibes where the desired heading crosses
    /// the wind. Public for test accessibility.
    #[allow(clippy::too_many_arguments)]
    pub fn shape_reference_value(
        &mut self,
        alpha_star: f64,
        alpha_true: f64,
        _mag_true: f64,
        phi_z_boat: f64,
        _mag_boat: f64,
        angle_app: f64,
        mag_app: f64,
        old_gamma_sail: f64,
        out: &mut ControllerOutput,
    ) -> (f64, f64, f64) {
        // A running plan is consumed to the end; α* changes wait.
        if self.reference.running_plan() {
            let (phi, omega, gamma) = self.reference.get();
            self.old_phi_z_star = phi;
            self.old_gamma_sail = gamma;
            if !self.reference.running_plan() {
                match self.running_maneuver.take() {
                    Some(Maneuver::Tack) => {
                        out.status.tacks += 1;
                        info!("tack completed ({} so far)", out.status.tacks);
                    }
                    Some(Maneuver::Jibe) => {
                        out.status.jibes += 1;
                        info!("jibe completed ({} so far)", out.status.jibes);
                    }
                    _ => {}
                }
            }
            return (phi, omega, gamma);
        }

        let sailable = stable_sailable_heading(alpha_star, alpha_true, self.old_phi_z_star);
        let turn = delta_rad(self.old_phi_z_star, sailable);
        let maneuver = classify(self.old_phi_z_star, sailable, alpha_true);

        if maneuver == Maneuver::Change && turn.abs() <= NEAR_BAND_RAD {
            // Plain ramp at the α* rate limit, no wind crossing.
            rate_limit_wrap_rad(
                sailable,
                ALPHA_STAR_RATE_LIMIT_RAD_S * SAMPLING_PERIOD,
                &mut self.old_phi_z_star,
            );
            let gamma = self.trimmed_gamma_sail(
                self.old_phi_z_star,
                alpha_true,
                angle_app,
                mag_app,
                old_gamma_sail,
            );
            self.old_gamma_sail = gamma;
            self.reference.set(self.old_phi_z_star, gamma);
            // Track how far the boat has fallen off the reference; smoothed
            // for the log so single bad ticks don't trip the warning.
            self.fallen_off_rad = self
                .offset_filter
                .filter(delta_rad(phi_z_boat, self.old_phi_z_star));
            if self.fallen_off_rad.abs() > PI / 4.0 {
                warn!(
                    "fallen off the reference by {:.0}°",
                    self.fallen_off_rad.to_degrees()
                );
            }
            return (self.old_phi_z_star, 0.0, gamma);
        }

        // A real maneuver: pre-compute the sail trajectory and plan the
        // turn. The post-turn apparent angle is approximated by the true
        // wind seen from the target heading.
        let predicted_app = symmetric_rad(alpha_true - sailable);
        let new_gamma = self.sail.best_gamma_sail(predicted_app, mag_app);
        let delta_gamma = match maneuver {
            // The sail crosses the centre line through zero.
            Maneuver::Jibe => -sign_not_zero(old_gamma_sail)
                * (old_gamma_sail.abs() + new_gamma.abs()),
            _ => delta_rad(old_gamma_sail, new_gamma),
        };
        let mut duration_s = turn.abs() / ALPHA_STAR_RATE_LIMIT_RAD_S;
        if maneuver == Maneuver::Jibe {
            duration_s += delta_gamma.abs() / SAIL_DRIVE_RATE_RAD_S;
        }
        info!(
            "{maneuver}: {:.0}° -> {:.0}° over {:.1}s, sail {:.0}° -> {:.0}°",
            self.old_phi_z_star.to_degrees(),
            sailable.to_degrees(),
            duration_s,
            old_gamma_sail.to_degrees(),
            new_gamma.to_degrees()
        );
        self.reference.set(self.old_phi_z_star, old_gamma_sail);
        self.reference.new_plan(sailable, delta_gamma, duration_s);
        self.running_maneuver = Some(maneuver);
        let (phi, omega, gamma) = self.reference.get();
        self.old_phi_z_star = phi;
        self.old_gamma_sail = gamma;
        (phi, omega, gamma)
    }

    /// Sail trim for the current (non-maneuvering) reference heading.
    /// Normally the planned apparent wind does; close hauled, the measured
    /// wind is the authority and a luffing guard holds the sail's side.
    fn trimmed_gamma_sail(
        &mut self,
        phi_z_star: f64,
        alpha_true: f64,
        angle_app: f64,
        mag_app: f64,
        old_gamma_sail: f64,
    ) -> f64 {
        let head_to_wind = symmetric_rad(alpha_true + PI);
        let off_the_wind = delta_rad(phi_z_star, head_to_wind).abs();
        let close_hauled =
            off_the_wind <= crate::polar_diagram::TACK_ZONE_RAD + CLOSE_HAULED_LIMIT_RAD;
        if close_hauled {
            if angle_app.abs() > PI - CLOSE_HAULED_APP_BAND_RAD {
                sign_not_zero(old_gamma_sail) * CLOSE_HAULED_SAIL_RAD
            } else {
                self.sail.best_stabilized_gamma_sail(angle_app, mag_app)
            }
        } else {
            let predicted_app = symmetric_rad(alpha_true - phi_z_star);
            self.sail.best_stabilized_gamma_sail(predicted_app, mag_app)
        }
    }
}

impl Controller for NormalController {
    fn entry(&mut self, input: &ControllerInput, filtered: &FilteredMeasurements) {
        self.old_phi_z_star = filtered.phi_z_boat;
        self.old_gamma_sail = input.drives.gamma_sail_rad;
        self.reference
            .set(filtered.phi_z_boat, input.drives.gamma_sail_rad);
        self.rudder.reset();
        self.sail.reset();
        self.running_maneuver = None;
        self.give_up_ticks = 0;
        self.offset_filter.reset();
        self.fallen_off_rad = 0.0;
        debug!(
            "normal: entry at heading {:.0}°",
            filtered.phi_z_boat.to_degrees()
        );
    }

    fn run(
        &mut self,
        input: &ControllerInput,
        filtered: &FilteredMeasurements,
        out: &mut ControllerOutput,
    ) {
        let alpha_star = input.alpha_star_rad.unwrap_or(self.old_phi_z_star);
        let old_gamma_sail = self.old_gamma_sail;
        let (phi_z_star, omega_z_star, gamma_sail_star) = self.shape_reference_value(
            alpha_star,
            filtered.alpha_true,
            filtered.mag_true,
            filtered.phi_z_boat,
            filtered.mag_boat,
            filtered.angle_app,
            filtered.mag_app,
            old_gamma_sail,
            out,
        );

        let gamma_rudder = self.rudder.control(
            phi_z_star,
            omega_z_star,
            filtered.phi_z_boat,
            filtered.omega_boat,
            filtered.v_x_boat,
        );

        out.drives_reference.gamma_rudder_star_left_rad = gamma_rudder;
        out.drives_reference.gamma_rudder_star_right_rad = gamma_rudder;
        out.drives_reference.gamma_sail_star_rad = gamma_sail_star;
        out.drives_reference.clamp_to_limits();
    }

    fn exit(&mut self) {
        self.running_maneuver = None;
    }

    fn name(&self) -> &'static str {
        "Normal"
    }
}
