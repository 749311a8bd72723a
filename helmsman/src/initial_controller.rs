//! Getting under way from an arbitrary attitude.
//!
//! Until the wind has been watched long enough to know the true direction,
//! the boat only needs to move somehow. Three phases:
//! - Sleep: hold everything still while the filters settle.
//! - Turtle: the bow points into the no-go zone; back out of it with
//!   opposed rudder and a small fixed angle of attack.
//! - Kogge: sail crudely with the wind abeam (sail square at ±90°, bang-bang
//!   rudder on the mast-frame wind angle) until the supervisor has enough
//!   data to hand over to the normal controller.

use std::f64::consts::{FRAC_PI_2, PI};

use tracing::{debug, info};

use crate::angles::{delta_rad, sign_not_zero, symmetric_rad};
use crate::controller::{Controller, ControllerInput, ControllerOutput};
use crate::filter_block::FilteredMeasurements;
use crate::polar_diagram::TACK_ZONE_RAD;
use crate::SAMPLING_PERIOD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Sleep,
    Turtle,
    Kogge,
}

const SLEEP_S: f64 = 10.0;
const TURTLE_RUDDER_RAD: f64 = 15.0 * PI / 180.0;
const TURTLE_AOA_RAD: f64 = 10.0 * PI / 180.0;
const KOGGE_RUDDER_RAD: f64 = 10.0 * PI / 180.0;
/// Wind abeam is held when the mast-frame error stays inside this band.
const KOGGE_HELD_BAND_RAD: f64 = 15.0 * PI / 180.0;
const KOGGE_HELD_S: f64 = 5.0;

#[derive(Debug)]
pub struct InitialController {
    phase: Phase,
    gamma_sign: f64,
    count: u32,
    held_count: u32,
}

impl InitialController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Sleep,
            gamma_sign: 1.0,
            count: 0,
            held_count: 0,
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Sleep;
        self.gamma_sign = 1.0;
        self.count = 0;
        self.held_count = 0;
    }

    /// Decide Turtle vs. Kogge and the working side from the mast-frame
    /// apparent wind angle.
    fn phase_choice(&mut self, angle_sail_rad: f64) {
        self.gamma_sign = -sign_not_zero(angle_sail_rad);
        self.phase = if angle_sail_rad.abs() > PI - TACK_ZONE_RAD {
            Phase::Turtle
        } else {
            Phase::Kogge
        };
        info!(
            "initial: {} with sign {:+.0}",
            if self.phase == Phase::Turtle { "turtle" } else { "kogge" },
            self.gamma_sign
        );
    }
}

impl Default for InitialController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for InitialController {
    fn entry(&mut self, _input: &ControllerInput, _filtered: &FilteredMeasurements) {
        self.reset();
    }

    fn run(
        &mut self,
        input: &ControllerInput,
        filtered: &FilteredMeasurements,
        out: &mut ControllerOutput,
    ) {
        let mut gamma_sail = 0.0;
        let mut gamma_rudder = 0.0;

        if !filtered.valid {
            debug!("initial: filters not ready");
            return;
        }
        if !input.drives.all_homed() {
            debug!("initial: drives not ready");
            return;
        }

        let angle_sail = symmetric_rad(filtered.angle_aoa);

        match self.phase {
            Phase::Sleep => {
                self.count += 1;
                if f64::from(self.count) > SLEEP_S / SAMPLING_PERIOD {
                    self.count = 0;
                    self.phase_choice(angle_sail);
                }
            }
            Phase::Turtle => {
                gamma_rudder = TURTLE_RUDDER_RAD * -self.gamma_sign;
                // Small fixed angle of attack off the apparent wind drives
                // the boat backwards out of the no-go zone.
                gamma_sail =
                    symmetric_rad(filtered.angle_app + TURTLE_AOA_RAD * -self.gamma_sign - PI);
                if angle_sail.abs() <= PI - TACK_ZONE_RAD {
                    info!("initial: turtle cleared the no-go zone, kogge");
                    self.phase = Phase::Kogge;
                }
            }
            Phase::Kogge => {
                gamma_sail = self.gamma_sign * FRAC_PI_2;
                let eps = delta_rad(angle_sail, self.gamma_sign * FRAC_PI_2);
                gamma_rudder = if eps < 0.0 {
                    KOGGE_RUDDER_RAD
                } else {
                    -KOGGE_RUDDER_RAD
                };
                if eps.abs() < KOGGE_HELD_BAND_RAD {
                    self.held_count += 1;
                } else {
                    self.held_count = 0;
                }
            }
        }

        out.drives_reference.gamma_sail_star_rad = gamma_sail;
        out.drives_reference.gamma_rudder_star_left_rad = gamma_rudder;
        out.drives_reference.gamma_rudder_star_right_rad = gamma_rudder;
    }

    fn done(&self) -> bool {
        self.phase == Phase::Kogge && f64::from(self.held_count) > KOGGE_HELD_S / SAMPLING_PERIOD
    }

    fn name(&self) -> &'static str {
        "Initial"
    }
}
