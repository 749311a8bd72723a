//! Fixed-output controllers: emergency brake, docking, idle, and the drive
//! checkout sweep.

use std::f64::consts::PI;

use tracing::debug;

use crate::angles::{rate_limit, symmetric_rad};
use crate::controller::{Controller, ControllerInput, ControllerOutput};
use crate::filter_block::FilteredMeasurements;
use crate::SAMPLING_PERIOD;

/// Rudders hard over against each other; enough drag to stop the boat
/// without blocking the shafts.
pub const RUDDER_BRAKE_ANGLE_RAD: f64 = 80.0 * PI / 180.0;

/// Stops the boat in emergency situations. Rudders at ±80°, sail turned
/// into the flag position so it produces as little force as possible.
#[derive(Debug, Default)]
pub struct BrakeController;

impl Controller for BrakeController {
    fn run(
        &mut self,
        _input: &ControllerInput,
        filtered: &FilteredMeasurements,
        out: &mut ControllerOutput,
    ) {
        out.drives_reference.gamma_rudder_star_left_rad = RUDDER_BRAKE_ANGLE_RAD;
        out.drives_reference.gamma_rudder_star_right_rad = -RUDDER_BRAKE_ANGLE_RAD;
        // Luffing position of the latest apparent wind estimate; 0 if the
        // wind has never been seen.
        out.drives_reference.gamma_sail_star_rad = if filtered.mag_app > 0.0 {
            symmetric_rad(filtered.angle_app - PI)
        } else {
            0.0
        };
        debug!(
            "brake: rudders at ±80°, sail luffing at {:.1}°",
            out.drives_reference.gamma_sail_star_rad.to_degrees()
        );
    }

    fn name(&self) -> &'static str {
        "Brake"
    }
}

/// Everything straight and centred so the boat can be craned or towed.
#[derive(Debug, Default)]
pub struct DockingController;

impl Controller for DockingController {
    fn run(
        &mut self,
        _input: &ControllerInput,
        _filtered: &FilteredMeasurements,
        out: &mut ControllerOutput,
    ) {
        out.drives_reference.gamma_rudder_star_left_rad = 0.0;
        out.drives_reference.gamma_rudder_star_right_rad = 0.0;
        out.drives_reference.gamma_sail_star_rad = 0.0;
    }

    fn name(&self) -> &'static str {
        "Docking"
    }
}

/// No commands at all; the main loop suppresses `rudderctl:` output while
/// idling so the drives power down.
#[derive(Debug, Default)]
pub struct IdleController;

impl Controller for IdleController {
    fn run(
        &mut self,
        _input: &ControllerInput,
        _filtered: &FilteredMeasurements,
        _out: &mut ControllerOutput,
    ) {
    }

    fn name(&self) -> &'static str {
        "Idle"
    }
}

/// Drive and sensor checkout: one slow sweep of rudders and sail to +20°,
/// −20° and back to centre, inside every drive's mechanical envelope, then
/// done. Selected at startup by config for dockside tests.
#[derive(Debug)]
pub struct TestController {
    targets: &'static [f64],
    stage: usize,
    gamma_rad: f64,
}

const SWEEP_RATE_RAD_S: f64 = 10.0 * PI / 180.0;
const SWEEP_TARGETS_RAD: [f64; 3] = [20.0 * PI / 180.0, -20.0 * PI / 180.0, 0.0];

impl TestController {
    pub fn new() -> Self {
        Self {
            targets: &SWEEP_TARGETS_RAD,
            stage: 0,
            gamma_rad: 0.0,
        }
    }
}

impl Default for TestController {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller for TestController {
    fn entry(&mut self, _input: &ControllerInput, _filtered: &FilteredMeasurements) {
        self.stage = 0;
        self.gamma_rad = 0.0;
    }

    fn run(
        &mut self,
        _input: &ControllerInput,
        _filtered: &FilteredMeasurements,
        out: &mut ControllerOutput,
    ) {
        if let Some(&target) = self.targets.get(self.stage) {
            rate_limit(target, SWEEP_RATE_RAD_S * SAMPLING_PERIOD, &mut self.gamma_rad);
            if (self.gamma_rad - target).abs() < 1e-9 {
                self.stage += 1;
            }
        }
        out.drives_reference.gamma_rudder_star_left_rad = self.gamma_rad;
        out.drives_reference.gamma_rudder_star_right_rad = self.gamma_rad;
        out.drives_reference.gamma_sail_star_rad = self.gamma_rad;
    }

    fn done(&self) -> bool {
        self.stage >= self.targets.len()
    }

    fn name(&self) -> &'static str {
        "Test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn brake_luffs_the_sail_into_the_apparent_wind() {
        let mut c = BrakeController;
        let input = ControllerInput::default();
        let mut filtered = FilteredMeasurements::default();
        filtered.angle_app = 0.3;
        filtered.mag_app = 5.0;
        let mut out = ControllerOutput::default();
        c.run(&input, &filtered, &mut out);
        assert_relative_eq!(
            out.drives_reference.gamma_rudder_star_left_rad,
            RUDDER_BRAKE_ANGLE_RAD
        );
        assert_relative_eq!(
            out.drives_reference.gamma_rudder_star_right_rad,
            -RUDDER_BRAKE_ANGLE_RAD
        );
        assert_relative_eq!(
            out.drives_reference.gamma_sail_star_rad,
            symmetric_rad(0.3 - PI),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_controller_sweeps_and_finishes() {
        let mut c = TestController::new();
        let input = ControllerInput::default();
        let filtered = FilteredMeasurements::default();
        let mut out = ControllerOutput::default();
        let mut max_seen = 0.0_f64;
        let mut min_seen = 0.0_f64;
        // 20° out, 40° across, 20° back at 10°/s is 8 s; leave margin.
        for _ in 0..1500 {
            c.run(&input, &filtered, &mut out);
            max_seen = max_seen.max(out.drives_reference.gamma_sail_star_rad);
            min_seen = min_seen.min(out.drives_reference.gamma_sail_star_rad);
            assert_eq!(
                out.drives_reference.gamma_rudder_star_left_rad,
                out.drives_reference.gamma_rudder_star_right_rad
            );
        }
        assert!(c.done());
        assert_relative_eq!(max_seen, 20.0 * PI / 180.0, epsilon = 1e-9);
        assert_relative_eq!(min_seen, -20.0 * PI / 180.0, epsilon = 1e-9);
        assert_relative_eq!(out.drives_reference.gamma_sail_star_rad, 0.0, epsilon = 1e-9);
    }
}
