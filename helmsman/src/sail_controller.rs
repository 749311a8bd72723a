//! Optimal sail (boom) angle from the apparent wind.
//!
//! Two trim regimes: WING has the sail working as an airfoil at the optimal
//! angle of attack (upwind and reaching); SPINNAKER sets it broad for
//! maximum drag running downwind. The switch between them is hysteretic so
//! wind jitter around the switchpoint cannot shuttle the sail drive.

use std::f64::consts::PI;

use tracing::debug;

use crate::angles::{sign_not_zero, symmetric_rad};
use crate::SAMPLING_PERIOD;

/// Middle of the mode hysteresis. Measured optima sit at 73.5° (3 m/s) down
/// to 68.5° (12 m/s); 72.5° is the compromise.
pub const SWITCHPOINT_RAD: f64 = 72.5 * PI / 180.0;
/// Half width of the mode hysteresis, well below half the jibe zone.
pub const HALF_HYSTERESIS_RAD: f64 = 5.0 * PI / 180.0;
/// 93° because the sail's drag curve is slightly asymmetric.
pub const DRAG_MAX_RAD: f64 = 93.0 * PI / 180.0;
/// Above this wind speed the spinnaker trim would push the bow down and
/// overload the mast; wing trim only.
pub const SPINNAKER_WIND_LIMIT_M_S: f64 = 10.0;
/// Above this wind speed the angle of attack shrinks quadratically.
pub const AOA_REDUCTION_LIMIT_M_S: f64 = 14.0;
/// Delayed mode switches wait this long near the switchpoint.
pub const SWITCH_BACK_DELAY_S: f64 = 20.0;
/// The sail side has inertia: the apparent wind must cross zero by this
/// much before the sail swings to the other board.
const SIGN_HYSTERESIS_RAD: f64 = 35.0 * PI / 180.0;

const AOA_DEFAULT_RAD: f64 = 20.0 * PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SailMode {
    /// Sail trimmed as an airfoil, for sailing at the wind.
    Wing,
    /// As Wing, but the spinnaker switch is disabled (storm).
    WingLocked,
    /// Broad trim for the run.
    Spinnaker,
}

/// Mode selection with hysteresis and switch-back delay.
#[derive(Debug, Clone)]
pub struct SailModeLogic {
    mode: SailMode,
    delay_counter: u32,
}

impl SailModeLogic {
    pub fn new() -> Self {
        Self {
            mode: SailMode::Wing,
            delay_counter: 0,
        }
    }

    /// Memoryless choice; still honours the wing lock.
    pub fn best_mode(&mut self, apparent_abs_rad: f64, wind_m_s: f64) -> SailMode {
        if self.mode == SailMode::WingLocked {
            return SailMode::WingLocked;
        }
        self.mode = if apparent_abs_rad < SWITCHPOINT_RAD && wind_m_s < SPINNAKER_WIND_LIMIT_M_S {
            SailMode::Spinnaker
        } else {
            SailMode::Wing
        };
        self.mode
    }

    /// Hysteretic choice: an excursion beyond twice the half hysteresis
    /// switches at once, one beyond a single half hysteresis only after the
    /// switch-back delay.
    pub fn best_stabilized_mode(&mut self, apparent_abs_rad: f64, wind_m_s: f64) -> SailMode {
        let delay = (SWITCH_BACK_DELAY_S / SAMPLING_PERIOD + 0.5) as u32;
        match self.mode {
            SailMode::WingLocked => SailMode::WingLocked,
            _ if wind_m_s > SPINNAKER_WIND_LIMIT_M_S => SailMode::Wing,
            SailMode::Wing => {
                let far = apparent_abs_rad <= SWITCHPOINT_RAD - 2.0 * HALF_HYSTERESIS_RAD;
                let near = apparent_abs_rad < SWITCHPOINT_RAD - HALF_HYSTERESIS_RAD;
                if near && !far {
                    self.delay_counter += 1;
                }
                if far || (near && self.delay_counter > delay) {
                    self.mode = SailMode::Spinnaker;
                    self.delay_counter = 0;
                    debug!("sail mode: switched to spinnaker");
                }
                self.mode
            }
            SailMode::Spinnaker => {
                let far = apparent_abs_rad >= SWITCHPOINT_RAD + 2.0 * HALF_HYSTERESIS_RAD;
                let near = apparent_abs_rad > SWITCHPOINT_RAD + HALF_HYSTERESIS_RAD;
                if near && !far {
                    self.delay_counter += 1;
                }
                if far || (near && self.delay_counter > delay) {
                    self.mode = SailMode::Wing;
                    self.delay_counter = 0;
                    debug!("sail mode: switched to wing");
                }
                self.mode
            }
        }
    }

    pub fn lock_in_wing_mode(&mut self) {
        self.mode = SailMode::WingLocked;
    }

    pub fn unlock(&mut self) {
        self.mode = SailMode::Wing;
    }

    pub fn mode(&self) -> SailMode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.mode = SailMode::Wing;
        self.delay_counter = 0;
    }
}

impl Default for SailModeLogic {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct SailController {
    optimal_aoa_rad: f64,
    logic: SailModeLogic,
    sign: f64,
}

impl SailController {
    pub fn new() -> Self {
        Self {
            optimal_aoa_rad: AOA_DEFAULT_RAD,
            logic: SailModeLogic::new(),
            sign: 1.0,
        }
    }

    pub fn set_optimal_angle_of_attack(&mut self, aoa_rad: f64) {
        self.optimal_aoa_rad = aoa_rad;
    }

    pub fn optimal_angle_of_attack(&self) -> f64 {
        self.optimal_aoa_rad
    }

    /// Optimal angle of attack, reduced at high wind: the sail forces grow
    /// with the square of the wind speed, so the angle shrinks with its
    /// inverse square above the reduction limit.
    pub fn angle_of_attack(&self, mag_wind: f64) -> f64 {
        if mag_wind < AOA_REDUCTION_LIMIT_M_S {
            self.optimal_aoa_rad
        } else {
            self.optimal_aoa_rad * AOA_REDUCTION_LIMIT_M_S * AOA_REDUCTION_LIMIT_M_S
                / (mag_wind * mag_wind)
        }
    }

    /// Optimal sail angle for an apparent wind at `alpha_wind_rad` (TO-vector
    /// direction in the boat frame, symmetric) and speed `mag_wind` ≥ 0.
    pub fn best_gamma_sail(&mut self, alpha_wind_rad: f64, mag_wind: f64) -> f64 {
        self.gamma_sail(alpha_wind_rad, mag_wind, false)
    }

    /// As [`Self::best_gamma_sail`] but with mode hysteresis and an inert
    /// sail side, for use in the periodic loop.
    pub fn best_stabilized_gamma_sail(&mut self, alpha_wind_rad: f64, mag_wind: f64) -> f64 {
        self.gamma_sail(alpha_wind_rad, mag_wind, true)
    }

    /// Sail angle when the boat is moving backwards: the profile works
    /// mirrored around π. At low wind the sail centres athwartships.
    pub fn best_gamma_sail_for_reverse_motion(&mut self, alpha_wind_rad: f64, mag_wind: f64) -> f64 {
        if mag_wind < 0.5 {
            return PI / 2.0;
        }
        let alpha = symmetric_rad(alpha_wind_rad);
        let sign = sign_not_zero(alpha);
        let alpha = alpha.abs();
        let gamma = if alpha < PI - SWITCHPOINT_RAD || mag_wind > SPINNAKER_WIND_LIMIT_M_S {
            PI - alpha + self.angle_of_attack(mag_wind)
        } else {
            PI / 2.0
        };
        symmetric_rad(-sign * gamma)
    }

    fn gamma_sail(&mut self, alpha_wind_rad: f64, mag_wind: f64, stabilized: bool) -> f64 {
        let alpha = self.handle_sign(symmetric_rad(alpha_wind_rad), stabilized);

        // Lower limit to avoid nuisance sail motor activity in a calm.
        if mag_wind == 0.0 {
            return 0.0;
        }

        let mode = if stabilized {
            self.logic.best_stabilized_mode(alpha, mag_wind)
        } else {
            self.logic.best_mode(alpha, mag_wind)
        };

        let gamma = match mode {
            SailMode::Wing | SailMode::WingLocked => alpha - PI + self.angle_of_attack(mag_wind),
            SailMode::Spinnaker => 0.5 * alpha - DRAG_MAX_RAD,
        };

        symmetric_rad(self.sign * gamma)
    }

    /// Fold the wind angle onto the held side. Without stabilization the
    /// side follows the wind immediately; with it, the wind has to cross
    /// zero by the sign hysteresis first, so near the dead run the formulas
    /// extend continuously to slightly negative angles instead of slamming
    /// the sail across.
    fn handle_sign(&mut self, alpha_wind_rad: f64, stabilized: bool) -> f64 {
        if stabilized {
            if self.sign * alpha_wind_rad < -SIGN_HYSTERESIS_RAD {
                self.sign = sign_not_zero(alpha_wind_rad);
            }
        } else {
            self.sign = sign_not_zero(alpha_wind_rad);
        }
        self.sign * alpha_wind_rad
    }

    pub fn lock_in_wing_mode(&mut self) {
        self.logic.lock_in_wing_mode();
    }

    pub fn unlock_mode(&mut self) {
        self.logic.unlock();
    }

    pub fn mode(&self) -> SailMode {
        self.logic.mode()
    }

    /// Back to the power-up state; the configured angle of attack stays.
    pub fn reset(&mut self) {
        self.logic.reset();
        self.sign = 1.0;
    }
}

impl Default for SailController {
    fn default() -> Self {
        Self::new()
    }
}
