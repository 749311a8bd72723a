//! Heading control through the twin rudders.
//!
//! Full state feedback over yaw rate, heading error and the clamped heading
//! error integral produces a correcting torque; the torque is translated
//! into a rudder angle through the NACA-0010 lift curve so the control
//! plant stays approximately linear across boat speeds. A feed-forward term
//! aligns the rudder with the expected water flow during commanded turns.

use std::f64::consts::PI;

use crate::angles::symmetric_rad;
use crate::SAMPLING_PERIOD;

/// Distance from the centre of gravity to the rudder axis, meters.
pub const LEVER_R_M: f64 = 1.43;
/// Twin rudders.
pub const RUDDER_COUNT: f64 = 2.0;
/// Wetted area of one rudder blade, m².
pub const RUDDER_AREA_M2: f64 = 0.085;
/// Sea water.
pub const RHO_WATER_KG_M3: f64 = 1030.0;

/// NACA-0010 profile data for the rudder blades.
pub mod naca0010 {
    use std::f64::consts::PI;

    /// Lift slope before the stall, per radian.
    pub const C_LIFT_PER_RAD: f64 = 0.1118 * 180.0 / PI;
    /// The profile driven backwards has a much poorer slope.
    pub const C_LIFT_PER_RAD_REVERSE: f64 = 0.052 * 180.0 / PI;

    /// Stall margin: below speed N we allow angle limit N.
    pub const ALPHA_LIMIT_1_RAD: f64 = 7.0 * PI / 180.0;
    pub const SPEED_1_M_S: f64 = 0.5;
    pub const ALPHA_LIMIT_2_RAD: f64 = 8.0 * PI / 180.0;
    pub const SPEED_2_M_S: f64 = 1.5;
    pub const ALPHA_LIMIT_3_RAD: f64 = 9.0 * PI / 180.0;
    pub const SPEED_3_M_S: f64 = 3.0;
    pub const ALPHA_LIMIT_4_RAD: f64 = 10.0 * PI / 180.0;

    /// Speed-dependent stall limit. Unknown and reverse speeds get the
    /// least restrictive limit; the only harm it can do is speed loss.
    pub fn rudder_limit(speed_m_s: f64) -> f64 {
        if !speed_m_s.is_finite() || speed_m_s < 0.0 {
            ALPHA_LIMIT_4_RAD
        } else if speed_m_s < SPEED_1_M_S {
            ALPHA_LIMIT_1_RAD
        } else if speed_m_s < SPEED_2_M_S {
            ALPHA_LIMIT_2_RAD
        } else if speed_m_s < SPEED_3_M_S {
            ALPHA_LIMIT_3_RAD
        } else {
            ALPHA_LIMIT_4_RAD
        }
    }
}

/// Lift coefficient → rudder angle through the (linearised) lift curve,
/// saturated at the speed-dependent stall limit. The second return value is
/// −1/0/+1 for saturation at the lower/no/upper limit.
pub fn c_lift_to_rudder_angle(c_lift: f64, speed_m_s: f64) -> (f64, i8) {
    let limit = naca0010::rudder_limit(speed_m_s);
    let per_rad = if !speed_m_s.is_finite() || speed_m_s < 0.0 {
        naca0010::C_LIFT_PER_RAD_REVERSE
    } else {
        naca0010::C_LIFT_PER_RAD
    };
    let alpha = c_lift / per_rad;
    if alpha < -limit {
        (-limit, -1)
    } else if alpha > limit {
        (limit, 1)
    } else {
        (alpha, 0)
    }
}

/// State feedback gains for a 5 s closed-loop response, over the state
/// vector [ωz, ϕz, ∫ϕz].
pub const STATE_FEEDBACK_1: f64 = 452.39;
pub const STATE_FEEDBACK_2: f64 = 563.75;
pub const STATE_FEEDBACK_3: f64 = 291.71;

/// Clamp for the water-flow feed-forward angle. For small speeds the flow
/// angle approaches infinity; 20° is a guess based on the lever length and
/// an estimated 20 m turning circle.
const LIMIT_GAMMA_0_RAD: f64 = 20.0 * PI / 180.0;

/// The integral state saturates at ±1 rad·s.
const INTEGRAL_LIMIT: f64 = 1.0;

/// Below this speed through the water the lift model is meaningless and the
/// controller holds its previous output.
const MIN_CONTROL_SPEED_M_S: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct RudderController {
    state_feedback: [f64; 3],
    feed_forward: bool,
    /// Saturation side of the last output: −1, 0 or +1.
    limited: i8,
    /// Clamped integral of the heading error, the artificial state that
    /// buys steady-state accuracy.
    eps_integral_phi: f64,
    last_output_rad: f64,
}

impl RudderController {
    pub fn new() -> Self {
        Self::with_feedback(STATE_FEEDBACK_1, STATE_FEEDBACK_2, STATE_FEEDBACK_3, true)
    }

    /// Custom gains, used by the config wiring and the tests.
    pub fn with_feedback(k1: f64, k2: f64, k3: f64, feed_forward: bool) -> Self {
        Self {
            state_feedback: [k1, k2, k3],
            feed_forward,
            limited: 0,
            eps_integral_phi: 0.0,
            last_output_rad: 0.0,
        }
    }

    /// Saturation side of the last tick.
    pub fn limited(&self) -> i8 {
        self.limited
    }

    /// One control step. `speed_m_s` is the boat speed through the water,
    /// signed (negative when making sternway). Returns the commanded rudder
    /// angle; both rudders receive it identically.
    pub fn control(
        &mut self,
        phi_z_star_rad: f64,
        omega_z_star_rad_s: f64,
        phi_z_rad: f64,
        omega_z_rad_s: f64,
        speed_m_s: f64,
    ) -> f64 {
        if !speed_m_s.is_finite() || speed_m_s.abs() < MIN_CONTROL_SPEED_M_S {
            // No meaningful flow over the blades; hold the last command.
            return self.last_output_rad;
        }

        let eps_omega = omega_z_star_rad_s - omega_z_rad_s;
        // Normalisation is essential to cope with going through 180°.
        let eps_phi = symmetric_rad(phi_z_star_rad - phi_z_rad);

        // Anti-windup: the integrator only fills while the output is not
        // already saturated in the same direction.
        if eps_phi * f64::from(self.limited) <= 0.0 {
            self.eps_integral_phi += SAMPLING_PERIOD * eps_phi;
        }
        self.eps_integral_phi = self.eps_integral_phi.clamp(-INTEGRAL_LIMIT, INTEGRAL_LIMIT);
        if eps_phi.abs() > PI / 2.0 {
            self.eps_integral_phi = 0.0;
        }

        let torque = eps_omega * self.state_feedback[0]
            + eps_phi * self.state_feedback[1]
            + self.eps_integral_phi * self.state_feedback[2];

        let (gamma_lift, limited) = Self::torque_to_gamma_rudder(torque, speed_m_s);
        self.limited = limited;

        // Water flow angle seen by a rudder when the boat turns at the
        // commanded rate; using the reference rate because it is the
        // cleaner signal. z points down, so positive ω needs negative γ0.
        let mut gamma_0 = -(omega_z_star_rad_s * LEVER_R_M).atan2(speed_m_s);
        if speed_m_s < 0.0 {
            // The profile works mirrored when the flow comes from astern.
            gamma_0 = symmetric_rad(gamma_0 - PI);
        }
        gamma_0 = gamma_0.clamp(-LIMIT_GAMMA_0_RAD, LIMIT_GAMMA_0_RAD);

        let out = if self.feed_forward {
            gamma_0 - gamma_lift
        } else {
            -gamma_lift
        };
        self.last_output_rad = out;
        out
    }

    /// Linearise the plant: torque → blade force at the lever → lift
    /// coefficient at the current dynamic pressure → blade angle.
    fn torque_to_gamma_rudder(torque_nm: f64, speed_m_s: f64) -> (f64, i8) {
        let force = torque_nm / LEVER_R_M;
        let c_lift =
            2.0 * force / (RUDDER_COUNT * RUDDER_AREA_M2 * RHO_WATER_KG_M3 * speed_m_s * speed_m_s);
        c_lift_to_rudder_angle(c_lift, speed_m_s)
    }

    /// Drop the integral state and the saturation memory.
    pub fn reset(&mut self) {
        self.eps_integral_phi = 0.0;
        self.limited = 0;
        self.last_output_rad = 0.0;
    }
}

impl Default for RudderController {
    fn default() -> Self {
        Self::new()
    }
}
