//! Sailable headings: the no-go zones around the wind and the sector
//! classification of a desired heading.
//!
//! The boat cannot sail within the tack zone of ±45° about head-to-wind nor
//! within the jibe zone of ±20° about the dead run. A desired heading inside
//! a forbidden zone maps to the nearer zone boundary; a small retention
//! hysteresis keeps the chosen boundary stable against α* jitter.

use std::f64::consts::PI;

use crate::angles::{delta_rad, nearest_rad, symmetric_rad};

pub const TACK_ZONE_RAD: f64 = 45.0 * PI / 180.0;
pub const JIBE_ZONE_HALF_RAD: f64 = 20.0 * PI / 180.0;
const RETENTION_HYSTERESIS_RAD: f64 = 5.0 * PI / 180.0;

/// Where a desired heading lies relative to the true wind. `Star` variants
/// have the heading clockwise of the downwind direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sector {
    TackPort,
    TackStar,
    ReachStar,
    JibeStar,
    JibePort,
    ReachPort,
}

/// Classify `alpha_star` against the true wind TO-direction `alpha_true`.
pub fn sector(alpha_star: f64, alpha_true: f64) -> Sector {
    let beta = delta_rad(alpha_true, alpha_star);
    if beta.abs() >= PI - TACK_ZONE_RAD {
        if beta >= 0.0 {
            Sector::TackStar
        } else {
            Sector::TackPort
        }
    } else if beta.abs() <= JIBE_ZONE_HALF_RAD {
        if beta >= 0.0 {
            Sector::JibeStar
        } else {
            Sector::JibePort
        }
    } else if beta >= 0.0 {
        Sector::ReachStar
    } else {
        Sector::ReachPort
    }
}

/// The two boundary headings of the zone a sector belongs to, or `None` on
/// a reach. Returned as (starboard option, port option).
fn zone_bounds(s: Sector, alpha_true: f64) -> Option<(f64, f64)> {
    match s {
        Sector::TackStar | Sector::TackPort => Some((
            symmetric_rad(alpha_true + (PI - TACK_ZONE_RAD)),
            symmetric_rad(alpha_true - (PI - TACK_ZONE_RAD)),
        )),
        Sector::JibeStar | Sector::JibePort => Some((
            symmetric_rad(alpha_true + JIBE_ZONE_HALF_RAD),
            symmetric_rad(alpha_true - JIBE_ZONE_HALF_RAD),
        )),
        Sector::ReachStar | Sector::ReachPort => None,
    }
}

/// Nearest sailable heading for `alpha_star`: α* verbatim on a reach, the
/// nearer zone boundary inside a forbidden zone.
pub fn sailable_heading(alpha_star: f64, alpha_true: f64) -> f64 {
    match zone_bounds(sector(alpha_star, alpha_true), alpha_true) {
        None => symmetric_rad(alpha_star),
        Some((star, port)) => nearest_rad(alpha_star, star, port).0,
    }
}

/// Like [`sailable_heading`], but retains the previously chosen boundary as
/// long as the other one is not shorter by more than the hysteresis margin,
/// so jitter around the zone centre cannot flip the output.
pub fn stable_sailable_heading(alpha_star: f64, alpha_true: f64, previous: f64) -> f64 {
    match zone_bounds(sector(alpha_star, alpha_true), alpha_true) {
        None => symmetric_rad(alpha_star),
        Some((star, port)) => {
            let (nearest, _) = nearest_rad(alpha_star, star, port);
            let other = if nearest == star { port } else { star };
            let held = delta_rad(previous, other).abs() < 1e-9;
            if held
                && delta_rad(alpha_star, other).abs()
                    <= delta_rad(alpha_star, nearest).abs() + RETENTION_HYSTERESIS_RAD
            {
                other
            } else {
                nearest
            }
        }
    }
}

/// Rough speed polar: relative boat speed for an angle to the wind (degrees
/// off the FROM-direction, 0 = head to wind, 180 = dead run) and a wind
/// speed. The hull tops out near 2.5 m/s. Returns the dead-zone flags along
/// with the achievable speed.
pub fn boat_speed_polar(angle_to_wind_deg: f64, wind_speed_m_s: f64) -> (bool, bool, f64) {
    let a = angle_to_wind_deg.abs().min(360.0 - angle_to_wind_deg.abs().min(360.0));
    let tack = a < TACK_ZONE_RAD.to_degrees();
    let jibe = a > 180.0 - JIBE_ZONE_HALF_RAD.to_degrees();
    if tack || jibe {
        return (tack, jibe, 0.0);
    }
    // Broad single-lobe fit: best around a beam-to-broad reach, falling off
    // toward both zone edges.
    let rel = ((a - 45.0) / (160.0 - 45.0) * PI).sin().max(0.0);
    let hull_limit = 2.5_f64;
    let speed = (0.3 * wind_speed_m_s).min(hull_limit) * rel;
    (false, false, speed)
}
