//! # helmsman
//!
//! Periodic control core of the autonomous sailing vessel: every 100 ms it
//! fuses the raw sensor records from the bus into filtered wind, heading and
//! speed estimates and computes three actuator set points — left rudder,
//! right rudder and sail boom angle — that steer the boat toward the desired
//! heading α* from the route planner while respecting the physics of sailing
//! (no-go zones, tack/jibe planning, wing vs. spinnaker trim, storm limits,
//! braking, docking and manual override).
//!
//! Module map, leaves first:
//! - [`angles`] / [`filters`]: angle arithmetic and filter primitives
//! - [`compass`] / [`wind`]: tilt-compensated bearing, apparent/true wind math
//! - [`drive`]: actuator reference and actual values
//! - [`polar_diagram`] / [`maneuver`]: sailable headings and maneuver typing
//! - [`sail_controller`] / [`rudder_controller`] / [`reference_values`]:
//!   the inner control laws
//! - [`normal_controller`] plus the fixed-output controllers in
//!   [`simple_controllers`] and [`initial_controller`]
//! - [`filter_block`] / [`ship_control`]: sensor fusion and the supervisor
//! - [`bus`]: record ↔ controller-input plumbing used by `main`

pub mod angles;
pub mod bus;
pub mod compass;
pub mod config;
pub mod controller;
pub mod drive;
pub mod filter_block;
pub mod filters;
pub mod initial_controller;
pub mod maneuver;
pub mod normal_controller;
pub mod polar_diagram;
pub mod reference_values;
pub mod rudder_controller;
pub mod sail_controller;
pub mod ship_control;
pub mod simple_controllers;
pub mod wind;

/// Controller sampling period in seconds. The whole control design (filter
/// time constants, anti-windup, maneuver plans) assumes this tick.
pub const SAMPLING_PERIOD: f64 = 0.1;

/// How often the `skipper_input:` record goes out, in seconds.
pub const SKIPPER_UPDATE_PERIOD: f64 = 60.0;

/// How often the `helmsman_st:` record goes out, in seconds.
pub const STATUS_UPDATE_PERIOD: f64 = 2.0;
