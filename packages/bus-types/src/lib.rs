//! # bus-types
//!
//! Shared wire-record structures for the helmsman bus.
//!
//! Every record is one line of text terminated by `\n`: a leading kind token
//! (`wind:`, `imu:`, `rudderctl:`, ...) followed by space-separated
//! `key:value` pairs. Floats are printed with Rust's shortest round-trip
//! representation, so a record survives a text round trip bit-exactly.
//! Missing or un-homed values travel as `NaN`.
//!
//! These types are used by:
//! - `helmsman`: the control daemon, consuming sensor records and emitting
//!   actuator and status records
//! - the drive daemons, wind sensor daemon and route planner on the other
//!   side of the bus
//!
//! ## Conventions
//!
//! - **Boat frame**: x = bow, y = starboard, z = down; positive rotation
//!   turns the bow to starboard.
//! - Angles on the wire are degrees; the controller converts to radians at
//!   the boundary.
//! - Timestamps are milliseconds since the epoch (`remote:` uses seconds,
//!   matching the remote-control client).

mod linebuffer;
mod records;

pub use linebuffer::LineBuffer;
pub use records::{
    BusRecord, CompassRecord, DriveStatusRecord, GpsRecord, HelmRecord, HelmsmanStatusRecord,
    ImuRecord, RecordError, RemoteCommand, RemoteRecord, RudderCtlRecord, SkipperInputRecord,
    StatusLeftRecord, StatusRightRecord, StatusSailRecord, WindRecord,
};
