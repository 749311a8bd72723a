//! Bus record types and their line codec.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("unknown record kind `{0}`")]
    UnknownKind(String),
    #[error("{record}: missing field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("{record}: bad value `{value}` for `{field}`")]
    BadValue {
        record: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("empty line")]
    Empty,
}

// ── Field scanning ────────────────────────────────────────────────────────────

/// `key:value` pairs of one record body. Tokens without a colon are skipped;
/// the parsers only look keys up by name, so field order on the wire is free.
struct Fields<'a> {
    record: &'static str,
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Fields<'a> {
    fn scan(record: &'static str, body: &'a str) -> Self {
        let pairs = body
            .split_whitespace()
            .filter_map(|tok| tok.split_once(':'))
            .collect();
        Self { record, pairs }
    }

    fn raw(&self, field: &'static str) -> Result<&'a str, RecordError> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| *v)
            .ok_or(RecordError::MissingField {
                record: self.record,
                field,
            })
    }

    fn f64(&self, field: &'static str) -> Result<f64, RecordError> {
        let raw = self.raw(field)?;
        raw.parse().map_err(|_| RecordError::BadValue {
            record: self.record,
            field,
            value: raw.to_string(),
        })
    }

    fn u64(&self, field: &'static str) -> Result<u64, RecordError> {
        let raw = self.raw(field)?;
        raw.parse().map_err(|_| RecordError::BadValue {
            record: self.record,
            field,
            value: raw.to_string(),
        })
    }

    fn i64(&self, field: &'static str) -> Result<i64, RecordError> {
        let raw = self.raw(field)?;
        raw.parse().map_err(|_| RecordError::BadValue {
            record: self.record,
            field,
            value: raw.to_string(),
        })
    }

    fn u32(&self, field: &'static str) -> Result<u32, RecordError> {
        let raw = self.raw(field)?;
        raw.parse().map_err(|_| RecordError::BadValue {
            record: self.record,
            field,
            value: raw.to_string(),
        })
    }

    fn flag(&self, field: &'static str) -> Result<bool, RecordError> {
        Ok(self.i64(field)? != 0)
    }
}

// ── Input records ─────────────────────────────────────────────────────────────

/// `wind:` — apparent wind at the mast top, relative to the (rotating) mast.
/// `angle_deg` is where the wind comes FROM, `valid` is the sensor self check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindRecord {
    pub timestamp_ms: u64,
    pub angle_deg: f64,
    pub speed_m_s: f64,
    pub valid: bool,
}

impl WindRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("wind", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            angle_deg: f.f64("angle_deg")?,
            speed_m_s: f.f64("speed_m_s")?,
            valid: f.flag("valid")?,
        })
    }
}

impl fmt::Display for WindRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wind: timestamp_ms:{} angle_deg:{} speed_m_s:{} valid:{}",
            self.timestamp_ms,
            self.angle_deg,
            self.speed_m_s,
            self.valid as i32
        )
    }
}

/// `imu:` — the full inertial snapshot. Attitude and position may be `NaN`
/// individually; the filter block falls back to the magnetometer bearing when
/// the yaw is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImuRecord {
    pub timestamp_ms: u64,
    pub temp_c: f64,
    pub acc_x_m_s2: f64,
    pub acc_y_m_s2: f64,
    pub acc_z_m_s2: f64,
    pub gyr_x_rad_s: f64,
    pub gyr_y_rad_s: f64,
    pub gyr_z_rad_s: f64,
    pub mag_x_au: f64,
    pub mag_y_au: f64,
    pub mag_z_au: f64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    pub lat_deg: f64,
    pub lng_deg: f64,
    pub alt_m: f64,
    pub vel_x_m_s: f64,
    pub vel_y_m_s: f64,
    pub vel_z_m_s: f64,
}

impl ImuRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("imu", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            temp_c: f.f64("temp_c")?,
            acc_x_m_s2: f.f64("acc_x_m_s2")?,
            acc_y_m_s2: f.f64("acc_y_m_s2")?,
            acc_z_m_s2: f.f64("acc_z_m_s2")?,
            gyr_x_rad_s: f.f64("gyr_x_rad_s")?,
            gyr_y_rad_s: f.f64("gyr_y_rad_s")?,
            gyr_z_rad_s: f.f64("gyr_z_rad_s")?,
            mag_x_au: f.f64("mag_x_au")?,
            mag_y_au: f.f64("mag_y_au")?,
            mag_z_au: f.f64("mag_z_au")?,
            roll_deg: f.f64("roll_deg")?,
            pitch_deg: f.f64("pitch_deg")?,
            yaw_deg: f.f64("yaw_deg")?,
            lat_deg: f.f64("lat_deg")?,
            lng_deg: f.f64("lng_deg")?,
            alt_m: f.f64("alt_m")?,
            vel_x_m_s: f.f64("vel_x_m_s")?,
            vel_y_m_s: f.f64("vel_y_m_s")?,
            vel_z_m_s: f.f64("vel_z_m_s")?,
        })
    }
}

impl fmt::Display for ImuRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "imu: timestamp_ms:{} temp_c:{} \
             acc_x_m_s2:{} acc_y_m_s2:{} acc_z_m_s2:{} \
             gyr_x_rad_s:{} gyr_y_rad_s:{} gyr_z_rad_s:{} \
             mag_x_au:{} mag_y_au:{} mag_z_au:{} \
             roll_deg:{} pitch_deg:{} yaw_deg:{} \
             lat_deg:{} lng_deg:{} alt_m:{} \
             vel_x_m_s:{} vel_y_m_s:{} vel_z_m_s:{}",
            self.timestamp_ms,
            self.temp_c,
            self.acc_x_m_s2,
            self.acc_y_m_s2,
            self.acc_z_m_s2,
            self.gyr_x_rad_s,
            self.gyr_y_rad_s,
            self.gyr_z_rad_s,
            self.mag_x_au,
            self.mag_y_au,
            self.mag_z_au,
            self.roll_deg,
            self.pitch_deg,
            self.yaw_deg,
            self.lat_deg,
            self.lng_deg,
            self.alt_m,
            self.vel_x_m_s,
            self.vel_y_m_s,
            self.vel_z_m_s
        )
    }
}

/// `ruddersts:` — actual drive positions. `NaN` means that drive has not
/// finished homing and reports no absolute position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveStatusRecord {
    pub timestamp_ms: u64,
    pub rudder_l_deg: f64,
    pub rudder_r_deg: f64,
    pub sail_deg: f64,
}

impl DriveStatusRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("ruddersts", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            rudder_l_deg: f.f64("rudder_l_deg")?,
            rudder_r_deg: f.f64("rudder_r_deg")?,
            sail_deg: f.f64("sail_deg")?,
        })
    }
}

impl fmt::Display for DriveStatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ruddersts: timestamp_ms:{} rudder_l_deg:{} rudder_r_deg:{} sail_deg:{}",
            self.timestamp_ms, self.rudder_l_deg, self.rudder_r_deg, self.sail_deg
        )
    }
}

/// `status_left:` — single-drive variant of `ruddersts:`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusLeftRecord {
    pub timestamp_ms: u64,
    pub rudder_l_deg: f64,
}

impl StatusLeftRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("status_left", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            rudder_l_deg: f.f64("rudder_l_deg")?,
        })
    }
}

impl fmt::Display for StatusLeftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status_left: timestamp_ms:{} rudder_l_deg:{}",
            self.timestamp_ms, self.rudder_l_deg
        )
    }
}

/// `status_right:`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusRightRecord {
    pub timestamp_ms: u64,
    pub rudder_r_deg: f64,
}

impl StatusRightRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("status_right", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            rudder_r_deg: f.f64("rudder_r_deg")?,
        })
    }
}

impl fmt::Display for StatusRightRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status_right: timestamp_ms:{} rudder_r_deg:{}",
            self.timestamp_ms, self.rudder_r_deg
        )
    }
}

/// `status_sail:`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusSailRecord {
    pub timestamp_ms: u64,
    pub sail_deg: f64,
}

impl StatusSailRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("status_sail", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            sail_deg: f.f64("sail_deg")?,
        })
    }
}

impl fmt::Display for StatusSailRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status_sail: timestamp_ms:{} sail_deg:{}",
            self.timestamp_ms, self.sail_deg
        )
    }
}

/// `compass:` — the standalone compass unit, last-resort bearing source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompassRecord {
    pub timestamp_ms: u64,
    pub roll_deg: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
    pub temp_c: f64,
}

impl CompassRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("compass", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            roll_deg: f.f64("roll_deg")?,
            pitch_deg: f.f64("pitch_deg")?,
            yaw_deg: f.f64("yaw_deg")?,
            temp_c: f.f64("temp_c")?,
        })
    }
}

impl fmt::Display for CompassRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compass: timestamp_ms:{} roll_deg:{} pitch_deg:{} yaw_deg:{} temp_c:{}",
            self.timestamp_ms, self.roll_deg, self.pitch_deg, self.yaw_deg, self.temp_c
        )
    }
}

/// `gps:`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpsRecord {
    pub timestamp_ms: u64,
    pub lat_deg: f64,
    pub lng_deg: f64,
    pub speed_m_s: f64,
    pub cog_deg: f64,
}

impl GpsRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("gps", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            lat_deg: f.f64("lat_deg")?,
            lng_deg: f.f64("lng_deg")?,
            speed_m_s: f.f64("speed_m_s")?,
            cog_deg: f.f64("cog_deg")?,
        })
    }
}

impl fmt::Display for GpsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gps: timestamp_ms:{} lat_deg:{} lng_deg:{} speed_m_s:{} cog_deg:{}",
            self.timestamp_ms, self.lat_deg, self.lng_deg, self.speed_m_s, self.cog_deg
        )
    }
}

/// `helm:` — desired heading from the route planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmRecord {
    pub timestamp_ms: u64,
    pub alpha_star_deg: f64,
}

impl HelmRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("helm", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            alpha_star_deg: f.f64("alpha_star_deg")?,
        })
    }
}

impl fmt::Display for HelmRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "helm: timestamp_ms:{} alpha_star_deg:{}",
            self.timestamp_ms, self.alpha_star_deg
        )
    }
}

/// Remote-control command set. Changeable live from the shore client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RemoteCommand {
    Normal = 1,
    Docking = 2,
    Brake = 3,
    Override = 4,
    PowerCycle = 5,
    Idle = 6,
}

impl RemoteCommand {
    pub fn from_i64(v: i64) -> Option<Self> {
        match v {
            1 => Some(Self::Normal),
            2 => Some(Self::Docking),
            3 => Some(Self::Brake),
            4 => Some(Self::Override),
            5 => Some(Self::PowerCycle),
            6 => Some(Self::Idle),
            _ => None,
        }
    }
}

/// `remote:` — shore command plus heartbeat. `alpha_star_deg` is meaningful
/// in Override mode only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteRecord {
    pub timestamp_s: i64,
    pub command: i64,
    pub alpha_star_deg: f64,
}

impl RemoteRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("remote", body);
        Ok(Self {
            timestamp_s: f.i64("timestamp_s")?,
            command: f.i64("command")?,
            alpha_star_deg: f.f64("alpha_star_deg")?,
        })
    }

    pub fn command(&self) -> Option<RemoteCommand> {
        RemoteCommand::from_i64(self.command)
    }
}

impl fmt::Display for RemoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "remote: timestamp_s:{} command:{} alpha_star_deg:{}",
            self.timestamp_s, self.command, self.alpha_star_deg
        )
    }
}

// ── Output records ────────────────────────────────────────────────────────────

/// `rudderctl:` — the actuator set points, one per tick. `NaN` on an axis
/// means "no command" (the drive is not homed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RudderCtlRecord {
    pub timestamp_ms: u64,
    pub rudder_l_deg: f64,
    pub rudder_r_deg: f64,
    pub sail_deg: f64,
}

impl RudderCtlRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("rudderctl", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            rudder_l_deg: f.f64("rudder_l_deg")?,
            rudder_r_deg: f.f64("rudder_r_deg")?,
            sail_deg: f.f64("sail_deg")?,
        })
    }
}

impl fmt::Display for RudderCtlRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rudderctl: timestamp_ms:{} rudder_l_deg:{} rudder_r_deg:{} sail_deg:{}",
            self.timestamp_ms, self.rudder_l_deg, self.rudder_r_deg, self.sail_deg
        )
    }
}

/// `skipper_input:` — position and true wind for the route planner,
/// emitted once a minute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipperInputRecord {
    pub timestamp_ms: u64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub angle_true_deg: f64,
    pub mag_true_kn: f64,
}

impl SkipperInputRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("skipper_input", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            latitude_deg: f.f64("latitude_deg")?,
            longitude_deg: f.f64("longitude_deg")?,
            angle_true_deg: f.f64("angle_true_deg")?,
            mag_true_kn: f.f64("mag_true_kn")?,
        })
    }

    /// The planner cannot use a record without a position fix.
    pub fn valid(&self) -> bool {
        self.latitude_deg.is_finite() && self.longitude_deg.is_finite()
    }
}

impl fmt::Display for SkipperInputRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipper_input: timestamp_ms:{} latitude_deg:{} longitude_deg:{} \
             angle_true_deg:{} mag_true_kn:{}",
            self.timestamp_ms,
            self.latitude_deg,
            self.longitude_deg,
            self.angle_true_deg,
            self.mag_true_kn
        )
    }
}

/// `helmsman_st:` — periodic health snapshot: maneuver counters and the
/// current true-wind estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelmsmanStatusRecord {
    pub timestamp_ms: u64,
    pub tacks: u32,
    pub jibes: u32,
    pub inits: u32,
    pub direction_true_deg: f64,
    pub mag_true_m_s: f64,
}

impl HelmsmanStatusRecord {
    fn parse(body: &str) -> Result<Self, RecordError> {
        let f = Fields::scan("helmsman_st", body);
        Ok(Self {
            timestamp_ms: f.u64("timestamp_ms")?,
            tacks: f.u32("tacks")?,
            jibes: f.u32("jibes")?,
            inits: f.u32("inits")?,
            direction_true_deg: f.f64("direction_true_deg")?,
            mag_true_m_s: f.f64("mag_true_m_s")?,
        })
    }
}

impl fmt::Display for HelmsmanStatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "helmsman_st: timestamp_ms:{} tacks:{} jibes:{} inits:{} \
             direction_true_deg:{} mag_true_m_s:{}",
            self.timestamp_ms,
            self.tacks,
            self.jibes,
            self.inits,
            self.direction_true_deg,
            self.mag_true_m_s
        )
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Any record that can appear on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum BusRecord {
    Wind(WindRecord),
    Imu(ImuRecord),
    DriveStatus(DriveStatusRecord),
    StatusLeft(StatusLeftRecord),
    StatusRight(StatusRightRecord),
    StatusSail(StatusSailRecord),
    Compass(CompassRecord),
    Gps(GpsRecord),
    Helm(HelmRecord),
    Remote(RemoteRecord),
    RudderCtl(RudderCtlRecord),
    SkipperInput(SkipperInputRecord),
    HelmsmanStatus(HelmsmanStatusRecord),
}

impl BusRecord {
    /// Parse one bus line (with or without its trailing `\n`).
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(RecordError::Empty);
        }
        let (kind, body) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match kind {
            "wind:" => WindRecord::parse(body).map(Self::Wind),
            "imu:" => ImuRecord::parse(body).map(Self::Imu),
            "ruddersts:" => DriveStatusRecord::parse(body).map(Self::DriveStatus),
            "status_left:" => StatusLeftRecord::parse(body).map(Self::StatusLeft),
            "status_right:" => StatusRightRecord::parse(body).map(Self::StatusRight),
            "status_sail:" => StatusSailRecord::parse(body).map(Self::StatusSail),
            "compass:" => CompassRecord::parse(body).map(Self::Compass),
            "gps:" => GpsRecord::parse(body).map(Self::Gps),
            "helm:" => HelmRecord::parse(body).map(Self::Helm),
            "remote:" => RemoteRecord::parse(body).map(Self::Remote),
            "rudderctl:" => RudderCtlRecord::parse(body).map(Self::RudderCtl),
            "skipper_input:" => SkipperInputRecord::parse(body).map(Self::SkipperInput),
            "helmsman_st:" => HelmsmanStatusRecord::parse(body).map(Self::HelmsmanStatus),
            other => Err(RecordError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wind_round_trip() {
        let rec = WindRecord {
            timestamp_ms: 1234567,
            angle_deg: 123.456789,
            speed_m_s: 7.25,
            valid: true,
        };
        let line = rec.to_string();
        match BusRecord::parse(&line).unwrap() {
            BusRecord::Wind(parsed) => assert_eq!(parsed, rec),
            other => panic!("wrong kind: {other:?}"),
        }
    }

    #[test]
    fn rudderctl_round_trip_preserves_full_precision() {
        let rec = RudderCtlRecord {
            timestamp_ms: 99,
            rudder_l_deg: -8.994382022471911,
            rudder_r_deg: -8.994382022471911,
            sail_deg: 93.00000000000001,
        };
        let line = format!("{rec}\n");
        match BusRecord::parse(&line).unwrap() {
            BusRecord::RudderCtl(parsed) => {
                assert_eq!(parsed.rudder_l_deg.to_bits(), rec.rudder_l_deg.to_bits());
                assert_eq!(parsed.sail_deg.to_bits(), rec.sail_deg.to_bits());
            }
            other => panic!("wrong kind: {other:?}"),
        }
    }

    #[test]
    fn nan_marks_unhomed_axes() {
        let rec = RudderCtlRecord {
            timestamp_ms: 1,
            rudder_l_deg: f64::NAN,
            rudder_r_deg: 10.0,
            sail_deg: f64::NAN,
        };
        let line = rec.to_string();
        assert!(line.contains("rudder_l_deg:NaN"));
        match BusRecord::parse(&line).unwrap() {
            BusRecord::RudderCtl(parsed) => {
                assert!(parsed.rudder_l_deg.is_nan());
                assert!(parsed.sail_deg.is_nan());
                assert_eq!(parsed.rudder_r_deg, 10.0);
            }
            other => panic!("wrong kind: {other:?}"),
        }
    }

    #[test]
    fn imu_round_trip() {
        let rec = ImuRecord {
            timestamp_ms: 17,
            temp_c: 21.5,
            acc_x_m_s2: 0.01,
            acc_y_m_s2: -0.02,
            acc_z_m_s2: -9.81,
            gyr_x_rad_s: 0.0,
            gyr_y_rad_s: 0.0,
            gyr_z_rad_s: 0.125,
            mag_x_au: 0.2,
            mag_y_au: -0.05,
            mag_z_au: 0.4,
            roll_deg: 1.0,
            pitch_deg: -2.0,
            yaw_deg: 45.0,
            lat_deg: 47.2,
            lng_deg: 8.5,
            alt_m: 406.0,
            vel_x_m_s: 1.5,
            vel_y_m_s: 0.0,
            vel_z_m_s: 0.0,
        };
        match BusRecord::parse(&rec.to_string()).unwrap() {
            BusRecord::Imu(parsed) => assert_eq!(parsed, rec),
            other => panic!("wrong kind: {other:?}"),
        }
    }

    #[test]
    fn remote_commands_decode() {
        let rec = match BusRecord::parse("remote: timestamp_s:1000 command:6 alpha_star_deg:NaN")
            .unwrap()
        {
            BusRecord::Remote(r) => r,
            other => panic!("wrong kind: {other:?}"),
        };
        assert_eq!(rec.command(), Some(RemoteCommand::Idle));
        assert!(rec.alpha_star_deg.is_nan());
        assert_eq!(RemoteCommand::from_i64(7), None);
        assert_eq!(RemoteCommand::from_i64(0), None);
    }

    #[test]
    fn field_order_on_the_wire_is_free() {
        let rec = match BusRecord::parse("gps: cog_deg:90 lat_deg:1 lng_deg:2 speed_m_s:3 timestamp_ms:4")
            .unwrap()
        {
            BusRecord::Gps(r) => r,
            other => panic!("wrong kind: {other:?}"),
        };
        assert_eq!(rec.cog_deg, 90.0);
        assert_eq!(rec.timestamp_ms, 4);
    }

    #[test]
    fn malformed_lines_are_errors_not_panics() {
        assert_eq!(
            BusRecord::parse("bogus: a:1"),
            Err(RecordError::UnknownKind("bogus:".to_string()))
        );
        assert!(matches!(
            BusRecord::parse("wind: angle_deg:1 speed_m_s:2 valid:1"),
            Err(RecordError::MissingField { field: "timestamp_ms", .. })
        ));
        assert!(matches!(
            BusRecord::parse("wind: timestamp_ms:x angle_deg:1 speed_m_s:2 valid:1"),
            Err(RecordError::BadValue { field: "timestamp_ms", .. })
        ));
        assert_eq!(BusRecord::parse("  \n"), Err(RecordError::Empty));
    }

    #[test]
    fn status_record_round_trip() {
        let rec = HelmsmanStatusRecord {
            timestamp_ms: 2000,
            tacks: 3,
            jibes: 1,
            inits: 2,
            direction_true_deg: 271.25,
            mag_true_m_s: 9.5,
        };
        match BusRecord::parse(&rec.to_string()).unwrap() {
            BusRecord::HelmsmanStatus(parsed) => assert_eq!(parsed, rec),
            other => panic!("wrong kind: {other:?}"),
        }
    }
}
