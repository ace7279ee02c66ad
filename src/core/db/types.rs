//! Row types for the BaseStation database

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in every date column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp, falling back to the epoch for unreadable values
pub fn parse_timestamp(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// An aircraft record, keyed by its 24-bit ICAO (Mode-S) address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub aircraft_id: i64,
    pub mode_s: String,
    pub mode_s_country: Option<String>,
    pub country: Option<String>,
    pub registration: Option<String>,
    pub icao_type_code: Option<String>,
    /// Model description, e.g. "Airbus A320-232"
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub registered_owners: Option<String>,
    pub operator_flag_code: Option<String>,
    pub serial_no: Option<String>,
    pub year_built: Option<String>,
    pub interested: bool,
    pub user_tag: Option<String>,
    pub first_created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

impl Aircraft {
    /// A blank record for `icao`, timestamped now
    pub fn new(icao: &str) -> Self {
        let now = Utc::now();
        Self {
            aircraft_id: 0,
            mode_s: icao.trim().to_uppercase(),
            mode_s_country: None,
            country: None,
            registration: None,
            icao_type_code: None,
            model: None,
            manufacturer: None,
            registered_owners: None,
            operator_flag_code: None,
            serial_no: None,
            year_built: None,
            interested: false,
            user_tag: None,
            first_created: now,
            last_modified: now,
        }
    }
}

/// Editable aircraft fields; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftEdit {
    pub mode_s_country: Option<String>,
    pub country: Option<String>,
    pub registration: Option<String>,
    pub icao_type_code: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub registered_owners: Option<String>,
    pub operator_flag_code: Option<String>,
    pub serial_no: Option<String>,
    pub year_built: Option<String>,
    pub interested: Option<bool>,
    pub user_tag: Option<String>,
}

impl AircraftEdit {
    pub fn is_empty(&self) -> bool {
        *self == AircraftEdit::default()
    }

    /// Copy every set field onto `aircraft`; empty strings clear the field
    pub fn apply(&self, aircraft: &mut Aircraft) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value {
                let v = v.trim();
                *target = if v.is_empty() { None } else { Some(v.to_string()) };
            }
        }
        set(&mut aircraft.mode_s_country, &self.mode_s_country);
        set(&mut aircraft.country, &self.country);
        set(&mut aircraft.registration, &self.registration);
        set(&mut aircraft.icao_type_code, &self.icao_type_code);
        set(&mut aircraft.model, &self.model);
        set(&mut aircraft.manufacturer, &self.manufacturer);
        set(&mut aircraft.registered_owners, &self.registered_owners);
        set(&mut aircraft.operator_flag_code, &self.operator_flag_code);
        set(&mut aircraft.serial_no, &self.serial_no);
        set(&mut aircraft.year_built, &self.year_built);
        set(&mut aircraft.user_tag, &self.user_tag);
        if let Some(interested) = self.interested {
            aircraft.interested = interested;
        }
    }
}

/// A receiver session during which flights were recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: i64,
    pub location_id: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// One sighting of an aircraft from first to last message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: i64,
    pub session_id: i64,
    pub aircraft_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub callsign: Option<String>,
    pub num_pos_msg_rec: i64,
    pub num_mode_s_msg_rec: i64,
    pub first_altitude: Option<i32>,
    pub last_altitude: Option<i32>,
    pub first_lat: Option<f64>,
    pub first_lon: Option<f64>,
    pub last_lat: Option<f64>,
    pub last_lon: Option<f64>,
    pub first_ground_speed: Option<f64>,
    pub last_ground_speed: Option<f64>,
    pub first_squawk: Option<i32>,
    pub last_squawk: Option<i32>,
    pub had_emergency: bool,
    pub had_alert: bool,
    pub had_spi: bool,
    pub first_is_on_ground: bool,
    pub last_is_on_ground: bool,
}

impl Flight {
    /// An empty flight for the given session and aircraft
    pub fn new(session_id: i64, aircraft_id: i64, start_time: DateTime<Utc>) -> Self {
        Self {
            flight_id: 0,
            session_id,
            aircraft_id,
            start_time,
            end_time: None,
            callsign: None,
            num_pos_msg_rec: 0,
            num_mode_s_msg_rec: 0,
            first_altitude: None,
            last_altitude: None,
            first_lat: None,
            first_lon: None,
            last_lat: None,
            last_lon: None,
            first_ground_speed: None,
            last_ground_speed: None,
            first_squawk: None,
            last_squawk: None,
            had_emergency: false,
            had_alert: false,
            had_spi: false,
            first_is_on_ground: false,
            last_is_on_ground: false,
        }
    }
}

/// A search hit: the flight plus the aircraft it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightRecord {
    pub flight: Flight,
    pub aircraft: Aircraft,
}

/// Database statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct DbStatistics {
    pub aircraft: i64,
    pub sessions: i64,
    pub flights: i64,
    pub schema_version: i64,
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip_keeps_millis() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
            + chrono::Duration::milliseconds(123);
        let text = format_timestamp(&dt);
        assert_eq!(text, "2024-05-06 07:08:09.123");
        assert_eq!(parse_timestamp(&text), dt);
    }

    #[test]
    fn test_parse_timestamp_accepts_legacy_layout() {
        let dt = parse_timestamp("2020-01-02 03:04:05");
        assert_eq!(format_timestamp(&dt), "2020-01-02 03:04:05.000");
        assert_eq!(parse_timestamp("garbage"), DateTime::UNIX_EPOCH);
    }

    #[test]
    fn test_aircraft_edit_clears_on_empty_string() {
        let mut aircraft = Aircraft::new("4ca1b2");
        assert_eq!(aircraft.mode_s, "4CA1B2");
        aircraft.registration = Some("EI-ABC".into());

        let edit = AircraftEdit {
            registration: Some("  ".into()),
            icao_type_code: Some("A320".into()),
            interested: Some(true),
            ..Default::default()
        };
        edit.apply(&mut aircraft);

        assert_eq!(aircraft.registration, None);
        assert_eq!(aircraft.icao_type_code.as_deref(), Some("A320"));
        assert!(aircraft.interested);
    }
}
