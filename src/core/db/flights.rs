//! Flight records and criteria-driven searches

use rusqlite::types::Value;
use rusqlite::{named_params, params, OptionalExtension, Row};
use tracing::debug;

use super::aircraft::{aircraft_from_row, AIRCRAFT_COLUMNS};
use super::{format_timestamp, parse_timestamp, DbError, Flight, FlightDatabase, FlightRecord};
use crate::core::criteria::{SearchCriteria, SqlClause};

/// Flight columns in the order [`flight_from_row`] reads them
const FLIGHT_COLUMNS: &str = "f.FlightID, f.SessionID, f.AircraftID, f.StartTime, f.EndTime, \
     f.Callsign, f.NumPosMsgRec, f.NumModeSMsgRec, f.FirstAltitude, f.LastAltitude, \
     f.FirstLat, f.FirstLon, f.LastLat, f.LastLon, f.FirstGroundSpeed, f.LastGroundSpeed, \
     f.FirstSquawk, f.LastSquawk, f.HadEmergency, f.HadAlert, f.HadSPI, \
     f.FirstIsOnGround, f.LastIsOnGround";

const FLIGHT_COLUMN_COUNT: usize = 23;

const FLIGHTS_JOIN: &str = "Flights f INNER JOIN Aircraft a ON a.AircraftID = f.AircraftID";

fn flight_from_row(row: &Row<'_>) -> rusqlite::Result<Flight> {
    Ok(Flight {
        flight_id: row.get(0)?,
        session_id: row.get(1)?,
        aircraft_id: row.get(2)?,
        start_time: parse_timestamp(&row.get::<_, String>(3)?),
        end_time: row.get::<_, Option<String>>(4)?.map(|s| parse_timestamp(&s)),
        callsign: row.get(5)?,
        num_pos_msg_rec: row.get(6)?,
        num_mode_s_msg_rec: row.get(7)?,
        first_altitude: row.get(8)?,
        last_altitude: row.get(9)?,
        first_lat: row.get(10)?,
        first_lon: row.get(11)?,
        last_lat: row.get(12)?,
        last_lon: row.get(13)?,
        first_ground_speed: row.get(14)?,
        last_ground_speed: row.get(15)?,
        first_squawk: row.get(16)?,
        last_squawk: row.get(17)?,
        had_emergency: row.get::<_, i64>(18)? != 0,
        had_alert: row.get::<_, i64>(19)? != 0,
        had_spi: row.get::<_, i64>(20)? != 0,
        first_is_on_ground: row.get::<_, i64>(21)? != 0,
        last_is_on_ground: row.get::<_, i64>(22)? != 0,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FlightRecord> {
    Ok(FlightRecord {
        flight: flight_from_row(row)?,
        aircraft: aircraft_from_row(row, FLIGHT_COLUMN_COUNT)?,
    })
}

impl FlightDatabase {
    /// Insert a flight and return its id; `flight.flight_id` is ignored
    pub fn insert_flight(&self, flight: &Flight) -> Result<i64, DbError> {
        self.run(|conn| {
            conn.execute(
                r#"INSERT INTO Flights (SessionID, AircraftID, StartTime, EndTime, Callsign,
                       NumPosMsgRec, NumModeSMsgRec, FirstAltitude, LastAltitude,
                       FirstLat, FirstLon, LastLat, LastLon, FirstGroundSpeed, LastGroundSpeed,
                       FirstSquawk, LastSquawk, HadEmergency, HadAlert, HadSPI,
                       FirstIsOnGround, LastIsOnGround)
                   VALUES (:session, :aircraft, :start, :end, :callsign,
                       :pos_msgs, :mode_s_msgs, :first_alt, :last_alt,
                       :first_lat, :first_lon, :last_lat, :last_lon, :first_gs, :last_gs,
                       :first_squawk, :last_squawk, :emergency, :alert, :spi,
                       :first_ground, :last_ground)"#,
                named_params! {
                    ":session": flight.session_id,
                    ":aircraft": flight.aircraft_id,
                    ":start": format_timestamp(&flight.start_time),
                    ":end": flight.end_time.as_ref().map(format_timestamp),
                    ":callsign": flight.callsign,
                    ":pos_msgs": flight.num_pos_msg_rec,
                    ":mode_s_msgs": flight.num_mode_s_msg_rec,
                    ":first_alt": flight.first_altitude,
                    ":last_alt": flight.last_altitude,
                    ":first_lat": flight.first_lat,
                    ":first_lon": flight.first_lon,
                    ":last_lat": flight.last_lat,
                    ":last_lon": flight.last_lon,
                    ":first_gs": flight.first_ground_speed,
                    ":last_gs": flight.last_ground_speed,
                    ":first_squawk": flight.first_squawk,
                    ":last_squawk": flight.last_squawk,
                    ":emergency": flight.had_emergency,
                    ":alert": flight.had_alert,
                    ":spi": flight.had_spi,
                    ":first_ground": flight.first_is_on_ground,
                    ":last_ground": flight.last_is_on_ground,
                },
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Rewrite the mutable end-of-flight fields
    pub fn update_flight(&self, flight: &Flight) -> Result<(), DbError> {
        self.run(|conn| {
            conn.execute(
                r#"UPDATE Flights SET EndTime = :end, Callsign = :callsign,
                       NumPosMsgRec = :pos_msgs, NumModeSMsgRec = :mode_s_msgs,
                       FirstAltitude = :first_alt, LastAltitude = :last_alt,
                       FirstLat = :first_lat, FirstLon = :first_lon,
                       LastLat = :last_lat, LastLon = :last_lon,
                       FirstGroundSpeed = :first_gs, LastGroundSpeed = :last_gs,
                       FirstSquawk = :first_squawk, LastSquawk = :last_squawk,
                       HadEmergency = :emergency, HadAlert = :alert, HadSPI = :spi,
                       FirstIsOnGround = :first_ground, LastIsOnGround = :last_ground
                   WHERE FlightID = :id"#,
                named_params! {
                    ":id": flight.flight_id,
                    ":end": flight.end_time.as_ref().map(format_timestamp),
                    ":callsign": flight.callsign,
                    ":pos_msgs": flight.num_pos_msg_rec,
                    ":mode_s_msgs": flight.num_mode_s_msg_rec,
                    ":first_alt": flight.first_altitude,
                    ":last_alt": flight.last_altitude,
                    ":first_lat": flight.first_lat,
                    ":first_lon": flight.first_lon,
                    ":last_lat": flight.last_lat,
                    ":last_lon": flight.last_lon,
                    ":first_gs": flight.first_ground_speed,
                    ":last_gs": flight.last_ground_speed,
                    ":first_squawk": flight.first_squawk,
                    ":last_squawk": flight.last_squawk,
                    ":emergency": flight.had_emergency,
                    ":alert": flight.had_alert,
                    ":spi": flight.had_spi,
                    ":first_ground": flight.first_is_on_ground,
                    ":last_ground": flight.last_is_on_ground,
                },
            )
        })?;
        Ok(())
    }

    pub fn get_flight(&self, flight_id: i64) -> Result<Option<Flight>, DbError> {
        let sql = format!("SELECT {} FROM Flights f WHERE f.FlightID = ?1", FLIGHT_COLUMNS);
        self.run(|conn| {
            conn.query_row(&sql, params![flight_id], flight_from_row)
                .optional()
        })
    }

    /// Flights matching `criteria`, sorted and paged
    pub fn get_flights(&self, criteria: &SearchCriteria) -> Result<Vec<FlightRecord>, DbError> {
        let clause = criteria.where_clause()?;
        self.select_flights(clause, criteria)
    }

    /// Number of flights matching `criteria`, ignoring sort and paging
    pub fn count_flights(&self, criteria: &SearchCriteria) -> Result<i64, DbError> {
        let clause = criteria.where_clause()?;
        self.count_matching(&clause)
    }

    /// Flights for one aircraft that also match `criteria`
    pub fn get_flights_for_aircraft(
        &self,
        aircraft_id: i64,
        criteria: &SearchCriteria,
    ) -> Result<Vec<FlightRecord>, DbError> {
        let clause = Self::aircraft_clause(aircraft_id, criteria)?;
        self.select_flights(clause, criteria)
    }

    pub fn count_flights_for_aircraft(
        &self,
        aircraft_id: i64,
        criteria: &SearchCriteria,
    ) -> Result<i64, DbError> {
        let clause = Self::aircraft_clause(aircraft_id, criteria)?;
        self.count_matching(&clause)
    }

    fn aircraft_clause(aircraft_id: i64, criteria: &SearchCriteria) -> Result<SqlClause, DbError> {
        let mut clause = criteria.where_clause()?;
        let placeholder = clause.bind("aircraft_id", Value::Integer(aircraft_id));
        clause.push_condition(format!("f.AircraftID = {}", placeholder));
        Ok(clause)
    }

    fn select_flights(
        &self,
        mut clause: SqlClause,
        criteria: &SearchCriteria,
    ) -> Result<Vec<FlightRecord>, DbError> {
        let mut sql = format!(
            "SELECT {}, {} FROM {}{}{}",
            FLIGHT_COLUMNS,
            AIRCRAFT_COLUMNS,
            FLIGHTS_JOIN,
            clause.where_sql(),
            criteria.order_by()
        );

        let paging = criteria.paging();
        if !paging.is_unbounded() {
            let take = clause.bind("take", Value::Integer(paging.limit()));
            let skip = clause.bind("skip", Value::Integer(paging.skip));
            sql.push_str(&format!(" LIMIT {} OFFSET {}", take, skip));
        }

        debug!(%sql, params = clause.params().len(), "searching flights");
        self.run(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let named = clause.named_params();
            let rows = stmt
                .query_map(named.as_slice(), record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>();
            rows
        })
    }

    fn count_matching(&self, clause: &SqlClause) -> Result<i64, DbError> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", FLIGHTS_JOIN, clause.where_sql());
        debug!(%sql, "counting flights");
        self.run(|conn| {
            let named = clause.named_params();
            conn.query_row(&sql, named.as_slice(), |row| row.get(0))
        })
    }
}
