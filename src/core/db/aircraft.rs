//! Aircraft and session records

use chrono::{DateTime, Utc};
use rusqlite::{named_params, params, OptionalExtension, Row};
use tracing::debug;

use super::{
    format_timestamp, parse_timestamp, Aircraft, AircraftEdit, DbError, FlightDatabase, Session,
};

/// Aircraft columns in the order [`aircraft_from_row`] reads them
pub(super) const AIRCRAFT_COLUMNS: &str = "a.AircraftID, a.ModeS, a.ModeSCountry, a.Country, \
     a.Registration, a.ICAOTypeCode, a.Type, a.Manufacturer, a.RegisteredOwners, \
     a.OperatorFlagCode, a.SerialNo, a.YearBuilt, a.Interested, a.UserTag, \
     a.FirstCreated, a.LastModified";

pub(super) fn aircraft_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Aircraft> {
    Ok(Aircraft {
        aircraft_id: row.get(offset)?,
        mode_s: row.get(offset + 1)?,
        mode_s_country: row.get(offset + 2)?,
        country: row.get(offset + 3)?,
        registration: row.get(offset + 4)?,
        icao_type_code: row.get(offset + 5)?,
        model: row.get(offset + 6)?,
        manufacturer: row.get(offset + 7)?,
        registered_owners: row.get(offset + 8)?,
        operator_flag_code: row.get(offset + 9)?,
        serial_no: row.get(offset + 10)?,
        year_built: row.get(offset + 11)?,
        interested: row.get::<_, i64>(offset + 12)? != 0,
        user_tag: row.get(offset + 13)?,
        first_created: parse_timestamp(&row.get::<_, String>(offset + 14)?),
        last_modified: parse_timestamp(&row.get::<_, String>(offset + 15)?),
    })
}

impl FlightDatabase {
    /// Insert a new aircraft and return its id
    pub fn insert_aircraft(&self, aircraft: &Aircraft) -> Result<i64, DbError> {
        let id = self.run(|conn| {
            conn.execute(
                r#"INSERT INTO Aircraft (FirstCreated, LastModified, ModeS, ModeSCountry, Country,
                       Registration, ICAOTypeCode, Type, Manufacturer, RegisteredOwners,
                       OperatorFlagCode, SerialNo, YearBuilt, Interested, UserTag)
                   VALUES (:created, :modified, :mode_s, :mode_s_country, :country,
                       :registration, :type_code, :model, :manufacturer, :owners,
                       :flag_code, :serial_no, :year_built, :interested, :user_tag)"#,
                named_params! {
                    ":created": format_timestamp(&aircraft.first_created),
                    ":modified": format_timestamp(&aircraft.last_modified),
                    ":mode_s": aircraft.mode_s,
                    ":mode_s_country": aircraft.mode_s_country,
                    ":country": aircraft.country,
                    ":registration": aircraft.registration,
                    ":type_code": aircraft.icao_type_code,
                    ":model": aircraft.model,
                    ":manufacturer": aircraft.manufacturer,
                    ":owners": aircraft.registered_owners,
                    ":flag_code": aircraft.operator_flag_code,
                    ":serial_no": aircraft.serial_no,
                    ":year_built": aircraft.year_built,
                    ":interested": aircraft.interested,
                    ":user_tag": aircraft.user_tag,
                },
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        debug!(id, icao = %aircraft.mode_s, "inserted aircraft");
        Ok(id)
    }

    /// Overwrite an existing aircraft row (matched on `aircraft_id`)
    pub fn update_aircraft(&self, aircraft: &Aircraft) -> Result<(), DbError> {
        self.run(|conn| {
            conn.execute(
                r#"UPDATE Aircraft SET LastModified = :modified, ModeS = :mode_s,
                       ModeSCountry = :mode_s_country, Country = :country,
                       Registration = :registration, ICAOTypeCode = :type_code, Type = :model,
                       Manufacturer = :manufacturer, RegisteredOwners = :owners,
                       OperatorFlagCode = :flag_code, SerialNo = :serial_no,
                       YearBuilt = :year_built, Interested = :interested, UserTag = :user_tag
                   WHERE AircraftID = :id"#,
                named_params! {
                    ":id": aircraft.aircraft_id,
                    ":modified": format_timestamp(&aircraft.last_modified),
                    ":mode_s": aircraft.mode_s,
                    ":mode_s_country": aircraft.mode_s_country,
                    ":country": aircraft.country,
                    ":registration": aircraft.registration,
                    ":type_code": aircraft.icao_type_code,
                    ":model": aircraft.model,
                    ":manufacturer": aircraft.manufacturer,
                    ":owners": aircraft.registered_owners,
                    ":flag_code": aircraft.operator_flag_code,
                    ":serial_no": aircraft.serial_no,
                    ":year_built": aircraft.year_built,
                    ":interested": aircraft.interested,
                    ":user_tag": aircraft.user_tag,
                },
            )
        })?;
        Ok(())
    }

    pub fn get_aircraft_by_id(&self, id: i64) -> Result<Option<Aircraft>, DbError> {
        let sql = format!(
            "SELECT {} FROM Aircraft a WHERE a.AircraftID = ?1",
            AIRCRAFT_COLUMNS
        );
        self.run(|conn| {
            conn.query_row(&sql, params![id], |row| aircraft_from_row(row, 0))
                .optional()
        })
    }

    /// Look up an aircraft by Mode-S address (case-insensitive)
    pub fn get_aircraft_by_icao(&self, icao: &str) -> Result<Option<Aircraft>, DbError> {
        let icao = icao.trim().to_uppercase();
        let sql = format!("SELECT {} FROM Aircraft a WHERE a.ModeS = ?1", AIRCRAFT_COLUMNS);
        self.run(|conn| {
            conn.query_row(&sql, params![icao], |row| aircraft_from_row(row, 0))
                .optional()
        })
    }

    /// Apply `edit` to the aircraft with this ICAO, creating it if needed.
    ///
    /// `FirstCreated` is kept on update; `LastModified` is always refreshed.
    pub fn upsert_aircraft_by_icao(
        &self,
        icao: &str,
        edit: &AircraftEdit,
    ) -> Result<Aircraft, DbError> {
        let now = Utc::now();
        match self.get_aircraft_by_icao(icao)? {
            Some(mut aircraft) => {
                edit.apply(&mut aircraft);
                aircraft.last_modified = now;
                self.update_aircraft(&aircraft)?;
                Ok(aircraft)
            }
            None => {
                let mut aircraft = Aircraft::new(icao);
                edit.apply(&mut aircraft);
                aircraft.first_created = now;
                aircraft.last_modified = now;
                aircraft.aircraft_id = self.insert_aircraft(&aircraft)?;
                Ok(aircraft)
            }
        }
    }

    /// Start a receiver session
    pub fn insert_session(
        &self,
        location_id: Option<i64>,
        start_time: DateTime<Utc>,
    ) -> Result<Session, DbError> {
        let session_id = self.run(|conn| {
            conn.execute(
                "INSERT INTO Sessions (LocationID, StartTime) VALUES (?1, ?2)",
                params![location_id, format_timestamp(&start_time)],
            )?;
            Ok(conn.last_insert_rowid())
        })?;
        Ok(Session {
            session_id,
            location_id,
            start_time,
            end_time: None,
        })
    }

    /// Stamp the end time on a session
    pub fn end_session(&self, session_id: i64, end_time: DateTime<Utc>) -> Result<(), DbError> {
        self.run(|conn| {
            conn.execute(
                "UPDATE Sessions SET EndTime = ?1 WHERE SessionID = ?2",
                params![format_timestamp(&end_time), session_id],
            )
        })?;
        Ok(())
    }

    pub fn get_session(&self, session_id: i64) -> Result<Option<Session>, DbError> {
        self.run(|conn| {
            conn.query_row(
                "SELECT SessionID, LocationID, StartTime, EndTime FROM Sessions WHERE SessionID = ?1",
                params![session_id],
                |row| {
                    Ok(Session {
                        session_id: row.get(0)?,
                        location_id: row.get(1)?,
                        start_time: parse_timestamp(&row.get::<_, String>(2)?),
                        end_time: row
                            .get::<_, Option<String>>(3)?
                            .map(|s| parse_timestamp(&s)),
                    })
                },
            )
            .optional()
        })
    }
}
