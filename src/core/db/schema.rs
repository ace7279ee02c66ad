//! Database schema initialization

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{DbError, FlightDatabase, SCHEMA_VERSION};

impl FlightDatabase {
    /// Create any missing tables and record the schema version
    pub(super) fn init_schema(&self) -> Result<(), DbError> {
        self.run(|conn| {
            conn.execute_batch(
                r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS DBInfo (
                OriginalVersion INTEGER NOT NULL,
                CurrentVersion INTEGER NOT NULL
            );

            -- One row per Mode-S address
            CREATE TABLE IF NOT EXISTS Aircraft (
                AircraftID INTEGER PRIMARY KEY AUTOINCREMENT,
                FirstCreated TEXT NOT NULL,
                LastModified TEXT NOT NULL,
                ModeS TEXT NOT NULL UNIQUE,
                ModeSCountry TEXT,
                Country TEXT,
                Registration TEXT,
                ICAOTypeCode TEXT,
                Type TEXT,
                Manufacturer TEXT,
                RegisteredOwners TEXT,
                OperatorFlagCode TEXT,
                SerialNo TEXT,
                YearBuilt TEXT,
                Interested INTEGER NOT NULL DEFAULT 0,
                UserTag TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_aircraft_modes_country ON Aircraft(ModeSCountry);
            CREATE INDEX IF NOT EXISTS idx_aircraft_registration ON Aircraft(Registration);
            CREATE INDEX IF NOT EXISTS idx_aircraft_type_code ON Aircraft(ICAOTypeCode);
            CREATE INDEX IF NOT EXISTS idx_aircraft_owners ON Aircraft(RegisteredOwners);

            -- Receiver sessions
            CREATE TABLE IF NOT EXISTS Sessions (
                SessionID INTEGER PRIMARY KEY AUTOINCREMENT,
                LocationID INTEGER,
                StartTime TEXT NOT NULL,
                EndTime TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_start ON Sessions(StartTime);

            -- Flights, one per aircraft per session sighting
            CREATE TABLE IF NOT EXISTS Flights (
                FlightID INTEGER PRIMARY KEY AUTOINCREMENT,
                SessionID INTEGER NOT NULL,
                AircraftID INTEGER NOT NULL,
                StartTime TEXT NOT NULL,
                EndTime TEXT,
                Callsign TEXT,
                NumPosMsgRec INTEGER NOT NULL DEFAULT 0,
                NumModeSMsgRec INTEGER NOT NULL DEFAULT 0,
                FirstAltitude INTEGER,
                LastAltitude INTEGER,
                FirstLat REAL,
                FirstLon REAL,
                LastLat REAL,
                LastLon REAL,
                FirstGroundSpeed REAL,
                LastGroundSpeed REAL,
                FirstSquawk INTEGER,
                LastSquawk INTEGER,
                HadEmergency INTEGER NOT NULL DEFAULT 0,
                HadAlert INTEGER NOT NULL DEFAULT 0,
                HadSPI INTEGER NOT NULL DEFAULT 0,
                FirstIsOnGround INTEGER NOT NULL DEFAULT 0,
                LastIsOnGround INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (SessionID) REFERENCES Sessions(SessionID) ON DELETE CASCADE,
                FOREIGN KEY (AircraftID) REFERENCES Aircraft(AircraftID) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_flights_aircraft ON Flights(AircraftID);
            CREATE INDEX IF NOT EXISTS idx_flights_session ON Flights(SessionID);
            CREATE INDEX IF NOT EXISTS idx_flights_callsign ON Flights(Callsign);
            CREATE INDEX IF NOT EXISTS idx_flights_start ON Flights(StartTime);
            "#,
            )?;

            let recorded: Option<i64> = conn
                .query_row("SELECT CurrentVersion FROM DBInfo LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            if recorded.is_none() {
                conn.execute(
                    "INSERT INTO DBInfo (OriginalVersion, CurrentVersion) VALUES (?1, ?1)",
                    params![SCHEMA_VERSION],
                )?;
                info!(version = SCHEMA_VERSION, "created flight database schema");
            }
            Ok(())
        })
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<i64, DbError> {
        self.run(|conn| {
            conn.query_row("SELECT CurrentVersion FROM DBInfo LIMIT 1", [], |row| {
                row.get(0)
            })
        })
    }
}
