//! SQLite-backed flight and aircraft log
//!
//! This module owns the BaseStation-layout database:
//! - `Aircraft` rows keyed by Mode-S address
//! - `Sessions` and the `Flights` recorded during them
//! - criteria-driven flight searches
//!
//! Every statement goes through [`LockRetry`], so a database held by another
//! process is retried until the configured timeout instead of failing at once.

mod aircraft;
mod flights;
mod retry;
mod schema;
mod types;

pub use retry::{LockContention, LockRetry, DEFAULT_LOCK_TIMEOUT, DEFAULT_RETRY_INTERVAL};
pub use types::*;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use rusqlite::Connection;
use thiserror::Error;

use crate::core::criteria::CriteriaError;

/// Current schema version stored in `DBInfo`
pub const SCHEMA_VERSION: i64 = 2;

/// Errors from the flight database
#[derive(Debug, Error, Diagnostic)]
pub enum DbError {
    #[error(transparent)]
    #[diagnostic(code(fdb::db::sqlite))]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Criteria(#[from] CriteriaError),

    #[error("cannot create database directory {path:?}: {source}")]
    #[diagnostic(code(fdb::db::io))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("database {0:?} already exists")]
    #[diagnostic(code(fdb::db::exists), help("open it instead, or remove the file first"))]
    AlreadyExists(PathBuf),

    #[error("no aircraft with ICAO '{0}'")]
    #[diagnostic(code(fdb::db::not_found), help("check the 24-bit hex address"))]
    NotFound(String),
}

impl DbError {
    /// True when the underlying SQLite error was lock contention
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, DbError::Sqlite(e) if e.is_lock_contention())
    }
}

/// The flight database connection
pub struct FlightDatabase {
    conn: Connection,
    path: Option<PathBuf>,
    retry: LockRetry,
}

impl FlightDatabase {
    /// Open or create the database at `path`
    ///
    /// Missing tables are created. SQLite's own busy handler is switched off
    /// so lock contention reaches the retry policy.
    pub fn open(path: &Path, retry: LockRetry) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| DbError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Self::from_connection(conn, Some(path.to_path_buf()), retry)?;

        // Enable WAL mode for better concurrent access
        db.run(|conn| conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(())))?;

        db.init_schema()?;
        Ok(db)
    }

    /// Create a new, empty database at `path`; fails if the file exists
    pub fn create(path: &Path, retry: LockRetry) -> Result<Self, DbError> {
        if path.exists() {
            return Err(DbError::AlreadyExists(path.to_path_buf()));
        }
        Self::open(path, retry)
    }

    /// A private in-memory database, mainly for tests
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self::from_connection(conn, None, LockRetry::default())?;
        db.init_schema()?;
        Ok(db)
    }

    fn from_connection(
        conn: Connection,
        path: Option<PathBuf>,
        retry: LockRetry,
    ) -> Result<Self, DbError> {
        conn.busy_timeout(Duration::ZERO)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path, retry })
    }

    /// Location on disk, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn retry_policy(&self) -> LockRetry {
        self.retry
    }

    /// Run one unit of work under the lock-retry policy
    pub(crate) fn run<T, F>(&self, mut op: F) -> Result<T, DbError>
    where
        F: FnMut(&Connection) -> rusqlite::Result<T>,
    {
        self.retry.execute(|| op(&self.conn)).map_err(DbError::from)
    }

    /// Row counts and file size
    pub fn statistics(&self) -> Result<DbStatistics, DbError> {
        let count = |table: &str| -> Result<i64, DbError> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            self.run(|conn| conn.query_row(&sql, [], |row| row.get(0)))
        };

        let db_size_bytes = self
            .path
            .as_ref()
            .and_then(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(DbStatistics {
            aircraft: count("Aircraft")?,
            sessions: count("Sessions")?,
            flights: count("Flights")?,
            schema_version: self.schema_version()?,
            db_size_bytes,
        })
    }
}
