//! Flight search criteria and their translation into SQL
//!
//! A [`SearchCriteria`] collects the named filters, up to two sort keys and
//! a row window. [`SearchCriteria::where_clause`] turns the filters into a
//! parameterised WHERE clause against the joined `Flights f` / `Aircraft a`
//! tables.

mod filter;
mod sort;
mod sql;

pub use filter::{like_pattern, FilterBool, FilterCondition, FilterRange, FilterString, RangeValue};
pub use sort::{order_by_clause, Paging, SortField};
pub use sql::{Predicate, SqlClause};

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a query from criteria
#[derive(Debug, Error, Diagnostic)]
pub enum CriteriaError {
    #[error("filter '{filter}' does not implement condition '{condition}'")]
    #[diagnostic(code(fdb::criteria::not_implemented))]
    NotImplemented {
        filter: String,
        condition: FilterCondition,
    },

    #[error("invalid filter '{input}': {reason}")]
    #[diagnostic(
        code(fdb::criteria::parse),
        help("text: [!][equals|contains|starts_with|ends_with:]VALUE, range: [!]LOW..HIGH, flag: [!]true|false")
    )]
    Parse { input: String, reason: String },
}

/// Filters, sort keys and paging for one flight search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub callsign: Option<FilterString>,
    pub country: Option<FilterString>,
    pub date: Option<FilterRange<DateTime<Utc>>>,
    pub first_altitude: Option<FilterRange<i32>>,
    pub last_altitude: Option<FilterRange<i32>>,
    pub icao: Option<FilterString>,
    pub is_emergency: Option<FilterBool>,
    pub is_interesting: Option<FilterBool>,
    pub operator: Option<FilterString>,
    pub registration: Option<FilterString>,
    #[serde(rename = "type")]
    pub aircraft_type: Option<FilterString>,

    pub sort1: Option<String>,
    pub sort1_ascending: bool,
    pub sort2: Option<String>,
    pub sort2_ascending: bool,

    pub from_row: i64,
    /// Inclusive; negative means no upper bound
    pub to_row: i64,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            callsign: None,
            country: None,
            date: None,
            first_altitude: None,
            last_altitude: None,
            icao: None,
            is_emergency: None,
            is_interesting: None,
            operator: None,
            registration: None,
            aircraft_type: None,
            sort1: None,
            sort1_ascending: true,
            sort2: None,
            sort2_ascending: true,
            from_row: 0,
            to_row: -1,
        }
    }
}

/// `f.StartTime` with whole-second values padded to milliseconds, so stored
/// `YYYY-MM-DD HH:MM:SS` rows compare like bound `YYYY-MM-DD HH:MM:SS.sss`
const START_TIME_NORMALIZED: &str = "strftime('%Y-%m-%d %H:%M:%f', f.StartTime)";

impl SearchCriteria {
    /// Build the WHERE clause for every filter that is set
    pub fn where_clause(&self) -> Result<SqlClause, CriteriaError> {
        let mut clause = SqlClause::new();

        // Mode-S addresses are stored upper case
        let icao = self.icao.clone().map(|mut filter| {
            filter.value = filter.value.trim().to_uppercase();
            filter
        });
        let strings = [
            ("callsign", "f.Callsign", &self.callsign),
            ("country", "a.ModeSCountry", &self.country),
            ("icao", "a.ModeS", &icao),
            ("operator", "a.RegisteredOwners", &self.operator),
            ("registration", "a.Registration", &self.registration),
            ("type", "a.ICAOTypeCode", &self.aircraft_type),
        ];
        for (name, column, filter) in strings {
            if let Some(filter) = filter {
                clause.push(column, name, filter.predicate(name)?);
            }
        }

        if let Some(date) = &self.date {
            if let Some(predicate) = date.predicate("date")? {
                clause.push(START_TIME_NORMALIZED, "date", predicate);
            }
        }

        let altitudes = [
            ("first_altitude", "f.FirstAltitude", &self.first_altitude),
            ("last_altitude", "f.LastAltitude", &self.last_altitude),
        ];
        for (name, column, filter) in altitudes {
            if let Some(filter) = filter {
                if let Some(predicate) = filter.predicate(name)? {
                    clause.push(column, name, predicate);
                }
            }
        }

        let flags = [
            ("emergency", "f.HadEmergency", &self.is_emergency),
            ("interesting", "a.Interested", &self.is_interesting),
        ];
        for (name, column, filter) in flags {
            if let Some(filter) = filter {
                clause.push(column, name, filter.predicate(name)?);
            }
        }

        Ok(clause)
    }

    /// ORDER BY clause for the configured sort keys
    pub fn order_by(&self) -> String {
        order_by_clause(
            self.sort1.as_deref(),
            self.sort1_ascending,
            self.sort2.as_deref(),
            self.sort2_ascending,
        )
    }

    pub fn paging(&self) -> Paging {
        Paging::from_rows(self.from_row, self.to_row)
    }

    /// True when no filter is set
    pub fn is_unfiltered(&self) -> bool {
        self.callsign.is_none()
            && self.country.is_none()
            && self.date.is_none()
            && self.first_altitude.is_none()
            && self.last_altitude.is_none()
            && self.icao.is_none()
            && self.is_emergency.is_none()
            && self.is_interesting.is_none()
            && self.operator.is_none()
            && self.registration.is_none()
            && self.aircraft_type.is_none()
    }
}
