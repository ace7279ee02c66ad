//! Sort-key dispatch and row paging for flight searches

use serde::{Deserialize, Serialize};

/// Columns a flight search may be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Callsign,
    Country,
    Date,
    FirstAltitude,
    LastAltitude,
    Icao,
    Model,
    Type,
    Operator,
    Registration,
}

impl SortField {
    /// Look up a sort key case-insensitively; `None` when it is not allowed
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "callsign" => Some(SortField::Callsign),
            "country" => Some(SortField::Country),
            "date" => Some(SortField::Date),
            "firstaltitude" => Some(SortField::FirstAltitude),
            "lastaltitude" => Some(SortField::LastAltitude),
            "icao" => Some(SortField::Icao),
            "model" => Some(SortField::Model),
            "type" => Some(SortField::Type),
            "operator" => Some(SortField::Operator),
            "reg" => Some(SortField::Registration),
            _ => None,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SortField::Callsign => "callsign",
            SortField::Country => "country",
            SortField::Date => "date",
            SortField::FirstAltitude => "firstaltitude",
            SortField::LastAltitude => "lastaltitude",
            SortField::Icao => "icao",
            SortField::Model => "model",
            SortField::Type => "type",
            SortField::Operator => "operator",
            SortField::Registration => "reg",
        }
    }

    /// Column expression in the joined flights/aircraft query
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Callsign => "f.Callsign",
            SortField::Country => "a.ModeSCountry",
            SortField::Date => "f.StartTime",
            SortField::FirstAltitude => "f.FirstAltitude",
            SortField::LastAltitude => "f.LastAltitude",
            SortField::Icao => "a.ModeS",
            SortField::Model => "a.Type",
            SortField::Type => "a.ICAOTypeCode",
            SortField::Operator => "a.RegisteredOwners",
            SortField::Registration => "a.Registration",
        }
    }

    pub fn all() -> &'static [SortField] {
        &[
            SortField::Callsign,
            SortField::Country,
            SortField::Date,
            SortField::FirstAltitude,
            SortField::LastAltitude,
            SortField::Icao,
            SortField::Model,
            SortField::Type,
            SortField::Operator,
            SortField::Registration,
        ]
    }
}

fn direction(ascending: bool) -> &'static str {
    if ascending {
        "ASC"
    } else {
        "DESC"
    }
}

/// Build the ORDER BY clause for up to two sort keys.
///
/// An unrecognised primary key yields no ordering at all, which also drops
/// the secondary key. An unrecognised secondary key is ignored.
pub fn order_by_clause(
    sort1: Option<&str>,
    sort1_ascending: bool,
    sort2: Option<&str>,
    sort2_ascending: bool,
) -> String {
    let Some(primary) = sort1.and_then(SortField::parse) else {
        return String::new();
    };

    let mut clause = format!(
        " ORDER BY {} {}",
        primary.column(),
        direction(sort1_ascending)
    );
    if let Some(secondary) = sort2.and_then(SortField::parse) {
        clause.push_str(&format!(
            ", {} {}",
            secondary.column(),
            direction(sort2_ascending)
        ));
    }
    clause
}

/// Skip/take window derived from an inclusive row range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub skip: i64,
    /// `None` takes every remaining row
    pub take: Option<i64>,
}

impl Paging {
    /// Map `[from_row, to_row]` onto skip/take.
    ///
    /// `from_row` is clamped to zero; a negative `to_row` means no upper bound.
    pub fn from_rows(from_row: i64, to_row: i64) -> Self {
        let skip = from_row.max(0);
        let take = if to_row < 0 {
            None
        } else {
            Some(to_row.saturating_sub(skip).saturating_add(1).max(0))
        };
        Self { skip, take }
    }

    pub fn is_unbounded(&self) -> bool {
        self.skip == 0 && self.take.is_none()
    }

    /// SQLite's LIMIT takes -1 for "no limit"
    pub fn limit(&self) -> i64 {
        self.take.unwrap_or(-1)
    }
}
