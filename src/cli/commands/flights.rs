//! `fdb flights` command - Search recorded flights
//!
//! Text filters take `[!][condition:]value`, where condition is one of
//! `equals`, `contains`, `starts_with` or `ends_with`. Ranges take
//! `[!]low..high` with either side optional; flags take `[!]true|false`.

use chrono::{DateTime, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};
use tracing::warn;

use crate::cli::helpers::{discover_project, effective_format, load_config, open_database};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::criteria::{FilterBool, FilterRange, FilterString, SearchCriteria, SortField};
use crate::core::db::{DbError, FlightRecord};

#[derive(clap::Args, Debug)]
pub struct FlightsArgs {
    /// Callsign filter (e.g. "starts_with:BAW")
    #[arg(long, allow_hyphen_values = true)]
    pub callsign: Option<FilterString>,

    /// Mode-S country filter
    #[arg(long, allow_hyphen_values = true)]
    pub country: Option<FilterString>,

    /// ICAO 24-bit address filter
    #[arg(long, allow_hyphen_values = true)]
    pub icao: Option<FilterString>,

    /// Registered owner filter
    #[arg(long, allow_hyphen_values = true)]
    pub operator: Option<FilterString>,

    /// Registration filter
    #[arg(long = "reg", allow_hyphen_values = true)]
    pub registration: Option<FilterString>,

    /// ICAO type code filter
    #[arg(long = "type", allow_hyphen_values = true)]
    pub aircraft_type: Option<FilterString>,

    /// Flight start range (e.g. "2024-06-01..2024-06-30")
    #[arg(long, allow_hyphen_values = true)]
    pub date: Option<FilterRange<DateTime<Utc>>>,

    /// First altitude range in feet (e.g. "..1000")
    #[arg(long, allow_hyphen_values = true)]
    pub first_altitude: Option<FilterRange<i32>>,

    /// Last altitude range in feet
    #[arg(long, allow_hyphen_values = true)]
    pub last_altitude: Option<FilterRange<i32>>,

    /// Only flights that did (or, with "!", did not) squawk an emergency
    #[arg(long)]
    pub emergency: Option<FilterBool>,

    /// Only aircraft flagged as interesting
    #[arg(long)]
    pub interesting: Option<FilterBool>,

    /// Primary sort key
    #[arg(long, value_parser = sort_keys(), ignore_case = true)]
    pub sort1: Option<String>,

    /// Sort the primary key descending
    #[arg(long)]
    pub desc1: bool,

    /// Secondary sort key
    #[arg(long, value_parser = sort_keys(), ignore_case = true)]
    pub sort2: Option<String>,

    /// Sort the secondary key descending
    #[arg(long)]
    pub desc2: bool,

    /// First row to return (0-based)
    #[arg(long, default_value_t = 0)]
    pub from_row: i64,

    /// Last row to return, inclusive (default: one page)
    #[arg(long, conflicts_with = "all")]
    pub to_row: Option<i64>,

    /// Return every matching row
    #[arg(long)]
    pub all: bool,

    /// Print only the number of matching flights
    #[arg(long)]
    pub count: bool,

    /// Restrict to flights of one aircraft (ICAO address)
    #[arg(long)]
    pub aircraft: Option<String>,
}

fn sort_keys() -> clap::builder::PossibleValuesParser {
    clap::builder::PossibleValuesParser::new(SortField::all().iter().map(|f| f.key()))
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("start", "START", 21),
    ColumnDef::new("callsign", "CALLSIGN", 10),
    ColumnDef::new("icao", "ICAO", 8),
    ColumnDef::new("reg", "REG", 10),
    ColumnDef::new("type", "TYPE", 6),
    ColumnDef::new("operator", "OPERATOR", 24),
    ColumnDef::new("country", "COUNTRY", 16),
    ColumnDef::new("first_alt", "FIRST ALT", 10),
    ColumnDef::new("last_alt", "LAST ALT", 10),
    ColumnDef::new("emergency", "EMERG", 6),
];

impl FlightsArgs {
    /// Build search criteria; `page_size` applies when no row range is given
    pub fn criteria(&self, page_size: i64) -> SearchCriteria {
        let to_row = match (self.all, self.to_row) {
            (true, _) => -1,
            (false, Some(to_row)) => to_row,
            (false, None) => self
                .from_row
                .max(0)
                .saturating_add(page_size.max(1) - 1),
        };
        SearchCriteria {
            callsign: self.callsign.clone(),
            country: self.country.clone(),
            date: self.date.clone(),
            first_altitude: self.first_altitude.clone(),
            last_altitude: self.last_altitude.clone(),
            icao: self.icao.clone(),
            is_emergency: self.emergency,
            is_interesting: self.interesting,
            operator: self.operator.clone(),
            registration: self.registration.clone(),
            aircraft_type: self.aircraft_type.clone(),
            sort1: self.sort1.clone(),
            sort1_ascending: !self.desc1,
            sort2: self.sort2.clone(),
            sort2_ascending: !self.desc2,
            from_row: self.from_row,
            to_row,
        }
    }
}

pub fn run(args: FlightsArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = load_config(global);
    let settings = project.settings()?;
    let db = open_database(&project, &settings, &config)?;

    let criteria = args.criteria(config.page_size());
    if criteria.sort2.is_some() && criteria.sort1.is_none() {
        warn!("--sort2 has no effect without --sort1");
    }

    let aircraft_id = match &args.aircraft {
        Some(icao) => Some(
            db.get_aircraft_by_icao(icao)?
                .ok_or_else(|| DbError::NotFound(icao.clone()))?
                .aircraft_id,
        ),
        None => None,
    };

    if args.count {
        let count = match aircraft_id {
            Some(id) => db.count_flights_for_aircraft(id, &criteria)?,
            None => db.count_flights(&criteria)?,
        };
        println!("{}", count);
        return Ok(());
    }

    let records = match aircraft_id {
        Some(id) => db.get_flights_for_aircraft(id, &criteria)?,
        None => db.get_flights(&criteria)?,
    };

    match effective_format(global, &config) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&records).into_diagnostic()?);
        }
        format => {
            let rows: Vec<TableRow> = records.iter().map(flight_row).collect();
            let mut formatter = TableFormatter::new(COLUMNS, "flight");
            if global.quiet {
                formatter = formatter.without_summary();
            }
            formatter.output(&rows, format);

            let page_full = criteria
                .paging()
                .take
                .is_some_and(|take| take > 0 && records.len() as i64 >= take);
            if page_full && !global.quiet && matches!(format, OutputFormat::Auto | OutputFormat::Tsv)
            {
                println!(
                    "{}",
                    style(format!(
                        "More flights may match. Use --from-row {} or --all to see them.",
                        criteria.from_row.max(0) + records.len() as i64
                    ))
                    .dim()
                );
            }
        }
    }

    Ok(())
}

fn flight_row(record: &FlightRecord) -> TableRow {
    let flight = &record.flight;
    let aircraft = &record.aircraft;
    TableRow::new(flight.flight_id.to_string())
        .cell("id", CellValue::Number(flight.flight_id))
        .cell("start", CellValue::DateTime(flight.start_time))
        .cell("callsign", CellValue::opt_text(flight.callsign.as_deref()))
        .cell("icao", CellValue::Id(aircraft.mode_s.clone()))
        .cell("reg", CellValue::opt_text(aircraft.registration.as_deref()))
        .cell("type", CellValue::opt_text(aircraft.icao_type_code.as_deref()))
        .cell(
            "operator",
            CellValue::opt_text(aircraft.registered_owners.as_deref()),
        )
        .cell(
            "country",
            CellValue::opt_text(aircraft.mode_s_country.as_deref()),
        )
        .cell(
            "first_alt",
            CellValue::opt_number(flight.first_altitude.map(i64::from)),
        )
        .cell(
            "last_alt",
            CellValue::opt_number(flight.last_altitude.map(i64::from)),
        )
        .cell("emergency", CellValue::Flag(flight.had_emergency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: FlightsArgs,
    }

    fn parse(argv: &[&str]) -> FlightsArgs {
        let mut full = vec!["fdb"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn test_default_page() {
        let criteria = parse(&["--from-row", "10"]).criteria(50);
        assert_eq!(criteria.from_row, 10);
        assert_eq!(criteria.to_row, 59);
    }

    #[test]
    fn test_huge_from_row_does_not_overflow() {
        let criteria = parse(&["--from-row", "9223372036854775807"]).criteria(50);
        assert_eq!(criteria.to_row, i64::MAX);
        assert_eq!(criteria.paging().take, Some(1));

        let criteria = parse(&["--to-row", "9223372036854775807"]).criteria(50);
        assert_eq!(criteria.paging().take, Some(i64::MAX));
    }

    #[test]
    fn test_all_is_unbounded() {
        let criteria = parse(&["--all"]).criteria(50);
        assert!(criteria.paging().is_unbounded());
    }

    #[test]
    fn test_filters_are_parsed() {
        let args = parse(&[
            "--callsign",
            "!starts_with:BAW",
            "--first-altitude",
            "-500..1000",
            "--emergency",
            "true",
            "--sort1",
            "callsign",
            "--desc1",
        ]);
        let criteria = args.criteria(50);
        let callsign = criteria.callsign.unwrap();
        assert!(callsign.reverse_condition);
        assert_eq!(callsign.value, "BAW");
        assert_eq!(criteria.first_altitude.unwrap().lower, Some(-500));
        assert_eq!(criteria.is_emergency, Some(FilterBool::equals(true)));
        assert_eq!(criteria.sort1.as_deref(), Some("callsign"));
        assert!(!criteria.sort1_ascending);
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        assert!(Harness::try_parse_from(["fdb", "--sort1", "speed"]).is_err());
    }

    #[test]
    fn test_bad_range_is_rejected() {
        assert!(Harness::try_parse_from(["fdb", "--last-altitude", "high"]).is_err());
    }
}
