//! `fdb aircraft` command - Aircraft database editor
//!
//! `set` is an upsert keyed by ICAO address: unknown aircraft are created,
//! known ones keep their creation time and get a fresh modification time.

use clap::Subcommand;
use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{discover_project, effective_format, load_config, open_database};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::db::{Aircraft, AircraftEdit, DbError, FlightDatabase};

#[derive(Subcommand, Debug)]
pub enum AircraftCommands {
    /// Show one aircraft record
    Get(GetArgs),

    /// Create or update an aircraft record
    Set(SetArgs),

    /// Create or update aircraft from a CSV file
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// ICAO 24-bit address (hex)
    pub icao: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// ICAO 24-bit address (hex)
    pub icao: String,

    /// Registration; an empty value clears it
    #[arg(long)]
    pub registration: Option<String>,

    /// ICAO type code
    #[arg(long = "type")]
    pub icao_type_code: Option<String>,

    /// Registered owner / operator
    #[arg(long)]
    pub operator: Option<String>,

    /// Mode-S country
    #[arg(long)]
    pub country: Option<String>,

    /// Model description
    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Operator flag code
    #[arg(long)]
    pub flag: Option<String>,

    #[arg(long)]
    pub serial: Option<String>,

    #[arg(long)]
    pub year_built: Option<String>,

    /// Free-text user tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Mark the aircraft as interesting
    #[arg(long)]
    pub interested: Option<bool>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with an `icao` column plus any editable fields
    pub file: PathBuf,

    /// Validate the CSV without writing to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,
}

impl SetArgs {
    fn edit(&self) -> AircraftEdit {
        AircraftEdit {
            mode_s_country: self.country.clone(),
            registration: self.registration.clone(),
            icao_type_code: self.icao_type_code.clone(),
            model: self.model.clone(),
            manufacturer: self.manufacturer.clone(),
            registered_owners: self.operator.clone(),
            operator_flag_code: self.flag.clone(),
            serial_no: self.serial.clone(),
            year_built: self.year_built.clone(),
            interested: self.interested,
            user_tag: self.tag.clone(),
            ..AircraftEdit::default()
        }
    }
}

pub fn run(cmd: AircraftCommands, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = load_config(global);
    let settings = project.settings()?;
    let db = open_database(&project, &settings, &config)?;
    let format = effective_format(global, &config);

    match cmd {
        AircraftCommands::Get(args) => run_get(&db, &args, format),
        AircraftCommands::Set(args) => run_set(&db, &args, global),
        AircraftCommands::Import(args) => run_import(&db, &args, global),
    }
}

fn run_get(db: &FlightDatabase, args: &GetArgs, format: OutputFormat) -> Result<()> {
    let aircraft = db
        .get_aircraft_by_icao(&args.icao)?
        .ok_or_else(|| DbError::NotFound(args.icao.clone()))?;
    print_aircraft(&aircraft, format)
}

fn run_set(db: &FlightDatabase, args: &SetArgs, global: &GlobalOpts) -> Result<()> {
    if !is_icao(&args.icao) {
        return Err(miette::miette!(
            "'{}' is not a 24-bit hex ICAO address",
            args.icao
        ));
    }
    let edit = args.edit();
    if edit.is_empty() && !global.quiet {
        println!(
            "{} No fields given; only the modification time changes",
            style("!").yellow()
        );
    }

    let aircraft = db.upsert_aircraft_by_icao(&args.icao, &edit)?;
    if !global.quiet {
        println!(
            "{} Saved aircraft {}",
            style("✓").green(),
            style(&aircraft.mode_s).cyan()
        );
    }
    Ok(())
}

/// Import statistics
#[derive(Debug, Default, PartialEq)]
struct ImportStats {
    rows_processed: usize,
    saved: usize,
    errors: usize,
}

fn run_import(db: &FlightDatabase, args: &ImportArgs, global: &GlobalOpts) -> Result<()> {
    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    if !global.quiet {
        println!(
            "{} Importing aircraft from {}{}",
            style("→").blue(),
            style(args.file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let stats = import_csv(db, &args.file, args.dry_run, args.skip_errors)?;

    if !global.quiet {
        println!();
        println!(
            "{} {} row(s) processed, {} saved, {} error(s)",
            style("✓").green(),
            stats.rows_processed,
            style(stats.saved).cyan(),
            stats.errors
        );
    }
    Ok(())
}

fn import_csv(
    db: &FlightDatabase,
    path: &Path,
    dry_run: bool,
    skip_errors: bool,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let file = File::open(path).into_diagnostic()?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("icao") {
        return Err(miette::miette!("CSV needs an 'icao' column"));
    }

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let outcome = result
            .map_err(|e| format!("CSV parse error: {}", e))
            .and_then(|record| row_edit(&record, &header_map))
            .and_then(|(icao, edit)| {
                if dry_run {
                    return Ok(());
                }
                db.upsert_aircraft_by_icao(&icao, &edit)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            });

        if let Err(message) = outcome {
            eprintln!("{} Row {}: {}", style("✗").red(), row_num, message);
            stats.errors += 1;
            if !skip_errors {
                return Err(miette::miette!("Row {}: {}", row_num, message));
            }
            continue;
        }
        stats.saved += 1;
    }

    Ok(stats)
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase().trim().to_string(), i))
        .collect()
}

/// Get a field value from a CSV record; `None` when the column is absent
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
}

/// Parse one CSV row; empty cells leave the stored value unchanged
fn row_edit(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> std::result::Result<(String, AircraftEdit), String> {
    let field = |name: &str| get_field(record, header_map, name).filter(|s| !s.is_empty());

    let icao = field("icao").ok_or("missing required field 'icao'")?;
    if !is_icao(&icao) {
        return Err(format!("'{}' is not a 24-bit hex ICAO address", icao));
    }

    let interested = match field("interested") {
        Some(text) => Some(parse_flag(&text).ok_or(format!("invalid interested flag '{}'", text))?),
        None => None,
    };

    let edit = AircraftEdit {
        registration: field("registration"),
        icao_type_code: field("type"),
        registered_owners: field("operator"),
        mode_s_country: field("country"),
        model: field("model"),
        manufacturer: field("manufacturer"),
        operator_flag_code: field("flag"),
        serial_no: field("serial"),
        year_built: field("year_built"),
        user_tag: field("tag"),
        interested,
        ..AircraftEdit::default()
    };
    Ok((icao, edit))
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn is_icao(text: &str) -> bool {
    let text = text.trim();
    text.len() == 6 && text.chars().all(|c| c.is_ascii_hexdigit())
}

fn print_aircraft(aircraft: &Aircraft, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(aircraft).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", aircraft.mode_s),
        OutputFormat::Yaml | OutputFormat::Auto => {
            print!("{}", serde_yml::to_string(aircraft).into_diagnostic()?);
        }
        _ => {
            let text = |v: &Option<String>| v.clone().unwrap_or_default();
            let fields = [
                ("icao", aircraft.mode_s.clone()),
                ("registration", text(&aircraft.registration)),
                ("type", text(&aircraft.icao_type_code)),
                ("model", text(&aircraft.model)),
                ("operator", text(&aircraft.registered_owners)),
                ("country", text(&aircraft.mode_s_country)),
                ("interested", aircraft.interested.to_string()),
                ("last_modified", aircraft.last_modified.to_rfc3339()),
            ];
            for (key, value) in fields {
                println!("{}\t{}", key, value);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::LockRetry;
    use tempfile::tempdir;

    #[test]
    fn test_is_icao() {
        assert!(is_icao("400a0b"));
        assert!(is_icao(" 4CA2D1 "));
        assert!(!is_icao("40A0B"));
        assert!(!is_icao("G-EUPT"));
    }

    #[test]
    fn test_import_csv_upserts_rows() {
        let tmp = tempdir().unwrap();
        let csv_path = tmp.path().join("aircraft.csv");
        std::fs::write(
            &csv_path,
            "ICAO,Registration,Type,Operator,Interested\n\
             400a0b,G-EUPT,A319,British Airways,yes\n\
             4CA2D1,EI-DCL,,Ryanair,\n",
        )
        .unwrap();

        let db = FlightDatabase::open_in_memory().unwrap();
        let stats = import_csv(&db, &csv_path, false, false).unwrap();
        assert_eq!(
            stats,
            ImportStats {
                rows_processed: 2,
                saved: 2,
                errors: 0
            }
        );

        let ba = db.get_aircraft_by_icao("400A0B").unwrap().unwrap();
        assert_eq!(ba.registration.as_deref(), Some("G-EUPT"));
        assert!(ba.interested);
        let ryr = db.get_aircraft_by_icao("4ca2d1").unwrap().unwrap();
        assert_eq!(ryr.icao_type_code, None);
    }

    #[test]
    fn test_import_csv_dry_run_and_errors() {
        let tmp = tempdir().unwrap();
        let csv_path = tmp.path().join("aircraft.csv");
        std::fs::write(
            &csv_path,
            "icao,interested\nZZZZZZ,\n3C6444,maybe\n400A0B,no\n",
        )
        .unwrap();

        let db = FlightDatabase::open_in_memory().unwrap();
        assert!(import_csv(&db, &csv_path, false, false).is_err());

        let stats = import_csv(&db, &csv_path, true, true).unwrap();
        assert_eq!(stats.errors, 2);
        assert_eq!(stats.saved, 1);
        assert!(db.get_aircraft_by_icao("400A0B").unwrap().is_none());
    }

    #[test]
    fn test_import_csv_skips_rows_the_database_rejects() {
        let tmp = tempdir().unwrap();
        let csv_path = tmp.path().join("aircraft.csv");
        std::fs::write(&csv_path, "icao\n400A0B\n4CA2D1\n").unwrap();

        let db_path = tmp.path().join("flights.sqb");
        let db = FlightDatabase::open(&db_path, LockRetry::default()).unwrap();
        let other = rusqlite::Connection::open(&db_path).unwrap();
        other.execute_batch("DROP TABLE Aircraft;").unwrap();

        assert!(import_csv(&db, &csv_path, false, false).is_err());

        let stats = import_csv(&db, &csv_path, false, true).unwrap();
        assert_eq!(
            stats,
            ImportStats {
                rows_processed: 2,
                saved: 0,
                errors: 2
            }
        );
    }

    #[test]
    fn test_import_csv_requires_icao_column() {
        let tmp = tempdir().unwrap();
        let csv_path = tmp.path().join("aircraft.csv");
        std::fs::write(&csv_path, "registration\nG-EUPT\n").unwrap();

        let db = FlightDatabase::open_in_memory().unwrap();
        assert!(import_csv(&db, &csv_path, false, false).is_err());
    }
}
