//! `fdb db` command - Flight database maintenance

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{discover_project, effective_format, load_config, open_database};
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Show row counts, schema version and file size
    Status,

    /// Show the database file path
    Path,
}

pub fn run(cmd: DbCommands, global: &GlobalOpts) -> Result<()> {
    let project = discover_project(global)?;
    let config = load_config(global);
    let settings = project.settings()?;

    match cmd {
        DbCommands::Path => {
            println!("{}", project.database_path(&settings).display());
            Ok(())
        }
        DbCommands::Status => {
            let db = open_database(&project, &settings, &config)?;
            let stats = db.statistics()?;

            match effective_format(global, &config) {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&stats).into_diagnostic()?);
                }
                OutputFormat::Yaml => {
                    print!("{}", serde_yml::to_string(&stats).into_diagnostic()?);
                }
                _ => {
                    println!("{}", style("Flight Database Status").bold());
                    println!("{}", style("─".repeat(40)).dim());
                    println!(
                        "Database: {}",
                        style(project.database_path(&settings).display()).cyan()
                    );
                    println!("Schema version: {}", stats.schema_version);
                    println!("Size: {:.1} KB", stats.db_size_bytes as f64 / 1024.0);
                    println!();
                    println!("Aircraft: {}", style(stats.aircraft).cyan());
                    println!("Sessions: {}", style(stats.sessions).cyan());
                    println!("Flights:  {}", style(stats.flights).cyan());
                    let retry = db.retry_policy();
                    println!();
                    println!(
                        "Lock retry: {} ms timeout, {} ms interval",
                        retry.timeout.as_millis(),
                        retry.interval.as_millis()
                    );
                }
            }
            Ok(())
        }
    }
}
