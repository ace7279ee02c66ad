//! `fdb init` command - Initialize a new fdb project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::db::{DbError, FlightDatabase};
use crate::core::project::{Project, ProjectError};
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .fdb/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    let project = match project {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} fdb project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("fdb init --force").yellow());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "{} Initialized fdb project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );

    let settings = project.settings()?;
    let db_path = project.database_path(&settings);
    let config = Config::load(Some(project.root()));
    match FlightDatabase::create(&db_path, config.lock_retry()) {
        Ok(_) => println!(
            "{} Created flight database {}",
            style("✓").green(),
            style(db_path.display()).cyan()
        ),
        Err(DbError::AlreadyExists(_)) => {
            // Opening creates any missing tables
            FlightDatabase::open(&db_path, config.lock_retry())?;
            println!(
                "{} Using existing flight database {}",
                style("✓").green(),
                style(db_path.display()).cyan()
            );
        }
        Err(e) => return Err(e.into()),
    }

    println!();
    println!("Created project structure:");
    println!("  {}", style(".fdb/config.yaml").dim());
    println!("  {}", style(".fdb/settings.yaml").dim());
    println!();
    println!("Next steps:");
    println!(
        "  {} Add a receiver",
        style("fdb settings add receiver \"Roof\"").yellow()
    );
    println!(
        "  {} Check the settings",
        style("fdb settings validate").yellow()
    );
    println!("  {} Search flights", style("fdb flights").yellow());
    Ok(())
}
