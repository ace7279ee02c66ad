//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    aircraft::AircraftCommands, completions::CompletionsArgs, config::ConfigCommands,
    db::DbCommands, flights::FlightsArgs, init::InitArgs, settings::SettingsCommands,
    user::UserCommands,
};

#[derive(Parser)]
#[command(name = "fdb")]
#[command(author, version, about = "Flight-log database and tracker settings toolkit")]
#[command(
    long_about = "Search and edit a BaseStation-layout flight database, and manage the settings of an ADS-B aircraft tracker."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .fdb/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new fdb project
    Init(InitArgs),

    /// Search recorded flights
    Flights(FlightsArgs),

    /// Look up and edit aircraft records
    #[command(subcommand)]
    Aircraft(AircraftCommands),

    /// View, edit and validate tracker settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Manage web site users
    #[command(subcommand)]
    User(UserCommands),

    /// Flight database maintenance
    #[command(subcommand)]
    Db(DbCommands),

    /// Manage fdb configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
