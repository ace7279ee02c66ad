//! Core module - fundamental types and utilities

pub mod config;
pub mod criteria;
pub mod db;
pub mod project;
pub mod settings;

pub use config::Config;
pub use criteria::{CriteriaError, SearchCriteria};
pub use db::{DbError, FlightDatabase, LockRetry};
pub use project::{Project, ProjectError};
pub use settings::{Configuration, SettingsError};
