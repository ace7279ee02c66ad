//! fdb: settings and flight-log database tooling for an ADS-B tracker
//!
//! - [`core::settings`]: the application settings graph, with dotted-path
//!   editing and validation
//! - [`core::criteria`]: flight search filters and their SQL translation
//! - [`core::db`]: the BaseStation-layout SQLite database with lock retry

pub mod cli;
pub mod core;
pub mod logging;
