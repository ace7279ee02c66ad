//! CLI command implementations

pub mod aircraft;
pub mod completions;
pub mod config;
pub mod db;
pub mod flights;
pub mod init;
pub mod settings;
pub mod user;
