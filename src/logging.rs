//! Diagnostic logging to stderr
//!
//! `RUST_LOG` wins over the configured level. Output goes to stderr so it
//! never mixes with command output on stdout.

use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber; `verbose` forces `debug`
pub fn init(level: &str, verbose: bool) {
    let level = if verbose {
        "debug"
    } else if level.trim().is_empty() {
        "warn"
    } else {
        level.trim()
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
