//! Logging initialisation.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoUtc;

/// Install the global `fmt` subscriber writing to stderr.
///
/// Timestamps are RFC 3339 in UTC; colours are only used when stderr is a
/// terminal. An unparsable `filter` falls back to `info`.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(ChronoUtc::rfc_3339())
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
