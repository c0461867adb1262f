//! Log output for the CLI.
//!
//! `RUST_LOG` takes precedence over the level derived from `-v`/`-q`.

use crate::commands::LogFormatArg;
use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the verbosity level
#[must_use]
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()))
}

/// Install the global subscriber writing to stderr.
///
/// A subscriber that is already installed is left in place.
pub fn init(verbosity: Verbosity, format: LogFormatArg) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormatArg::Text => builder.try_init(),
        LogFormatArg::Json => builder.json().try_init(),
    };
}
