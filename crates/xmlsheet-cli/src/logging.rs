//! Logging setup using `tracing-subscriber`.
//!
//! `RUST_LOG` takes precedence; otherwise the level is `warn`, or `debug`
//! with `--verbose`. Logs go to stderr so exports on stdout stay clean.

use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
pub fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
