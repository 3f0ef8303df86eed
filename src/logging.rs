//! Structured logging setup for callers of the pipeline.

use crate::error::{IngestError, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr `tracing` subscriber
///
/// `RUST_LOG` wins when set; otherwise this crate logs at `level`.
/// Calling it a second time returns a configuration error.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("metro_ingest={}", level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| IngestError::Configuration {
            message: format!("Failed to initialise logging: {}", e),
        })?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}
