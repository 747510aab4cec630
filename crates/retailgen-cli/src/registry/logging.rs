use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

use super::{RegistryError, RegistryResult};

const DEFAULT_FILTER: &str = "info";

/// Human-readable events on stderr, filtered by `RUST_LOG` (default
/// `info`), and every event as JSON lines appended to `path`.
pub fn init_run_logging(path: &Path) -> RegistryResult<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = tracing_subscriber::fmt::layer()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_current_span(false)
        .with_writer(Mutex::new(file));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json)
        .with(console)
        .try_init()
        .map_err(|err| RegistryError::Logging(err.to_string()))
}
