//! Run artifacts written next to the generated dataset: the `run.json`
//! manifest and the `logs.jsonl` event log.

mod logging;
mod run;

pub use logging::init_run_logging;
pub use run::{RunContext, RunPaths, finish_run, start_run};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("run directory error: {0}")]
    Io(#[from] std::io::Error),
    #[error("run manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error("logging setup failed: {0}")]
    Logging(String),
}

pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
