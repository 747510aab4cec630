use thiserror::Error;

use retailgen_core::{CoreError, EntityKind};

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{entity} id {id} not found")]
    NotFound { entity: EntityKind, id: i64 },
    #[error("value {value} is outside the bounds of 0 - {total}")]
    OutOfBounds { value: i64, total: i64 },
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("gave up generating {what} after {attempts} attempts")]
    Exhausted { what: String, attempts: u32 },
    #[error("asset error: {0}")]
    Asset(String),
    #[error("integrity check failed: {0} issue(s)")]
    Integrity(usize),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("bson error: {0}")]
    Bson(#[from] bson::ser::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
