use thiserror::Error;

/// Core error type shared across retailgen crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity name did not match any known entity.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
    /// A generation order places an entity before one of its dependencies.
    #[error("invalid generation order: {0}")]
    InvalidOrder(String),
    /// The entity graph contains a cycle.
    #[error("dependency cycle between: {}", .0.join(", "))]
    Cycle(Vec<String>),
}

/// Convenience alias for results returned by the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
