//! Deterministic retail dataset generation.
//!
//! A [`GenerationSession`] owns the settings, reference tables and one
//! seeded stream per entity; entities are materialized on first request and
//! written in declared order by the [`GenerationEngine`].

pub mod assets;
pub mod cache;
pub mod checks;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod model;
pub mod output;
pub mod sales;
pub mod sampling;
pub mod session;
pub mod spill;

pub use cache::Cache;
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use model::{
    EntityReport, GenerationReport, OutputFormat, RunSettings, SalesSummary,
};
pub use session::{Entity, GenerationSession};
