//! Core contracts for the retail dataset generator.
//!
//! Defines the entity record types, the entity dependency graph and the
//! error type shared by the generation engine and the CLI.

pub mod error;
pub mod graph;
pub mod kind;
pub mod records;

pub use error::{CoreError, Result};
pub use graph::{DependencyReport, build_dependency_report, validate_order};
pub use kind::{ENTITY_ORDER, EntityKind};
pub use records::{
    Brand, CalendarDate, Category, Employee, Franchise, IdSequence, Product, Record, SENTINEL_ID,
    Sale, Sku, Store, TimeOfDay, ZipCode,
};
