//! One generator per entity.
//!
//! Each module exposes a pure `generate_*` function over explicit inputs and
//! the [`Entity`](crate::session::Entity) impl that wires it to a session.

pub mod brands;
pub mod calendar;
pub mod categories;
pub mod employees;
pub mod franchises;
pub mod products;
pub mod skus;
pub mod stores;
pub mod zipcodes;

pub use brands::generate_brands;
pub use calendar::{date_id, generate_dates, generate_times, time_id};
pub use categories::generate_categories;
pub use employees::{NameSampler, generate_employees};
pub use franchises::generate_franchises;
pub use products::generate_products;
pub use skus::generate_skus;
pub use stores::{Market, generate_stores};
pub use zipcodes::generate_zipcodes;
