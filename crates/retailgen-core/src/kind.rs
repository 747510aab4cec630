use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Every entity the generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Franchises,
    Categories,
    Brands,
    Products,
    ZipCodes,
    Stores,
    Skus,
    Employees,
    Sales,
    Dates,
    Times,
}

/// Declared generation order. Sub-seeds are drawn from the root stream in
/// this order, so reordering it changes every downstream dataset.
pub const ENTITY_ORDER: [EntityKind; 11] = [
    EntityKind::Franchises,
    EntityKind::Categories,
    EntityKind::Brands,
    EntityKind::Products,
    EntityKind::ZipCodes,
    EntityKind::Stores,
    EntityKind::Skus,
    EntityKind::Employees,
    EntityKind::Sales,
    EntityKind::Dates,
    EntityKind::Times,
];

impl EntityKind {
    /// Stable lowercase name used for output files and spill files.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Franchises => "franchises",
            EntityKind::Categories => "categories",
            EntityKind::Brands => "brands",
            EntityKind::Products => "products",
            EntityKind::ZipCodes => "zipcodes",
            EntityKind::Stores => "stores",
            EntityKind::Skus => "skus",
            EntityKind::Employees => "employees",
            EntityKind::Sales => "sales",
            EntityKind::Dates => "dates",
            EntityKind::Times => "times",
        }
    }

    /// Ids derived from the record's value (`YYYYMMDD`, `HHMM`) rather than
    /// issued in sequence.
    pub fn has_derived_ids(self) -> bool {
        matches!(self, EntityKind::Dates | EntityKind::Times)
    }

    /// Entities whose materialized records this entity reads.
    pub fn dependencies(self) -> &'static [EntityKind] {
        match self {
            EntityKind::Franchises | EntityKind::ZipCodes => &[],
            EntityKind::Dates | EntityKind::Times => &[],
            EntityKind::Categories | EntityKind::Brands => &[EntityKind::Franchises],
            EntityKind::Products => &[
                EntityKind::Franchises,
                EntityKind::Categories,
                EntityKind::Brands,
            ],
            EntityKind::Stores => &[EntityKind::Franchises, EntityKind::ZipCodes],
            EntityKind::Skus => &[EntityKind::Products],
            EntityKind::Employees => &[EntityKind::Stores],
            EntityKind::Sales => &[
                EntityKind::Franchises,
                EntityKind::Stores,
                EntityKind::Employees,
                EntityKind::Products,
                EntityKind::Skus,
            ],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ENTITY_ORDER
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| CoreError::UnknownEntity(value.to_string()))
    }
}
