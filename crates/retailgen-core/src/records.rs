//! Entity records emitted by the generators.
//!
//! Every entity carries a surrogate `id`: sequential from 1 in emission
//! order, plus one sentinel record with `id = -1` that stands for
//! "Unknown". Field names serialize in PascalCase to match the published
//! dataset layout.

use serde::{Deserialize, Serialize};

/// Reserved id of the "Unknown/unassigned" record.
pub const SENTINEL_ID: i64 = -1;

const UNKNOWN: &str = "Unknown";

/// Common behavior of all entity records.
pub trait Record {
    fn id(&self) -> i64;

    /// Return the record with its surrogate key replaced.
    fn with_id(self, id: i64) -> Self;

    fn is_sentinel(&self) -> bool {
        self.id() == SENTINEL_ID
    }
}

/// Running counter handing out surrogate keys in emission order.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: i64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Stamp the next id onto `record`.
    pub fn assign<T: Record>(&mut self, record: T) -> T {
        let id = self.next;
        self.next += 1;
        record.with_id(id)
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> i64 {
        self.next - 1
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Record for $ty {
                fn id(&self) -> i64 {
                    self.id
                }

                fn with_id(mut self, id: i64) -> Self {
                    self.id = id;
                    self
                }
            }
        )+
    };
}

impl_record!(
    Franchise,
    Category,
    Brand,
    Product,
    ZipCode,
    Store,
    Sku,
    Employee,
    CalendarDate,
    TimeOfDay,
    Sale,
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Franchise {
    #[serde(rename = "id")]
    pub id: i64,
    pub name: String,
    pub international: Option<String>,
    pub products: Option<i64>,
    pub stores: Option<i64>,
    pub employees: Option<i64>,
}

impl Franchise {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            name: UNKNOWN.to_string(),
            international: None,
            products: None,
            stores: None,
            employees: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Category {
    #[serde(rename = "id")]
    pub id: i64,
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub sub_type: String,
}

impl Category {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            name: UNKNOWN.to_string(),
            kind: UNKNOWN.to_string(),
            sub_type: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Brand {
    #[serde(rename = "id")]
    pub id: i64,
    pub name: String,
}

impl Brand {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            name: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(rename = "id")]
    pub id: i64,
    pub name: String,
    pub brand_id: i64,
    pub category_id: i64,
    pub price: Option<f64>,
}

impl Product {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            name: UNKNOWN.to_string(),
            brand_id: SENTINEL_ID,
            category_id: SENTINEL_ID,
            price: None,
        }
    }

    /// Unit price in whole cents; the sentinel is priced at zero.
    pub fn price_cents(&self) -> i64 {
        self.price.map(|price| (price * 100.0).round() as i64).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ZipCode {
    #[serde(rename = "id")]
    pub id: i64,
    pub zip_code: String,
    pub country_code: String,
    pub locale_name: Option<String>,
    pub city_name: Option<String>,
    pub region: Option<String>,
}

impl ZipCode {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            zip_code: UNKNOWN.to_string(),
            country_code: UNKNOWN.to_string(),
            locale_name: None,
            city_name: None,
            region: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Store {
    #[serde(rename = "id")]
    pub id: i64,
    pub store_number: Option<String>,
    pub name: String,
    pub zip_code_id: i64,
    pub zip_code: Option<String>,
    pub country_code: Option<String>,
    pub franchise_id: i64,
    pub franchise_name: Option<String>,
    pub employees: Option<i64>,
}

impl Store {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            store_number: None,
            name: UNKNOWN.to_string(),
            zip_code_id: SENTINEL_ID,
            zip_code: None,
            country_code: None,
            franchise_id: SENTINEL_ID,
            franchise_name: None,
            employees: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sku {
    #[serde(rename = "id")]
    pub id: i64,
    pub product_id: i64,
    pub size: String,
    pub color: String,
}

impl Sku {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            product_id: SENTINEL_ID,
            size: UNKNOWN.to_string(),
            color: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Employee {
    #[serde(rename = "id")]
    pub id: i64,
    pub store_id: i64,
    #[serde(rename = "Firstname")]
    pub first_name: String,
    #[serde(rename = "Lastname")]
    pub last_name: String,
    pub sex: String,
}

impl Employee {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            store_id: SENTINEL_ID,
            first_name: UNKNOWN.to_string(),
            last_name: UNKNOWN.to_string(),
            sex: UNKNOWN.to_string(),
        }
    }
}

/// Calendar dimension row keyed by `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CalendarDate {
    #[serde(rename = "id")]
    pub id: i64,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub day_name: Option<String>,
    pub month_name: Option<String>,
}

impl CalendarDate {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            year: None,
            month: None,
            day: None,
            day_name: None,
            month_name: None,
        }
    }
}

/// Time-of-day dimension row keyed by `HHMM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimeOfDay {
    #[serde(rename = "id")]
    pub id: i64,
    pub hour: Option<i32>,
    pub minute: Option<i32>,
    pub twelve_hour: Option<String>,
    pub twenty_four_hour: Option<String>,
}

impl TimeOfDay {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            hour: None,
            minute: None,
            twelve_hour: None,
            twenty_four_hour: None,
        }
    }
}

/// One basket line of a simulated store visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sale {
    #[serde(rename = "id")]
    pub id: i64,
    pub franchise_id: i64,
    pub store_id: i64,
    pub brand_id: i64,
    pub product_id: i64,
    pub sku_id: i64,
    pub date_id: i64,
    pub time_id: i64,
    pub receipt: Option<String>,
    pub checkout_employee_id: i64,
    pub quantity: Option<i64>,
    pub unit_price: Option<f64>,
    pub discount_price: Option<f64>,
    pub total_price: Option<f64>,
}

impl Sale {
    pub fn unknown() -> Self {
        Self {
            id: SENTINEL_ID,
            franchise_id: SENTINEL_ID,
            store_id: SENTINEL_ID,
            brand_id: SENTINEL_ID,
            product_id: SENTINEL_ID,
            sku_id: SENTINEL_ID,
            date_id: SENTINEL_ID,
            time_id: SENTINEL_ID,
            receipt: None,
            checkout_employee_id: SENTINEL_ID,
            quantity: None,
            unit_price: None,
            discount_price: None,
            total_price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_assigns_contiguous_ids() {
        let mut ids = IdSequence::new();
        let first = ids.assign(Brand::unknown());
        let second = ids.assign(Brand::unknown());

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(ids.issued(), 2);
        assert!(Brand::unknown().is_sentinel());
    }

    #[test]
    fn price_cents_rounds_to_whole_cents() {
        let mut product = Product::unknown();
        assert_eq!(product.price_cents(), 0);
        product.price = Some(19.99);
        assert_eq!(product.price_cents(), 1999);
    }
}
