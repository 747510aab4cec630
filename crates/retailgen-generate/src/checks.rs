//! Post-generation integrity checks: id shape per entity and foreign-key
//! resolution against already checked entities.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use retailgen_core::{
    Brand, CalendarDate, Category, Employee, EntityKind, Franchise, Product, Record, SENTINEL_ID,
    Sale, Sku, Store, TimeOfDay, ZipCode,
};

/// Issues kept in full; later ones are only counted.
const MAX_RECORDED_ISSUES: usize = 100;

/// One integrity violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityIssue {
    pub entity: EntityKind,
    pub id: Option<i64>,
    pub field: Option<String>,
    pub message: String,
}

/// A foreign key carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub field: &'static str,
    pub target: EntityKind,
    pub value: i64,
}

impl ForeignKey {
    const fn new(field: &'static str, target: EntityKind, value: i64) -> Self {
        Self {
            field,
            target,
            value,
        }
    }
}

/// Records that point at other entities.
pub trait References: Record {
    fn references(&self) -> Vec<ForeignKey> {
        Vec::new()
    }
}

impl References for Franchise {}
impl References for Category {}
impl References for Brand {}
impl References for ZipCode {}
impl References for CalendarDate {}
impl References for TimeOfDay {}

impl References for Product {
    fn references(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey::new("BrandId", EntityKind::Brands, self.brand_id),
            ForeignKey::new("CategoryId", EntityKind::Categories, self.category_id),
        ]
    }
}

impl References for Store {
    fn references(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey::new("ZipCodeId", EntityKind::ZipCodes, self.zip_code_id),
            ForeignKey::new("FranchiseId", EntityKind::Franchises, self.franchise_id),
        ]
    }
}

impl References for Sku {
    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new("ProductId", EntityKind::Products, self.product_id)]
    }
}

impl References for Employee {
    fn references(&self) -> Vec<ForeignKey> {
        vec![ForeignKey::new("StoreId", EntityKind::Stores, self.store_id)]
    }
}

impl References for Sale {
    fn references(&self) -> Vec<ForeignKey> {
        vec![
            ForeignKey::new("FranchiseId", EntityKind::Franchises, self.franchise_id),
            ForeignKey::new("StoreId", EntityKind::Stores, self.store_id),
            ForeignKey::new("BrandId", EntityKind::Brands, self.brand_id),
            ForeignKey::new("ProductId", EntityKind::Products, self.product_id),
            ForeignKey::new("SkuId", EntityKind::Skus, self.sku_id),
            ForeignKey::new("DateId", EntityKind::Dates, self.date_id),
            ForeignKey::new("TimeId", EntityKind::Times, self.time_id),
            ForeignKey::new(
                "CheckoutEmployeeId",
                EntityKind::Employees,
                self.checkout_employee_id,
            ),
        ]
    }
}

/// Collects issues across every entity of a run.
#[derive(Debug, Default)]
pub struct IntegrityChecker {
    keys: HashMap<EntityKind, HashSet<i64>>,
    issues: Vec<IntegrityIssue>,
    issue_count: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ids` resolvable as foreign-key targets of `kind` ahead of that
    /// entity's own check.
    pub fn register_keys<I>(&mut self, kind: EntityKind, ids: I)
    where
        I: IntoIterator<Item = i64>,
    {
        self.keys.entry(kind).or_default().extend(ids);
    }

    /// Start checking one entity's records in emission order.
    pub fn begin(&mut self, kind: EntityKind) -> EntityCheck<'_> {
        EntityCheck {
            checker: self,
            kind,
            next_id: 1,
            last_id: None,
            sentinels: 0,
            observed: 0,
            ids: (kind != EntityKind::Sales).then(HashSet::new),
        }
    }

    /// Check a fully materialized entity.
    pub fn check_all<'a, T, I>(&mut self, kind: EntityKind, records: I)
    where
        T: References + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut check = self.begin(kind);
        for record in records {
            check.observe(record);
        }
        check.finish();
    }

    pub fn issue_count(&self) -> usize {
        self.issue_count
    }

    pub fn issues(&self) -> &[IntegrityIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<IntegrityIssue> {
        self.issues
    }

    fn record(&mut self, issue: IntegrityIssue) {
        self.issue_count += 1;
        if self.issues.len() < MAX_RECORDED_ISSUES {
            warn!(
                entity = %issue.entity,
                id = ?issue.id,
                field = ?issue.field,
                message = %issue.message,
                "integrity issue"
            );
            self.issues.push(issue);
        }
    }
}

/// Streaming check of one entity.
#[derive(Debug)]
pub struct EntityCheck<'c> {
    checker: &'c mut IntegrityChecker,
    kind: EntityKind,
    next_id: i64,
    last_id: Option<i64>,
    sentinels: u32,
    observed: u64,
    /// Ids to publish as foreign-key targets; nothing references sales.
    ids: Option<HashSet<i64>>,
}

impl EntityCheck<'_> {
    pub fn observe<T: References>(&mut self, record: &T) {
        let id = record.id();
        self.check_id(id);

        for key in record.references() {
            if key.value == SENTINEL_ID {
                continue;
            }
            let resolved = self
                .checker
                .keys
                .get(&key.target)
                .is_some_and(|ids| ids.contains(&key.value));
            if !resolved {
                self.issue(
                    Some(id),
                    Some(key.field),
                    format!("{} {} does not exist", key.target, key.value),
                );
            }
        }

        if let Some(ids) = &mut self.ids {
            ids.insert(id);
        }
    }

    fn check_id(&mut self, id: i64) {
        let position = self.observed;
        self.observed += 1;

        if id == SENTINEL_ID {
            self.sentinels += 1;
            if self.sentinels > 1 {
                self.issue(Some(id), None, "duplicate sentinel record".to_string());
            } else if position > 0 {
                self.issue(
                    Some(id),
                    None,
                    format!("sentinel record must come first, found at position {position}"),
                );
            }
            return;
        }

        if self.kind.has_derived_ids() {
            if self.last_id.is_some_and(|last| id <= last) {
                self.issue(Some(id), None, "derived ids must strictly increase".to_string());
            }
        } else if id != self.next_id {
            self.issue(
                Some(id),
                None,
                format!("expected id {}, found {id}", self.next_id),
            );
        }
        self.next_id = id.saturating_add(1);
        self.last_id = Some(id);
    }

    pub fn finish(mut self) {
        if self.sentinels == 0 {
            self.issue(None, None, "missing sentinel record".to_string());
        }
        if let Some(ids) = self.ids.take() {
            self.checker.keys.entry(self.kind).or_default().extend(ids);
        }
    }

    fn issue(&mut self, id: Option<i64>, field: Option<&str>, message: String) {
        self.checker.record(IntegrityIssue {
            entity: self.kind,
            id,
            field: field.map(str::to_string),
            message,
        });
    }
}
