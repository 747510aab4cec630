//! Fully materialized entity sequences with id lookup.

use std::cell::OnceCell;
use std::collections::{HashMap, HashSet};

use retailgen_core::{EntityKind, Record};

use crate::errors::GenerationError;

/// Id spans below this size are indexed with a direct offset table.
const DIRECT_INDEX_SPAN: i64 = 1024 * 1024;

#[derive(Debug)]
enum IdIndex {
    /// Slot `id - min` holds the record offset.
    Direct { min: i64, slots: Vec<Option<usize>> },
    /// Records are strictly increasing by id; binary search them.
    Sorted,
    Hashed(HashMap<i64, usize>),
}

/// A materialized sequence of records for one entity.
///
/// The id index is built on the first `find` call and reused afterwards.
#[derive(Debug)]
pub struct Cache<T> {
    entity: EntityKind,
    records: Vec<T>,
    index: OnceCell<IdIndex>,
}

impl<T: Record> Cache<T> {
    pub fn new(entity: EntityKind, records: Vec<T>) -> Self {
        Self {
            entity,
            records,
            index: OnceCell::new(),
        }
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at ordinal position `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Records other than the sentinel, in order.
    pub fn real(&self) -> impl Iterator<Item = &T> {
        self.records.iter().filter(|record| !record.is_sentinel())
    }

    /// Look up a record by id.
    pub fn find(&self, id: i64) -> Result<&T, GenerationError> {
        let not_found = || GenerationError::NotFound {
            entity: self.entity,
            id,
        };

        let offset = match self.index.get_or_init(|| build_index(&self.records)) {
            IdIndex::Direct { min, slots } => id
                .checked_sub(*min)
                .and_then(|slot| usize::try_from(slot).ok())
                .and_then(|slot| slots.get(slot).copied().flatten()),
            IdIndex::Sorted => self
                .records
                .binary_search_by_key(&id, |record| record.id())
                .ok(),
            IdIndex::Hashed(map) => map.get(&id).copied(),
        };

        offset
            .and_then(|offset| self.records.get(offset))
            .ok_or_else(not_found)
    }

    /// New cache holding the records that match `predicate`, order kept.
    pub fn filtered<F>(&self, mut predicate: F) -> Cache<T>
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        let records = self
            .records
            .iter()
            .filter(|record| predicate(record))
            .cloned()
            .collect();
        Cache::new(self.entity, records)
    }

    /// Distinct values of one field, in first-seen order.
    pub fn distinct<'a, F>(&'a self, mut field: F) -> Vec<String>
    where
        F: FnMut(&'a T) -> Option<&'a str>,
    {
        let mut seen = HashSet::new();
        let mut values = Vec::new();

        for record in &self.records {
            if let Some(value) = field(record)
                && seen.insert(value)
            {
                values.push(value.to_string());
            }
        }

        values
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

impl<'a, T> IntoIterator for &'a Cache<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn build_index<T: Record>(records: &[T]) -> IdIndex {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return IdIndex::Sorted;
    };

    let increasing = records
        .windows(2)
        .all(|pair| pair[0].id() < pair[1].id());

    if increasing {
        let min = first.id();
        let span = last.id() - min + 1;
        if span >= DIRECT_INDEX_SPAN {
            return IdIndex::Sorted;
        }
        let mut slots = vec![None; span as usize];
        for (offset, record) in records.iter().enumerate() {
            slots[(record.id() - min) as usize] = Some(offset);
        }
        return IdIndex::Direct { min, slots };
    }

    IdIndex::Hashed(
        records
            .iter()
            .enumerate()
            .map(|(offset, record)| (record.id(), offset))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use retailgen_core::{Brand, Category, IdSequence};

    fn brands(count: usize) -> Cache<Brand> {
        let mut ids = IdSequence::new();
        let mut records = vec![Brand::unknown()];
        for index in 0..count {
            records.push(ids.assign(Brand {
                id: 0,
                name: format!("Brand{index}"),
            }));
        }
        Cache::new(EntityKind::Brands, records)
    }

    #[test]
    fn find_returns_every_id() {
        let cache = brands(37);
        for id in 1..=37 {
            assert_eq!(cache.find(id).map(|brand| brand.id).ok(), Some(id));
        }
        assert_eq!(cache.find(-1).map(|brand| brand.name.as_str()).ok(), Some("Unknown"));
    }

    #[test]
    fn missing_ids_fail_explicitly() {
        let cache = brands(37);
        assert!(matches!(
            cache.find(0),
            Err(GenerationError::NotFound { id: 0, .. })
        ));
        assert!(cache.find(38).is_err());
        assert!(cache.find(i64::MIN).is_err());
    }

    #[test]
    fn wide_id_span_uses_binary_search() {
        let records = vec![
            Brand::unknown(),
            Brand {
                id: 5,
                name: "Low".to_string(),
            },
            Brand {
                id: DIRECT_INDEX_SPAN * 4,
                name: "High".to_string(),
            },
        ];
        let cache = Cache::new(EntityKind::Brands, records);

        assert_eq!(
            cache.find(DIRECT_INDEX_SPAN * 4).map(|b| b.name.as_str()).ok(),
            Some("High")
        );
        assert!(cache.find(6).is_err());
    }

    #[test]
    fn unordered_ids_still_resolve() {
        let records = vec![
            Brand {
                id: 3,
                name: "C".to_string(),
            },
            Brand {
                id: 1,
                name: "A".to_string(),
            },
        ];
        let cache = Cache::new(EntityKind::Brands, records);
        assert_eq!(cache.find(1).map(|b| b.name.as_str()).ok(), Some("A"));
        assert!(cache.find(2).is_err());
    }

    #[test]
    fn filtered_keeps_relative_order() {
        let cache = brands(10);
        let even = cache.filtered(|brand| brand.id > 0 && brand.id % 2 == 0);
        let ids: Vec<i64> = even.iter().map(|brand| brand.id).collect();

        assert_eq!(ids, vec![2, 4, 6, 8, 10]);
        assert_eq!(even.find(4).map(|b| b.id).ok(), Some(4));
    }

    #[test]
    fn distinct_preserves_first_seen_order() {
        let rows = [("Toys", "Games"), ("Garden", "Tools"), ("Toys", "Puzzles")];
        let mut ids = IdSequence::new();
        let mut records = vec![Category::unknown()];
        for (name, sub) in rows {
            records.push(ids.assign(Category {
                id: 0,
                name: name.to_string(),
                kind: name.to_string(),
                sub_type: sub.to_string(),
            }));
        }
        let cache = Cache::new(EntityKind::Categories, records);

        let names = cache.distinct(|category| {
            (!category.is_sentinel()).then_some(category.name.as_str())
        });
        assert_eq!(names, vec!["Toys".to_string(), "Garden".to_string()]);
    }
}
