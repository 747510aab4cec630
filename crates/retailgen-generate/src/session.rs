//! Generation session: settings, reference data, seeded streams and the
//! per-entity materialization lifecycle.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use rand::RngCore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use retailgen_core::{
    Brand, CalendarDate, Category, ENTITY_ORDER, Employee, EntityKind, Franchise, Product, Record,
    Sale, Sku, Store, TimeOfDay, ZipCode,
};

use crate::assets::ReferenceData;
use crate::cache::Cache;
use crate::errors::GenerationError;
use crate::model::{RunSettings, SalesSummary};
use crate::sampling::{Stream, stream};
use crate::spill::SpillStore;

/// Lifecycle of one entity within a session.
#[derive(Debug)]
pub enum SlotState<T> {
    NotGenerated,
    Materializing,
    Materialized(Rc<Cache<T>>),
}

#[derive(Debug)]
pub struct Slot<T> {
    state: SlotState<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: SlotState::NotGenerated,
        }
    }
}

impl<T> Slot<T> {
    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }
}

/// One slot per entity.
#[derive(Debug, Default)]
pub struct Slots {
    pub franchises: Slot<Franchise>,
    pub categories: Slot<Category>,
    pub brands: Slot<Brand>,
    pub products: Slot<Product>,
    pub zipcodes: Slot<ZipCode>,
    pub stores: Slot<Store>,
    pub skus: Slot<Sku>,
    pub employees: Slot<Employee>,
    pub sales: Slot<Sale>,
    pub dates: Slot<CalendarDate>,
    pub times: Slot<TimeOfDay>,
}

/// An entity record type together with the generator that produces it.
pub trait Entity: Record + Clone + Serialize + DeserializeOwned + 'static {
    const KIND: EntityKind;

    fn slot(slots: &mut Slots) -> &mut Slot<Self>;

    /// Produce the full sequence, sentinel first. Upstream entities are
    /// read through `session`; `rng` is this entity's private stream.
    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError>;
}

/// Explicit context handed to every generator.
#[derive(Debug)]
pub struct GenerationSession {
    settings: RunSettings,
    reference: Rc<ReferenceData>,
    seeds: BTreeMap<EntityKind, u64>,
    slots: Slots,
    spill: Option<SpillStore>,
    reused: BTreeSet<EntityKind>,
    sales_summary: SalesSummary,
}

impl GenerationSession {
    /// Create a session; per-entity seeds are drawn from the root stream in
    /// declared entity order.
    pub fn new(settings: RunSettings, reference: ReferenceData) -> Self {
        let mut root = stream(settings.seed);
        let seeds = ENTITY_ORDER
            .iter()
            .map(|kind| (*kind, root.next_u64()))
            .collect();

        Self {
            settings,
            reference: Rc::new(reference),
            seeds,
            slots: Slots::default(),
            spill: None,
            reused: BTreeSet::new(),
            sales_summary: SalesSummary::default(),
        }
    }

    /// Spill every materialized entity into `spill` and reuse matching
    /// files already present there.
    pub fn with_spill(mut self, spill: SpillStore) -> Self {
        self.spill = Some(spill);
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub fn reference(&self) -> Rc<ReferenceData> {
        Rc::clone(&self.reference)
    }

    /// Seed of the private stream for `kind`.
    pub fn seed(&self, kind: EntityKind) -> u64 {
        self.seeds.get(&kind).copied().unwrap_or(self.settings.seed)
    }

    /// Fresh private stream for `kind`.
    pub fn stream(&self, kind: EntityKind) -> Stream {
        stream(self.seed(kind))
    }

    pub fn was_reused(&self, kind: EntityKind) -> bool {
        self.reused.contains(&kind)
    }

    pub(crate) fn mark_reused(&mut self, kind: EntityKind) {
        self.reused.insert(kind);
    }

    pub fn spill(&self) -> Option<&SpillStore> {
        self.spill.as_ref()
    }

    pub fn sales_summary(&self) -> &SalesSummary {
        &self.sales_summary
    }

    pub(crate) fn record_sales(&mut self, summary: SalesSummary) {
        self.sales_summary = summary;
    }

    /// Take the spill store out of the session for cleanup.
    pub fn take_spill(&mut self) -> Option<SpillStore> {
        self.spill.take()
    }

    /// Whether `T` has been fully materialized.
    pub fn is_materialized<T: Entity>(&mut self) -> bool {
        matches!(T::slot(&mut self.slots).state, SlotState::Materialized(_))
    }

    /// Return the materialized records of `T`, generating them first if
    /// needed.
    ///
    /// Requesting an entity that is itself mid-generation means the
    /// dependency graph has a cycle; that is reported as
    /// [`GenerationError::Dependency`].
    pub fn get<T: Entity>(&mut self) -> Result<Rc<Cache<T>>, GenerationError> {
        match &T::slot(&mut self.slots).state {
            SlotState::Materialized(cache) => return Ok(Rc::clone(cache)),
            SlotState::Materializing => {
                return Err(GenerationError::Dependency(format!(
                    "{} requested while it is being generated",
                    T::KIND
                )));
            }
            SlotState::NotGenerated => {}
        }

        let reloaded = match &self.spill {
            Some(spill) => spill.load::<T>(T::KIND)?,
            None => None,
        };

        let records = match reloaded {
            Some(records) => {
                self.reused.insert(T::KIND);
                records
            }
            None => {
                T::slot(&mut self.slots).state = SlotState::Materializing;
                let mut rng = self.stream(T::KIND);
                debug!(entity = %T::KIND, "materializing entity");

                let records = match T::generate(self, &mut rng) {
                    Ok(records) => records,
                    Err(err) => {
                        T::slot(&mut self.slots).state = SlotState::NotGenerated;
                        return Err(err);
                    }
                };
                if let Some(spill) = &self.spill {
                    spill.save(T::KIND, &records)?;
                }
                records
            }
        };

        let cache = Rc::new(Cache::new(T::KIND, records));
        T::slot(&mut self.slots).state = SlotState::Materialized(Rc::clone(&cache));
        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_follow_declared_order() {
        let session = GenerationSession::new(RunSettings::default(), ReferenceData::default());
        let mut root = stream(RunSettings::default().seed);

        for kind in ENTITY_ORDER {
            assert_eq!(session.seed(kind), root.next_u64());
        }
    }

    #[test]
    fn distinct_master_seeds_give_distinct_streams() {
        let settings = RunSettings {
            seed: 1,
            ..RunSettings::default()
        };
        let a = GenerationSession::new(settings.clone(), ReferenceData::default());
        let b = GenerationSession::new(
            RunSettings {
                seed: 2,
                ..settings
            },
            ReferenceData::default(),
        );
        assert_ne!(
            a.seed(EntityKind::Brands),
            b.seed(EntityKind::Brands)
        );
    }

    #[test]
    fn materializing_slot_reports_dependency_error() {
        let mut session = GenerationSession::new(RunSettings::default(), ReferenceData::default());
        session.slots.brands.state = SlotState::Materializing;

        let err = session.get::<Brand>().unwrap_err();
        assert!(matches!(err, GenerationError::Dependency(_)));
        assert!(!session.is_materialized::<Brand>());
    }

    #[test]
    fn failed_generation_resets_the_slot() {
        // Empty reference data cannot produce franchises.
        let mut session = GenerationSession::new(RunSettings::default(), ReferenceData::default());

        assert!(session.get::<Franchise>().is_err());
        assert!(matches!(
            session.slots.franchises.state(),
            SlotState::NotGenerated
        ));
    }
}
