use std::collections::{HashMap, HashSet};

use retailgen_core::{Employee, EntityKind, IdSequence, Store};

use crate::assets::NameFrequency;
use crate::cache::Cache;
use crate::errors::GenerationError;
use crate::sampling::{Segments, Stream, WeightedRandom};
use crate::session::{Entity, GenerationSession, Slot, Slots};

pub const MALE: &str = "Male";
pub const FEMALE: &str = "Female";

/// Probability of drawing a male employee.
const MALE_SHARE: f64 = 0.489;
/// Probability of keeping a full name already used in the franchise.
const DUPLICATE_ALLOWANCE: f64 = 0.05;
/// Redraws allowed per employee before giving up.
pub const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Population-weighted name samplers.
#[derive(Debug)]
pub struct NameSampler {
    male: Segments<String>,
    female: Segments<String>,
    last: Segments<String>,
}

impl NameSampler {
    pub fn new(
        first_names: &[NameFrequency],
        last_names: &[NameFrequency],
    ) -> Result<Self, GenerationError> {
        let by_sex = |sex: &str| {
            Segments::build(
                first_names
                    .iter()
                    .filter(|row| row.sex.as_deref() == Some(sex))
                    .map(|row| (row.name.clone(), row.number)),
            )
        };
        let sampler = Self {
            male: by_sex(MALE)?,
            female: by_sex(FEMALE)?,
            last: Segments::build(last_names.iter().map(|row| (row.name.clone(), row.number)))?,
        };

        if sampler.male.is_empty() || sampler.female.is_empty() || sampler.last.is_empty() {
            return Err(GenerationError::Asset(
                "name tables need male, female and last names".to_string(),
            ));
        }
        Ok(sampler)
    }

    fn draw(&self, sex: &str, rng: &mut Stream) -> Result<(String, String), GenerationError> {
        let first = if sex == MALE { &self.male } else { &self.female };
        Ok((first.sample(rng)?.clone(), self.last.sample(rng)?.clone()))
    }
}

/// Staff every store with its headcount.
///
/// Full names repeat within a franchise only when a 5% flip allows it;
/// otherwise the name is redrawn, up to [`MAX_NAME_ATTEMPTS`] times.
pub fn generate_employees(
    stores: &Cache<Store>,
    names: &NameSampler,
    rng: &mut Stream,
) -> Result<Vec<Employee>, GenerationError> {
    let mut sexes = WeightedRandom::derive(rng, MALE_SHARE);
    let mut duplicates = WeightedRandom::derive(rng, DUPLICATE_ALLOWANCE);
    let mut seen: HashMap<i64, HashSet<(String, String)>> = HashMap::new();

    let mut ids = IdSequence::new();
    let mut records = vec![Employee::unknown()];

    for store in stores.real() {
        let franchise_names = seen.entry(store.franchise_id).or_default();
        for _ in 0..store.employees.unwrap_or(0) {
            let sex = if sexes.next_bool() { MALE } else { FEMALE };
            let (first_name, last_name) =
                unique_name(names, sex, franchise_names, &mut duplicates, rng)?;

            records.push(ids.assign(Employee {
                id: 0,
                store_id: store.id,
                first_name,
                last_name,
                sex: sex.to_string(),
            }));
        }
    }

    Ok(records)
}

fn unique_name(
    names: &NameSampler,
    sex: &str,
    seen: &mut HashSet<(String, String)>,
    duplicates: &mut WeightedRandom,
    rng: &mut Stream,
) -> Result<(String, String), GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let name = names.draw(sex, rng)?;
        if seen.insert(name.clone()) || duplicates.next_bool() {
            return Ok(name);
        }
    }

    Err(GenerationError::Exhausted {
        what: format!("distinct {sex} employee name"),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employees;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.employees
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let stores = session.get::<Store>()?;
        let reference = session.reference();
        let names = NameSampler::new(&reference.first_names, &reference.last_names)?;
        generate_employees(&stores, &names, rng)
    }
}
