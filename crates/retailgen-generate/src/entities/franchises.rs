use rand::Rng;

use retailgen_core::{EntityKind, Franchise, IdSequence};

use crate::assets::FranchiseTemplate;
use crate::errors::GenerationError;
use crate::model::{DrawRange, FranchiseRanges};
use crate::sampling::Stream;
use crate::session::{Entity, GenerationSession, Slot, Slots};

/// Build one franchise per template, sized from `ranges`.
pub fn generate_franchises(
    templates: &[FranchiseTemplate],
    ranges: &FranchiseRanges,
    rng: &mut impl Rng,
) -> Result<Vec<Franchise>, GenerationError> {
    if templates.is_empty() {
        return Err(GenerationError::Asset(
            "no franchise templates available".to_string(),
        ));
    }

    let mut ids = IdSequence::new();
    let mut records = Vec::with_capacity(templates.len() + 1);
    records.push(Franchise::unknown());

    for template in templates {
        let products = draw(rng, ranges.products);
        let stores = draw(rng, ranges.stores);
        let per_store = draw(rng, ranges.employees_per_store);
        let jitter = draw(rng, ranges.employee_jitter);
        let employees = (stores * 100).min(stores * per_store + jitter);

        records.push(ids.assign(Franchise {
            id: 0,
            name: template.name.clone(),
            international: Some(template.international.clone()),
            products: Some(products),
            stores: Some(stores),
            employees: Some(employees),
        }));
    }

    Ok(records)
}

fn draw(rng: &mut impl Rng, range: DrawRange) -> i64 {
    rng.random_range(range.min..range.max)
}

impl Entity for Franchise {
    const KIND: EntityKind = EntityKind::Franchises;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.franchises
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let reference = session.reference();
        generate_franchises(&reference.franchises, &session.settings().franchise, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::stream;

    fn templates() -> Vec<FranchiseTemplate> {
        ["US", "Japan", "World"]
            .iter()
            .enumerate()
            .map(|(index, flag)| FranchiseTemplate {
                name: format!("Franchise {index}"),
                international: flag.to_string(),
            })
            .collect()
    }

    #[test]
    fn counts_stay_within_ranges() {
        let ranges = FranchiseRanges::default();
        let records = generate_franchises(&templates(), &ranges, &mut stream(1)).expect("generate");

        assert_eq!(records.len(), 4);
        assert_eq!(records[0], Franchise::unknown());
        for franchise in &records[1..] {
            let products = franchise.products.unwrap_or_default();
            let stores = franchise.stores.unwrap_or_default();
            let employees = franchise.employees.unwrap_or_default();

            assert!((1_000..50_000).contains(&products));
            assert!((100..5_000).contains(&stores));
            assert!(employees <= stores * 100);
            assert!(employees >= stores * 100 - 500);
        }
    }

    #[test]
    fn empty_templates_fail() {
        let result = generate_franchises(&[], &FranchiseRanges::default(), &mut stream(1));
        assert!(matches!(result, Err(GenerationError::Asset(_))));
    }
}
