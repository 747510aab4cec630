use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use retailgen_core::{Brand, EntityKind, Franchise, IdSequence};

use crate::errors::GenerationError;
use crate::sampling::Stream;
use crate::session::{Entity, GenerationSession, Slot, Slots};

/// Draws allowed per brand before giving up on finding an unused name.
pub const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// `count` brands with unique adjective+noun names.
pub fn generate_brands(
    adjectives: &[String],
    nouns: &[String],
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Brand>, GenerationError> {
    if count > 0 && (adjectives.is_empty() || nouns.is_empty()) {
        return Err(GenerationError::Asset(
            "brand word lists are empty".to_string(),
        ));
    }

    let mut seen = HashSet::with_capacity(count);
    let mut ids = IdSequence::new();
    let mut records = Vec::with_capacity(count + 1);
    records.push(Brand::unknown());

    for _ in 0..count {
        let name = unique_name(adjectives, nouns, &mut seen, rng)?;
        records.push(ids.assign(Brand { id: 0, name }));
    }

    Ok(records)
}

fn unique_name(
    adjectives: &[String],
    nouns: &[String],
    seen: &mut HashSet<String>,
    rng: &mut impl Rng,
) -> Result<String, GenerationError> {
    for _ in 0..MAX_NAME_ATTEMPTS {
        let (Some(adjective), Some(noun)) = (adjectives.choose(rng), nouns.choose(rng)) else {
            break;
        };
        let name = format!("{adjective}{noun}");
        if seen.insert(name.clone()) {
            return Ok(name);
        }
    }

    Err(GenerationError::Exhausted {
        what: format!("unique brand name after {} brands", seen.len()),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

impl Entity for Brand {
    const KIND: EntityKind = EntityKind::Brands;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.brands
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let franchises = session.get::<Franchise>()?;
        debug!(franchises = franchises.len(), "franchises ready for brands");

        let reference = session.reference();
        generate_brands(
            &reference.brand_adjectives,
            &reference.brand_nouns,
            session.settings().brand_count,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::stream;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn names_are_unique() {
        let adjectives = words(&["Swift", "Bright", "Bold", "Calm"]);
        let nouns = words(&["Oak", "River", "Peak"]);
        let records = generate_brands(&adjectives, &nouns, 12, &mut stream(3)).expect("generate");

        let names: HashSet<&str> = records[1..].iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(records[0], Brand::unknown());
    }

    #[test]
    fn exhausted_name_space_fails() {
        let adjectives = words(&["Swift", "Bright"]);
        let nouns = words(&["Oak"]);
        let result = generate_brands(&adjectives, &nouns, 3, &mut stream(3));

        assert!(matches!(
            result,
            Err(GenerationError::Exhausted {
                attempts: MAX_NAME_ATTEMPTS,
                ..
            })
        ));
    }
}
