use std::collections::HashMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use retailgen_core::{Brand, Category, EntityKind, Franchise, IdSequence, Product, Record};

use crate::cache::Cache;
use crate::errors::GenerationError;
use crate::sampling::Stream;
use crate::session::{Entity, GenerationSession, Slot, Slots};

const MIN_PRICE_CENTS: i64 = 100;
const MAX_PRICE_CENTS: i64 = 25_000;

/// Build the product catalogue.
///
/// The total equals the sum of the real franchises' product targets.
/// Brands are walked round-robin; each brand gets a random non-empty set
/// of category names and a random number of products per category.
pub fn generate_products(
    franchises: &Cache<Franchise>,
    categories: &Cache<Category>,
    brands: &Cache<Brand>,
    prefixes: &[String],
    rng: &mut impl Rng,
) -> Result<Vec<Product>, GenerationError> {
    let total: i64 = franchises
        .real()
        .map(|franchise| franchise.products.unwrap_or(0))
        .sum();
    let total = usize::try_from(total).unwrap_or(0);

    let mut ids = IdSequence::new();
    let mut records = Vec::with_capacity(total + 1);
    records.push(Product::unknown());
    if total == 0 {
        return Ok(records);
    }

    let names = categories.distinct(|category| {
        (!category.is_sentinel()).then_some(category.name.as_str())
    });
    let mut types: HashMap<&str, Vec<&Category>> = HashMap::new();
    for category in categories.real() {
        types.entry(category.name.as_str()).or_default().push(category);
    }
    let brand_list: Vec<&Brand> = brands.real().collect();
    if names.is_empty() || brand_list.is_empty() {
        return Err(GenerationError::Dependency(
            "products need at least one brand and one category".to_string(),
        ));
    }

    'catalogue: loop {
        for brand in &brand_list {
            for name in pick_category_names(&names, rng) {
                let Some(rows) = types.get(name.as_str()) else {
                    continue;
                };
                let count = rng.random_range(1..rows.len().max(2));
                for _ in 0..count {
                    if records.len() > total {
                        break 'catalogue;
                    }
                    let Some(category) = rows.choose(rng) else {
                        continue;
                    };
                    let name = product_name(brand, category, prefixes, rng);
                    let cents = rng.random_range(MIN_PRICE_CENTS..=MAX_PRICE_CENTS);

                    records.push(ids.assign(Product {
                        id: 0,
                        name,
                        brand_id: brand.id,
                        category_id: category.id,
                        price: Some(cents as f64 / 100.0),
                    }));
                }
            }
        }
    }

    Ok(records)
}

/// Non-empty random subset of `names`, order kept.
fn pick_category_names<'a>(names: &'a [String], rng: &mut impl Rng) -> Vec<&'a String> {
    let mut picked: Vec<&String> = names.iter().filter(|_| rng.random_bool(0.5)).collect();
    if picked.is_empty()
        && let Some(name) = names.choose(rng)
    {
        picked.push(name);
    }
    picked
}

fn product_name(
    brand: &Brand,
    category: &Category,
    prefixes: &[String],
    rng: &mut impl Rng,
) -> String {
    if rng.random_bool(0.5) {
        return format!("{} {}", brand.name, category.sub_type);
    }
    if rng.random_bool(0.5)
        && let Some(prefix) = prefixes.choose(rng)
    {
        return format!("{prefix} {}", category.sub_type);
    }
    category.sub_type.clone()
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Products;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.products
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let franchises = session.get::<Franchise>()?;
        let categories = session.get::<Category>()?;
        let brands = session.get::<Brand>()?;
        let reference = session.reference();

        generate_products(
            &franchises,
            &categories,
            &brands,
            &reference.product_prefixes,
            rng,
        )
    }
}
