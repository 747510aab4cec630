use rand::Rng;

use retailgen_core::{EntityKind, IdSequence, Product, Sku};

use crate::cache::Cache;
use crate::errors::GenerationError;
use crate::sampling::{Stream, WeightedRandom};
use crate::session::{Entity, GenerationSession, Slot, Slots};

pub const DEFAULT_VARIANT: &str = "Default";

/// Palette with the per-color inclusion probability.
pub const COLORS: [(&str, f64); 12] = [
    ("Red", 0.5),
    ("Green", 0.5),
    ("Blue", 0.5),
    ("Orange", 0.2),
    ("Purple", 0.2),
    ("Lavender", 0.1),
    ("Teal", 0.1),
    ("Silver", 0.4),
    ("Black", 0.4),
    ("Yellow", 0.1),
    ("Brown", 0.1),
    ("Gold", 0.1),
];

pub const SIZES: [&str; 4] = ["Small", "Medium", "Large", "Extra Large"];

/// One SKU per size and color combination of every product.
pub fn generate_skus(
    products: &Cache<Product>,
    rng: &mut impl Rng,
) -> Result<Vec<Sku>, GenerationError> {
    let mut palette = WeightedRandom::derive(rng, 0.5);
    let mut ids = IdSequence::new();
    let mut records = vec![Sku::unknown()];

    for product in products.real() {
        let sized = rng.random_bool(0.5);
        let colored = rng.random_bool(0.5);

        let colors = if colored {
            pick_colors(&mut palette)
        } else {
            vec![DEFAULT_VARIANT]
        };
        let sizes = if sized {
            let length = rng.random_range(2..SIZES.len());
            SIZES[..length].to_vec()
        } else {
            vec![DEFAULT_VARIANT]
        };

        for size in &sizes {
            for color in &colors {
                records.push(ids.assign(Sku {
                    id: 0,
                    product_id: product.id,
                    size: size.to_string(),
                    color: color.to_string(),
                }));
            }
        }
    }

    Ok(records)
}

/// Independent weighted flip per color; one weighted pick when none hit.
fn pick_colors(palette: &mut WeightedRandom) -> Vec<&'static str> {
    let mut picked: Vec<&'static str> = COLORS
        .iter()
        .filter(|(_, probability)| palette.next_bool_with(*probability))
        .map(|(color, _)| *color)
        .collect();
    if picked.is_empty() {
        picked.push(COLORS[palette.next_index(COLORS.len())].0);
    }
    picked
}

impl Entity for Sku {
    const KIND: EntityKind = EntityKind::Skus;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.skus
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let products = session.get::<Product>()?;
        generate_skus(&products, rng)
    }
}
