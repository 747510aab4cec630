use rand::Rng;

use retailgen_core::{Product, Sku};

use crate::cache::Cache;
use crate::errors::GenerationError;

/// Per-visit spending goal in cents, `[$12, $500)`.
const GOAL_CENTS: std::ops::Range<i64> = 1_200..50_000;

/// One line of a customer's basket.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketLine {
    pub brand_id: i64,
    pub product_id: i64,
    pub sku_id: i64,
    pub quantity: i64,
    pub unit_cents: i64,
}

impl BasketLine {
    pub fn total_cents(&self) -> i64 {
        self.unit_cents * self.quantity
    }
}

/// Quantity for a line priced at `unit_cents`: cheap items sell in bulk,
/// expensive ones mostly alone.
pub fn quantity(unit_cents: i64, rng: &mut impl Rng) -> i64 {
    let probability: f64 = rng.random();
    if unit_cents < 500 {
        rng.random_range(1..10)
    } else if unit_cents < 3_000 && probability > 0.8 {
        rng.random_range(2..5)
    } else if probability > 0.98 {
        rng.random_range(2..5)
    } else {
        1
    }
}

/// Fill one basket from `pool` until its spending goal is reached.
/// An empty pool yields an empty basket.
pub fn build_basket(
    pool: &[&Sku],
    products: &Cache<Product>,
    rng: &mut impl Rng,
) -> Result<Vec<BasketLine>, GenerationError> {
    let mut lines = Vec::new();
    if pool.is_empty() {
        return Ok(lines);
    }

    let goal = rng.random_range(GOAL_CENTS);
    let mut total = 0;
    while total < goal {
        let sku = pool[rng.random_range(0..pool.len())];
        let product = products.find(sku.product_id)?;
        let unit_cents = product.price_cents();
        if unit_cents <= 0 {
            return Err(GenerationError::Asset(format!(
                "product {} has no price",
                product.id
            )));
        }

        let line = BasketLine {
            brand_id: product.brand_id,
            product_id: product.id,
            sku_id: sku.id,
            quantity: quantity(unit_cents, rng),
            unit_cents,
        };
        total += line.total_cents();
        lines.push(line);
    }

    Ok(lines)
}
