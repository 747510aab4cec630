//! Sales and scheduling simulation.
//!
//! Per franchise a product selection is drawn; per store an hourly traffic
//! curve and checkout staff are derived, then every simulated minute's
//! arrivals are matched to a clerk and served a basket. Each basket line is
//! one [`Sale`].

pub mod basket;
pub mod checkout;
pub mod staffing;
pub mod traffic;

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use tracing::info;

use retailgen_core::{
    Employee, EntityKind, Franchise, IdSequence, Product, Record, Sale, Sku, Store,
};

use crate::cache::Cache;
use crate::entities::{date_id, time_id};
use crate::errors::GenerationError;
use crate::model::{RunSettings, SalesSummary};
use crate::sampling::{Stream, WeightedRandom};
use crate::session::{Entity, GenerationSession, Slot, Slots};

use self::basket::build_basket;
use self::checkout::CheckoutQueue;
use self::staffing::{LeaveCalendar, derive_clerks};
use self::traffic::{HOURS_PER_DAY, arrivals_per_minute, hourly_traffic};

/// Probability that a franchise carries any given product.
const SELECTION_RATE: f64 = 0.25;
const RECEIPT_PREFIXES: std::ops::Range<u32> = 1_000..10_000;
const FIRST_RECEIPT: u64 = 1_000_000;

/// Upstream caches the simulation reads.
#[derive(Debug, Clone)]
pub struct SalesInputs {
    pub franchises: Rc<Cache<Franchise>>,
    pub stores: Rc<Cache<Store>>,
    pub employees: Rc<Cache<Employee>>,
    pub products: Rc<Cache<Product>>,
    pub skus: Rc<Cache<Sku>>,
}

impl SalesInputs {
    pub fn load(session: &mut GenerationSession) -> Result<Self, GenerationError> {
        Ok(Self {
            franchises: session.get::<Franchise>()?,
            stores: session.get::<Store>()?,
            employees: session.get::<Employee>()?,
            products: session.get::<Product>()?,
            skus: session.get::<Sku>()?,
        })
    }
}

/// Products a franchise carries: a 25% inclusion draw per product, capped
/// at the franchise's product target.
pub fn select_products(
    products: &Cache<Product>,
    franchise: &Franchise,
    rng: &mut impl Rng,
) -> HashSet<i64> {
    let mut inclusion = WeightedRandom::derive(rng, SELECTION_RATE);
    let target = usize::try_from(franchise.products.unwrap_or(0)).unwrap_or(0);
    let mut selected = HashSet::new();

    for product in products.real() {
        if selected.len() >= target {
            break;
        }
        if inclusion.next_bool() {
            selected.insert(product.id);
        }
    }

    selected
}

/// Drives the simulation over a fixed window of days.
#[derive(Debug)]
pub struct SalesSimulator<'a> {
    inputs: &'a SalesInputs,
    start_date: NaiveDate,
    days: u32,
}

impl<'a> SalesSimulator<'a> {
    pub fn new(inputs: &'a SalesInputs, settings: &RunSettings) -> Self {
        Self {
            inputs,
            start_date: settings.start_date,
            days: settings.days,
        }
    }

    /// Run the simulation, handing every sale to `emit` in order, sentinel
    /// first.
    pub fn run<F>(&self, rng: &mut Stream, mut emit: F) -> Result<SalesSummary, GenerationError>
    where
        F: FnMut(Sale) -> Result<(), GenerationError>,
    {
        emit(Sale::unknown())?;

        let mut staff_by_store: HashMap<i64, Vec<&Employee>> = HashMap::new();
        for employee in self.inputs.employees.real() {
            staff_by_store
                .entry(employee.store_id)
                .or_default()
                .push(employee);
        }

        let mut ids = IdSequence::new();
        let mut summary = SalesSummary::default();

        for franchise in self.inputs.franchises.real() {
            let selection = select_products(&self.inputs.products, franchise, rng);
            let pool: Vec<&Sku> = self
                .inputs
                .skus
                .real()
                .filter(|sku| selection.contains(&sku.product_id))
                .collect();

            let mut franchise_summary = SalesSummary::default();
            let mut store_count = 0;
            for store in self
                .inputs
                .stores
                .real()
                .filter(|store| store.franchise_id == franchise.id)
            {
                let staff = staff_by_store
                    .get(&store.id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let mut visit = StoreVisits {
                    store,
                    pool: &pool,
                    products: &self.inputs.products,
                    ids: &mut ids,
                    summary: &mut franchise_summary,
                };
                visit.simulate(self, staff, selection.len(), rng, &mut emit)?;
                store_count += 1;
            }

            info!(
                franchise = %franchise.name,
                products = selection.len(),
                skus = pool.len(),
                stores = store_count,
                visits = franchise_summary.visits,
                lost_customers = franchise_summary.lost_customers,
                lines = franchise_summary.lines,
                "franchise sales simulated"
            );
            summary.absorb(&franchise_summary);
        }

        Ok(summary)
    }
}

struct StoreVisits<'s> {
    store: &'s Store,
    pool: &'s [&'s Sku],
    products: &'s Cache<Product>,
    ids: &'s mut IdSequence,
    summary: &'s mut SalesSummary,
}

impl StoreVisits<'_> {
    fn simulate<F>(
        &mut self,
        simulator: &SalesSimulator<'_>,
        staff: &[&Employee],
        product_count: usize,
        rng: &mut Stream,
        emit: &mut F,
    ) -> Result<(), GenerationError>
    where
        F: FnMut(Sale) -> Result<(), GenerationError>,
    {
        let traffic = hourly_traffic(product_count, rng);
        let prefix = rng.random_range(RECEIPT_PREFIXES);
        let clerks = derive_clerks(staff.iter().copied(), rng);
        let mut leave = LeaveCalendar::new(rng);
        let mut receipt = FIRST_RECEIPT;

        for day in 0..simulator.days {
            let date = simulator.start_date + Duration::days(i64::from(day));
            let date_key = date_id(date);
            let mut queue =
                CheckoutQueue::new(leave.roster(&clerks, date.weekday().num_days_from_sunday()));

            for hour in 0..HOURS_PER_DAY {
                let arrivals = arrivals_per_minute(&traffic, hour);
                if arrivals == 0 {
                    continue;
                }
                for minute in 0..60 {
                    let minute_of_day = hour as u32 * 60 + minute;
                    for _ in 0..arrivals {
                        let Some(employee_id) = queue.assign(minute_of_day) else {
                            self.summary.lost_customers += 1;
                            continue;
                        };
                        self.summary.visits += 1;

                        let visit = Visit {
                            date_id: date_key,
                            time_id: time_id(minute_of_day),
                            receipt: format!("{prefix}{receipt}"),
                            employee_id,
                        };
                        receipt += 1;
                        self.checkout(&visit, rng, emit)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn checkout<F>(
        &mut self,
        visit: &Visit,
        rng: &mut Stream,
        emit: &mut F,
    ) -> Result<(), GenerationError>
    where
        F: FnMut(Sale) -> Result<(), GenerationError>,
    {
        for line in build_basket(self.pool, self.products, rng)? {
            let sale = self.ids.assign(Sale {
                id: 0,
                franchise_id: self.store.franchise_id,
                store_id: self.store.id(),
                brand_id: line.brand_id,
                product_id: line.product_id,
                sku_id: line.sku_id,
                date_id: visit.date_id,
                time_id: visit.time_id,
                receipt: Some(visit.receipt.clone()),
                checkout_employee_id: visit.employee_id,
                quantity: Some(line.quantity),
                unit_price: Some(cents_to_price(line.unit_cents)),
                discount_price: Some(cents_to_price(line.unit_cents)),
                total_price: Some(cents_to_price(line.total_cents())),
            });
            self.summary.lines += 1;
            emit(sale)?;
        }
        Ok(())
    }
}

struct Visit {
    date_id: i64,
    time_id: i64,
    receipt: String,
    employee_id: i64,
}

fn cents_to_price(cents: i64) -> f64 {
    cents as f64 / 100.0
}

impl Entity for Sale {
    const KIND: EntityKind = EntityKind::Sales;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.sales
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let inputs = SalesInputs::load(session)?;
        let mut sales = Vec::new();
        let summary = SalesSimulator::new(&inputs, session.settings()).run(rng, |sale| {
            sales.push(sale);
            Ok(())
        })?;
        session.record_sales(summary);
        Ok(sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::stream;

    #[test]
    fn selection_respects_the_franchise_cap() {
        let mut ids = IdSequence::new();
        let mut records = vec![Product::unknown()];
        for _ in 0..1_000 {
            records.push(ids.assign(Product {
                price: Some(1.0),
                ..Product::unknown()
            }));
        }
        let products = Cache::new(EntityKind::Products, records);

        let capped = Franchise {
            products: Some(40),
            ..Franchise::unknown()
        };
        assert_eq!(select_products(&products, &capped, &mut stream(1)).len(), 40);

        let open = Franchise {
            products: Some(10_000),
            ..Franchise::unknown()
        };
        let selected = select_products(&products, &open, &mut stream(1));
        assert!((200..300).contains(&selected.len()), "selected {}", selected.len());
        assert!(!selected.contains(&-1));
    }
}
