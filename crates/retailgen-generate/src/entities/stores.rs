use rand::Rng;
use rand::seq::IndexedRandom;

use retailgen_core::{EntityKind, Franchise, IdSequence, Store, ZipCode};

use crate::cache::Cache;
use crate::entities::zipcodes::{JAPAN, US};
use crate::errors::GenerationError;
use crate::sampling::{Stream, WeightedRandom};
use crate::session::{Entity, GenerationSession, Slot, Slots};

/// Share of store draws routed to the US pool for "World" franchises.
pub const WORLD_US_SHARE: f64 = 0.9;
/// Share of franchise headcount working in stores.
const STORE_HEADCOUNT_SHARE: f64 = 0.9;

/// Where a franchise opens its stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    Us,
    Japan,
    World,
}

impl Market {
    pub fn parse(flag: Option<&str>) -> Result<Self, GenerationError> {
        match flag {
            Some("US") => Ok(Market::Us),
            Some("Japan") => Ok(Market::Japan),
            Some("World") => Ok(Market::World),
            other => Err(GenerationError::Config(format!(
                "unrecognized country code: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }
}

/// Open each franchise's stores on zip codes from its market.
pub fn generate_stores(
    franchises: &Cache<Franchise>,
    zipcodes: &Cache<ZipCode>,
    rng: &mut impl Rng,
) -> Result<Vec<Store>, GenerationError> {
    let us: Vec<&ZipCode> = zipcodes.real().filter(|zip| zip.country_code == US).collect();
    let japan: Vec<&ZipCode> = zipcodes
        .real()
        .filter(|zip| zip.country_code == JAPAN)
        .collect();

    let mut ids = IdSequence::new();
    let mut records = vec![Store::unknown()];

    for franchise in franchises.real() {
        let market = Market::parse(franchise.international.as_deref())?;
        let mut routing = WeightedRandom::derive(rng, WORLD_US_SHARE);
        let store_count = franchise.stores.unwrap_or(0);
        let per_store = match store_count {
            0 => 0.0,
            count => franchise.employees.unwrap_or(0) as f64 * STORE_HEADCOUNT_SHARE / count as f64,
        };

        for _ in 0..store_count {
            let pool = match market {
                Market::Us => &us,
                Market::Japan => &japan,
                Market::World if routing.next_bool() => &us,
                Market::World => &japan,
            };
            let zip = pool.choose(rng).ok_or_else(|| {
                GenerationError::Asset(format!(
                    "no zip codes available for franchise {}",
                    franchise.name
                ))
            })?;
            let employees = (per_store * rng.random_range(0.7..1.3)).floor() as i64;
            let number = format!("{:05}", ids.issued() + 1);
            let locale = zip
                .locale_name
                .as_deref()
                .or(zip.city_name.as_deref())
                .unwrap_or(zip.zip_code.as_str());

            records.push(ids.assign(Store {
                id: 0,
                name: format!("{locale} - Store #{number}"),
                store_number: Some(number),
                zip_code_id: zip.id,
                zip_code: Some(zip.zip_code.clone()),
                country_code: Some(zip.country_code.clone()),
                franchise_id: franchise.id,
                franchise_name: Some(franchise.name.clone()),
                employees: Some(employees),
            }));
        }
    }

    Ok(records)
}

impl Entity for Store {
    const KIND: EntityKind = EntityKind::Stores;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.stores
    }

    fn generate(
        session: &mut GenerationSession,
        rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let franchises = session.get::<Franchise>()?;
        let zipcodes = session.get::<ZipCode>()?;
        generate_stores(&franchises, &zipcodes, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::stream;

    fn franchise(flag: &str, stores: i64) -> Cache<Franchise> {
        let records = vec![
            Franchise::unknown(),
            Franchise {
                id: 1,
                name: "Corner Mart".to_string(),
                international: Some(flag.to_string()),
                products: Some(10),
                stores: Some(stores),
                employees: Some(stores * 20),
            },
        ];
        Cache::new(EntityKind::Franchises, records)
    }

    fn zipcodes() -> Cache<ZipCode> {
        let rows = [
            ("10001", US, None, "New York"),
            ("94103", US, None, "San Francisco"),
            ("100-0001", JAPAN, Some("Marunouchi"), "Chiyoda"),
        ];
        let mut ids = IdSequence::new();
        let mut records = vec![ZipCode::unknown()];
        for (zip, country, locale, city) in rows {
            records.push(ids.assign(ZipCode {
                id: 0,
                zip_code: zip.to_string(),
                country_code: country.to_string(),
                locale_name: locale.map(str::to_string),
                city_name: Some(city.to_string()),
                region: None,
            }));
        }
        Cache::new(EntityKind::ZipCodes, records)
    }

    #[test]
    fn store_fields_follow_zip_and_franchise() {
        let records = generate_stores(&franchise("Japan", 3), &zipcodes(), &mut stream(2))
            .expect("generate");

        assert_eq!(records.len(), 4);
        let store = &records[2];
        assert_eq!(store.store_number.as_deref(), Some("00002"));
        assert_eq!(store.name, "Marunouchi - Store #00002");
        assert_eq!(store.zip_code_id, 3);
        assert_eq!(store.franchise_name.as_deref(), Some("Corner Mart"));
        let employees = store.employees.unwrap_or_default();
        assert!((12..24).contains(&employees), "employees {employees}");
    }

    #[test]
    fn unknown_market_is_a_config_error() {
        let result = generate_stores(&franchise("Mars", 1), &zipcodes(), &mut stream(2));
        assert!(matches!(result, Err(GenerationError::Config(_))));
    }
}
