use retailgen_core::{EntityKind, IdSequence, ZipCode};

use crate::assets::ZipTemplate;
use crate::errors::GenerationError;
use crate::sampling::Stream;
use crate::session::{Entity, GenerationSession, Slot, Slots};

pub const US: &str = "US";
pub const JAPAN: &str = "JP";

/// US rows followed by Japanese rows, each tagged with its country code.
pub fn generate_zipcodes(us: &[ZipTemplate], japan: &[ZipTemplate]) -> Vec<ZipCode> {
    let mut ids = IdSequence::new();
    let mut records = Vec::with_capacity(us.len() + japan.len() + 1);
    records.push(ZipCode::unknown());

    let rows = us
        .iter()
        .map(|row| (US, row))
        .chain(japan.iter().map(|row| (JAPAN, row)));
    for (country, row) in rows {
        records.push(ids.assign(ZipCode {
            id: 0,
            zip_code: row.zip_code.clone(),
            country_code: country.to_string(),
            locale_name: row.locale_name.clone(),
            city_name: row.city_name.clone(),
            region: row.region.clone(),
        }));
    }

    records
}

impl Entity for ZipCode {
    const KIND: EntityKind = EntityKind::ZipCodes;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.zipcodes
    }

    fn generate(
        session: &mut GenerationSession,
        _rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        let reference = session.reference();
        Ok(generate_zipcodes(
            &reference.us_zipcodes,
            &reference.jp_zipcodes,
        ))
    }
}
