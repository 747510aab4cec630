use retailgen_core::{Category, EntityKind, IdSequence};

use crate::assets::CategoryTemplate;
use crate::errors::GenerationError;
use crate::sampling::Stream;
use crate::session::{Entity, GenerationSession, Slot, Slots};

/// One category per taxonomy row, in reference order.
pub fn generate_categories(
    templates: &[CategoryTemplate],
) -> Result<Vec<Category>, GenerationError> {
    if templates.is_empty() {
        return Err(GenerationError::Asset(
            "product taxonomy is empty".to_string(),
        ));
    }

    let mut ids = IdSequence::new();
    let mut records = Vec::with_capacity(templates.len() + 1);
    records.push(Category::unknown());
    records.extend(templates.iter().map(|template| {
        ids.assign(Category {
            id: 0,
            name: template.name.clone(),
            kind: template.kind.clone(),
            sub_type: template.sub_type.clone(),
        })
    }));

    Ok(records)
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Categories;

    fn slot(slots: &mut Slots) -> &mut Slot<Self> {
        &mut slots.categories
    }

    fn generate(
        session: &mut GenerationSession,
        _rng: &mut Stream,
    ) -> Result<Vec<Self>, GenerationError> {
        generate_categories(&session.reference().categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_keep_reference_order() {
        let templates = vec![
            CategoryTemplate {
                name: "Toys".to_string(),
                kind: "Games".to_string(),
                sub_type: "Board Game".to_string(),
            },
            CategoryTemplate {
                name: "Garden".to_string(),
                kind: "Tools".to_string(),
                sub_type: "Rake".to_string(),
            },
        ];
        let records = generate_categories(&templates).expect("generate");

        assert_eq!(records[0], Category::unknown());
        assert_eq!(records[1].id, 1);
        assert_eq!(records[2].sub_type, "Rake");
        assert_eq!(records.len(), 3);
    }
}
