#![allow(dead_code)]

use std::path::{Path, PathBuf};

use retailgen_generate::RunSettings;
use retailgen_generate::assets::{
    CategoryTemplate, FranchiseTemplate, NameFrequency, ReferenceData, ZipTemplate,
};
use retailgen_generate::model::{DrawRange, FranchiseRanges, OutputFormat};

fn words(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|index| format!("{prefix}{index}")).collect()
}

fn zip(code: &str, locale: Option<&str>, city: &str) -> ZipTemplate {
    ZipTemplate {
        zip_code: code.to_string(),
        locale_name: locale.map(str::to_string),
        city_name: Some(city.to_string()),
        region: None,
    }
}

fn name(name: &str, sex: Option<&str>, number: i64) -> NameFrequency {
    NameFrequency {
        name: name.to_string(),
        sex: sex.map(str::to_string),
        number,
    }
}

/// Small in-memory reference tables covering all three markets.
pub fn reference() -> ReferenceData {
    let franchises = [("Harbor", "US"), ("Sakura", "Japan"), ("Summit", "World")]
        .iter()
        .map(|(name, flag)| FranchiseTemplate {
            name: name.to_string(),
            international: flag.to_string(),
        })
        .collect();

    let categories = [
        ("Toys", "Games", "Puzzle"),
        ("Toys", "Games", "Board Game"),
        ("Toys", "Outdoor", "Kite"),
        ("Garden", "Tools", "Rake"),
        ("Garden", "Tools", "Trowel"),
        ("Grocery", "Snacks", "Crackers"),
    ]
    .iter()
    .map(|(name, kind, sub_type)| CategoryTemplate {
        name: name.to_string(),
        kind: kind.to_string(),
        sub_type: sub_type.to_string(),
    })
    .collect();

    ReferenceData {
        franchises,
        categories,
        brand_adjectives: words("Bright", 20),
        brand_nouns: words("Oak", 20),
        product_prefixes: vec!["Deluxe".to_string(), "Classic".to_string()],
        us_zipcodes: vec![
            zip("10001", None, "New York"),
            zip("60601", None, "Chicago"),
            zip("94103", None, "San Francisco"),
        ],
        jp_zipcodes: vec![
            zip("100-0001", Some("Chiyoda"), "Tokyo"),
            zip("530-0001", Some("Umeda"), "Osaka"),
        ],
        first_names: vec![
            name("James", Some("Male"), 50),
            name("Kenji", Some("Male"), 20),
            name("Mary", Some("Female"), 45),
            name("Yuki", Some("Female"), 25),
        ],
        last_names: vec![
            name("Smith", None, 60),
            name("Sato", None, 40),
            name("Garcia", None, 30),
        ],
    }
}

/// Settings sized so every franchise sees real store traffic in a couple
/// of simulated days.
pub fn settings() -> RunSettings {
    RunSettings {
        seed: 0xC0FFEE,
        days: 2,
        format: OutputFormat::Json,
        brand_count: 60,
        franchise: FranchiseRanges {
            products: DrawRange::new(3_000, 3_500),
            stores: DrawRange::new(2, 4),
            employees_per_store: DrawRange::new(60, 80),
            employee_jitter: DrawRange::new(-5, 5),
        },
        ..RunSettings::default()
    }
}

pub fn entity_file(dir: &Path, name: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{name}.{}", format.extension()))
}
