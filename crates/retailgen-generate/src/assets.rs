//! Bundled reference tables: franchise templates, name lists, zip codes and
//! the product taxonomy.
//!
//! Resources are pipe-delimited text with a header row, except the plain
//! word lists which hold one value per line.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use crate::errors::GenerationError;

pub const FRANCHISES: &str = "retail/franchises.txt";
pub const PRODUCT_TYPES: &str = "retail/product_types.txt";
pub const BRAND_ADJECTIVES: &str = "retail/brand_adjectives.txt";
pub const BRAND_NOUNS: &str = "retail/brand_nouns.txt";
pub const PRODUCT_PREFIXES: &str = "retail/product_prefixes.txt";
pub const US_ZIPCODES: &str = "retail/us-zipcodes.txt";
pub const JP_ZIPCODES: &str = "retail/jp-zipcodes.txt";
pub const FIRST_NAMES: &str = "retail/firstnames.txt";
pub const LAST_NAMES: &str = "retail/lastnames.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FranchiseTemplate {
    pub name: String,
    pub international: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryTemplate {
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: String,
    pub sub_type: String,
}

/// One zip code row, normalized across both countries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipTemplate {
    pub zip_code: String,
    pub locale_name: Option<String>,
    pub city_name: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UsZipRow {
    zip_code: String,
    city_name: String,
    state: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JpZipRow {
    zip_code: String,
    locale_name: String,
    city_name: String,
    prefecture: String,
}

/// Census-style name frequency row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NameFrequency {
    pub name: String,
    #[serde(default)]
    pub sex: Option<String>,
    pub number: i64,
}

/// All reference tables a run needs, loaded once.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceData {
    pub franchises: Vec<FranchiseTemplate>,
    pub categories: Vec<CategoryTemplate>,
    pub brand_adjectives: Vec<String>,
    pub brand_nouns: Vec<String>,
    pub product_prefixes: Vec<String>,
    pub us_zipcodes: Vec<ZipTemplate>,
    pub jp_zipcodes: Vec<ZipTemplate>,
    pub first_names: Vec<NameFrequency>,
    pub last_names: Vec<NameFrequency>,
}

impl ReferenceData {
    /// Load every table through `loader`.
    pub fn load(loader: &AssetsLoader) -> Result<Self, GenerationError> {
        let us_zipcodes = loader
            .read_records::<UsZipRow>(US_ZIPCODES)?
            .into_iter()
            .map(|row| ZipTemplate {
                zip_code: row.zip_code,
                locale_name: None,
                city_name: Some(row.city_name),
                region: Some(row.state),
            })
            .collect();
        let jp_zipcodes = loader
            .read_records::<JpZipRow>(JP_ZIPCODES)?
            .into_iter()
            .map(|row| ZipTemplate {
                zip_code: row.zip_code,
                locale_name: Some(row.locale_name).filter(|name| !name.is_empty()),
                city_name: Some(row.city_name),
                region: Some(row.prefecture),
            })
            .collect();

        Ok(Self {
            franchises: loader.read_records(FRANCHISES)?,
            categories: loader.read_records(PRODUCT_TYPES)?,
            brand_adjectives: loader.read_words(BRAND_ADJECTIVES)?,
            brand_nouns: loader.read_words(BRAND_NOUNS)?,
            product_prefixes: loader.read_words(PRODUCT_PREFIXES)?,
            us_zipcodes,
            jp_zipcodes,
            first_names: loader.read_records(FIRST_NAMES)?,
            last_names: loader.read_records(LAST_NAMES)?,
        })
    }

    /// Load from the directory in `dir`, or the bundled assets.
    pub fn from_dir(dir: Option<&Path>) -> Result<Self, GenerationError> {
        match dir {
            Some(dir) => Self::load(&AssetsLoader::new(dir.to_path_buf())),
            None => Self::load(assets_loader()),
        }
    }
}

/// Reads reference resources relative to a root directory and keeps their
/// contents for repeated reads.
#[derive(Debug)]
pub struct AssetsLoader {
    root: PathBuf,
    cache: RwLock<BTreeMap<String, Arc<String>>>,
}

impl AssetsLoader {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse a pipe-delimited resource with a header row into typed records.
    pub fn read_records<T: DeserializeOwned>(
        &self,
        relative: &str,
    ) -> Result<Vec<T>, GenerationError> {
        let contents = self.contents(relative)?;
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'|')
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        reader
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()
            .map_err(|err| GenerationError::Asset(format!("invalid asset {relative}: {err}")))
    }

    /// One trimmed value per non-empty line.
    pub fn read_words(&self, relative: &str) -> Result<Vec<String>, GenerationError> {
        let contents = self.contents(relative)?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn contents(&self, relative: &str) -> Result<Arc<String>, GenerationError> {
        if let Some(contents) = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(relative).cloned())
        {
            return Ok(contents);
        }

        let path = self.root.join(relative);
        let contents = fs::read_to_string(&path).map_err(|err| {
            GenerationError::Asset(format!("failed to read asset {}: {}", path.display(), err))
        })?;
        let contents = Arc::new(contents);

        let mut cache = self
            .cache
            .write()
            .map_err(|_| GenerationError::Asset("asset cache poisoned".to_string()))?;
        cache.insert(relative.to_string(), Arc::clone(&contents));

        Ok(contents)
    }
}

/// Loader over the assets bundled with this crate.
pub fn assets_loader() -> &'static AssetsLoader {
    static LOADER: OnceLock<AssetsLoader> = OnceLock::new();
    LOADER.get_or_init(|| {
        let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets");
        AssetsLoader::new(root)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_assets_load() {
        let data = ReferenceData::from_dir(None).expect("load bundled assets");

        assert!(!data.franchises.is_empty());
        assert!(!data.categories.is_empty());
        assert!(data.brand_adjectives.len() * data.brand_nouns.len() > 10_000);
        assert!(!data.us_zipcodes.is_empty());
        assert!(!data.jp_zipcodes.is_empty());
        assert!(data.first_names.iter().any(|n| n.sex.as_deref() == Some("Male")));
        assert!(data.first_names.iter().any(|n| n.sex.as_deref() == Some("Female")));
        assert!(data.last_names.iter().all(|n| n.number > 0));
    }

    #[test]
    fn word_lists_are_trimmed_and_non_empty() {
        let loader = assets_loader();
        for list in [BRAND_ADJECTIVES, BRAND_NOUNS, PRODUCT_PREFIXES] {
            let words = loader.read_words(list).expect("read words");
            assert!(words.len() > 1);
            for word in words {
                assert_eq!(word.trim(), word);
                assert!(!word.is_empty());
            }
        }
    }

    #[test]
    fn missing_asset_is_an_error() {
        let loader = AssetsLoader::new(PathBuf::from("/nonexistent/retailgen"));
        assert!(matches!(
            loader.read_words("retail/nothing.txt"),
            Err(GenerationError::Asset(_))
        ));
    }
}
