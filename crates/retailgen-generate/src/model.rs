use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use retailgen_core::EntityKind;

use crate::checks::IntegrityIssue;
use crate::errors::GenerationError;

pub const DEFAULT_SEED: u64 = 0x1337_C0DE;
pub const DEFAULT_DAYS: u32 = 7;
pub const DEFAULT_BRAND_COUNT: usize = 10_000;

/// Serialization format for entity output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
    Bson,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Bson => "bson",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = GenerationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "bson" => Ok(OutputFormat::Bson),
            other => Err(GenerationError::Config(format!("unknown format: {other}"))),
        }
    }
}

/// Half-open integer draw range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRange {
    pub min: i64,
    pub max: i64,
}

impl DrawRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<(), GenerationError> {
        if self.min >= self.max {
            return Err(GenerationError::Config(format!(
                "{name}: min ({}) must be below max ({})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Draw ranges used to size each franchise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FranchiseRanges {
    pub products: DrawRange,
    pub stores: DrawRange,
    pub employees_per_store: DrawRange,
    pub employee_jitter: DrawRange,
}

impl Default for FranchiseRanges {
    fn default() -> Self {
        Self {
            products: DrawRange::new(1_000, 50_000),
            stores: DrawRange::new(100, 5_000),
            employees_per_store: DrawRange::new(100, 500),
            employee_jitter: DrawRange::new(-500, 500),
        }
    }
}

/// Settings consumed by a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Master seed for the root random stream.
    pub seed: u64,
    /// Number of simulated days for the calendar and the sales simulation.
    pub days: u32,
    /// First simulated day.
    pub start_date: NaiveDate,
    pub format: OutputFormat,
    /// Keep per-entity spill files after the run.
    pub keep_intermediate: bool,
    /// Spill directory; a fresh temporary directory when unset.
    pub work_dir: Option<PathBuf>,
    pub brand_count: usize,
    /// Run integrity checks after generation and fail on violations.
    pub verify: bool,
    pub franchise: FranchiseRanges,
    /// Reference data root; the bundled assets when unset.
    pub assets_dir: Option<PathBuf>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            days: DEFAULT_DAYS,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            format: OutputFormat::Csv,
            keep_intermediate: false,
            work_dir: None,
            brand_count: DEFAULT_BRAND_COUNT,
            verify: true,
            franchise: FranchiseRanges::default(),
            assets_dir: None,
        }
    }
}

impl RunSettings {
    /// Load settings from a TOML file; missing keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self, GenerationError> {
        let contents = std::fs::read_to_string(path)?;
        let settings: RunSettings = toml::from_str(&contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply a single `key=value` override.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), GenerationError> {
        match key {
            "seed" => self.seed = parse_seed(value)?,
            "days" => self.days = parse_value(key, value)?,
            "start_date" => {
                self.start_date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    GenerationError::Config(format!("start_date: invalid date '{value}'"))
                })?
            }
            "format" => self.format = value.parse()?,
            "keep_intermediate" => self.keep_intermediate = parse_value(key, value)?,
            "deletetemp" => self.keep_intermediate = !parse_value::<bool>(key, value)?,
            "work_dir" => self.work_dir = Some(PathBuf::from(value)),
            "brand_count" => self.brand_count = parse_value(key, value)?,
            "verify" => self.verify = parse_value(key, value)?,
            "assets_dir" => self.assets_dir = Some(PathBuf::from(value)),
            _ => {
                return Err(GenerationError::Config(format!("unknown setting '{key}'")));
            }
        }
        Ok(())
    }

    /// Apply a `key=value` pair in the form accepted on the command line.
    pub fn apply_pair(&mut self, pair: &str) -> Result<(), GenerationError> {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            GenerationError::Config(format!("setting '{pair}' must be key=value"))
        })?;
        self.apply(key.trim(), value.trim())
    }

    pub fn validate(&self) -> Result<(), GenerationError> {
        self.franchise.products.validate("franchise.products")?;
        self.franchise.stores.validate("franchise.stores")?;
        self.franchise
            .employees_per_store
            .validate("franchise.employees_per_store")?;
        self.franchise
            .employee_jitter
            .validate("franchise.employee_jitter")?;
        if self.franchise.products.min < 1 || self.franchise.stores.min < 1 {
            return Err(GenerationError::Config(
                "franchise product and store counts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_seed(value: &str) -> Result<u64, GenerationError> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    };
    parsed.map_err(|_| GenerationError::Config(format!("seed: invalid value '{value}'")))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, GenerationError> {
    value
        .parse::<T>()
        .map_err(|_| GenerationError::Config(format!("{key}: invalid value '{value}'")))
}

/// Summary of one generated entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReport {
    pub entity: EntityKind,
    pub rows: u64,
    pub bytes_written: u64,
    /// Loaded from a matching spill file instead of regenerated.
    pub reused: bool,
    pub duration_ms: u64,
}

/// Counters from the sales simulation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesSummary {
    pub visits: u64,
    pub lost_customers: u64,
    pub lines: u64,
}

impl SalesSummary {
    pub fn absorb(&mut self, other: &SalesSummary) {
        self.visits += other.visits;
        self.lost_customers += other.lost_customers;
        self.lines += other.lines;
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub days: u32,
    pub format: OutputFormat,
    pub entities: Vec<EntityReport>,
    pub sales: SalesSummary,
    /// First recorded issues; `integrity_issue_count` holds the total.
    pub integrity_issues: Vec<IntegrityIssue>,
    pub integrity_issue_count: usize,
    pub bytes_written: u64,
    pub duration_ms: u64,
    /// Set when the run aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationReport {
    pub fn new(run_id: String, settings: &RunSettings) -> Self {
        Self {
            run_id,
            seed: settings.seed,
            days: settings.days,
            format: settings.format,
            entities: Vec::new(),
            sales: SalesSummary::default(),
            integrity_issues: Vec::new(),
            integrity_issue_count: 0,
            bytes_written: 0,
            duration_ms: 0,
            error: None,
        }
    }

    pub fn entity(&self, kind: EntityKind) -> Option<&EntityReport> {
        self.entities.iter().find(|report| report.entity == kind)
    }
}
