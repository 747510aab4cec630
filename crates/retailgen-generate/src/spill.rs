//! Per-entity intermediate files addressed by entity name.
//!
//! Each materialized entity is written as JSON Lines to
//! `<dir>/<entity>.tmp`. A manifest pins a fingerprint of the settings and
//! reference data; files written under a different fingerprint are
//! discarded on open.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tracing::{debug, info};

use retailgen_core::{ENTITY_ORDER, EntityKind};

use crate::assets::ReferenceData;
use crate::errors::GenerationError;
use crate::model::RunSettings;

const MANIFEST: &str = "manifest.json";

#[derive(Debug, Serialize, Deserialize)]
struct SpillManifest {
    fingerprint: String,
}

/// Inputs that change generated records. Output format and spill handling
/// are left out; reference tables are hashed by content, not location.
#[derive(Serialize)]
struct FingerprintInput<'a> {
    version: &'static str,
    seed: u64,
    days: u32,
    start_date: String,
    brand_count: usize,
    franchise: &'a crate::model::FranchiseRanges,
    reference: &'a ReferenceData,
}

/// SHA-256 fingerprint of the record-shaping settings and reference tables.
pub fn fingerprint(
    settings: &RunSettings,
    reference: &ReferenceData,
) -> Result<String, GenerationError> {
    let input = FingerprintInput {
        version: env!("CARGO_PKG_VERSION"),
        seed: settings.seed,
        days: settings.days,
        start_date: settings.start_date.format("%Y-%m-%d").to_string(),
        brand_count: settings.brand_count,
        franchise: &settings.franchise,
        reference,
    };
    let bytes = serde_json::to_vec(&input)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[derive(Debug)]
pub struct SpillStore {
    dir: PathBuf,
    temp: Option<TempDir>,
    keep: bool,
}

impl SpillStore {
    /// Open `work_dir`, or a fresh temporary directory when none is given.
    pub fn open(
        work_dir: Option<&Path>,
        keep: bool,
        fingerprint: &str,
    ) -> Result<Self, GenerationError> {
        let (dir, temp) = match work_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                (dir.to_path_buf(), None)
            }
            None => {
                let temp = tempfile::Builder::new().prefix("retailgen-").tempdir()?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let store = Self { dir, temp, keep };
        let manifest_path = store.dir.join(MANIFEST);
        let current = fs::read(&manifest_path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<SpillManifest>(&bytes).ok());

        if current.as_ref().map(|m| m.fingerprint.as_str()) != Some(fingerprint) {
            if current.is_some() {
                info!(dir = %store.dir.display(), "discarding stale intermediate files");
            }
            store.remove_entity_files()?;
            let manifest = SpillManifest {
                fingerprint: fingerprint.to_string(),
            };
            write_atomic(&manifest_path, &serde_json::to_vec_pretty(&manifest)?)?;
        }

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.tmp", kind.name()))
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.path(kind).exists()
    }

    /// Records previously spilled for `kind`, if any.
    pub fn load<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
    ) -> Result<Option<Vec<T>>, GenerationError> {
        if !self.contains(kind) {
            return Ok(None);
        }
        let mut records = Vec::new();
        self.replay(kind, |record| {
            records.push(record);
            Ok(())
        })?;

        debug!(entity = %kind, rows = records.len(), "reloaded intermediate file");
        Ok(Some(records))
    }

    /// Stream spilled records of `kind` through `visit`, in file order.
    pub fn replay<T, F>(&self, kind: EntityKind, mut visit: F) -> Result<u64, GenerationError>
    where
        T: DeserializeOwned,
        F: FnMut(T) -> Result<(), GenerationError>,
    {
        let reader = BufReader::new(File::open(self.path(kind))?);
        let mut rows = 0;
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            visit(serde_json::from_str(&line)?)?;
            rows += 1;
        }
        Ok(rows)
    }

    pub fn save<T: Serialize>(
        &self,
        kind: EntityKind,
        records: &[T],
    ) -> Result<(), GenerationError> {
        let mut writer = self.writer(kind)?;
        for record in records {
            writer.write(record)?;
        }
        writer.commit()
    }

    /// Incremental writer; the file only becomes visible on `commit`.
    pub fn writer(&self, kind: EntityKind) -> Result<SpillWriter, GenerationError> {
        let path = self.path(kind);
        let partial = path.with_extension("tmp.partial");
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&partial)?;
        Ok(SpillWriter {
            writer: BufWriter::new(file),
            partial,
            path,
        })
    }

    /// Release the store. Files are deleted unless the store was opened
    /// with `keep`; the kept directory is returned.
    pub fn finish(self) -> Result<Option<PathBuf>, GenerationError> {
        if self.keep {
            let dir = match self.temp {
                Some(temp) => temp.keep(),
                None => self.dir,
            };
            return Ok(Some(dir));
        }

        match self.temp {
            Some(temp) => temp.close()?,
            None => {
                self.remove_entity_files()?;
                let manifest = self.dir.join(MANIFEST);
                if manifest.exists() {
                    fs::remove_file(manifest)?;
                }
            }
        }
        Ok(None)
    }

    fn remove_entity_files(&self) -> Result<(), GenerationError> {
        for kind in ENTITY_ORDER {
            let path = self.path(kind);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// JSON Lines writer for one entity's spill file.
#[derive(Debug)]
pub struct SpillWriter {
    writer: BufWriter<File>,
    partial: PathBuf,
    path: PathBuf,
}

impl SpillWriter {
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), GenerationError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), GenerationError> {
        let SpillWriter {
            writer,
            partial,
            path,
        } = self;
        drop(writer.into_inner().map_err(|err| err.into_error())?);
        fs::rename(&partial, &path)?;
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<(), GenerationError> {
    let tmp_path = path.with_extension("json.partial");
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
