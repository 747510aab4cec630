use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use retailgen_core::{
    Brand, CalendarDate, Category, ENTITY_ORDER, Employee, EntityKind, Franchise, Product, Record,
    Sale, Sku, Store, TimeOfDay, ZipCode, validate_order,
};

use crate::assets::ReferenceData;
use crate::checks::{IntegrityChecker, References};
use crate::errors::GenerationError;
use crate::model::{EntityReport, GenerationReport, RunSettings, SalesSummary};
use crate::output::EntitySink;
use crate::sales::{SalesInputs, SalesSimulator};
use crate::session::{Entity, GenerationSession};
use crate::spill::{SpillStore, fingerprint};

pub const REPORT_FILE: &str = "generation_report.json";

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub out_dir: PathBuf,
    pub report: GenerationReport,
    /// Spill directory left in place when intermediate files are kept.
    pub intermediate_dir: Option<PathBuf>,
}

/// Entry point for generating the retail dataset.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    settings: RunSettings,
    reference: Option<ReferenceData>,
    run_id: Option<String>,
}

impl GenerationEngine {
    pub fn new(settings: RunSettings) -> Self {
        Self {
            settings,
            reference: None,
            run_id: None,
        }
    }

    /// Use `reference` instead of loading tables from the assets directory.
    pub fn with_reference(mut self, reference: ReferenceData) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Tag the run with `run_id` instead of a fresh uuid.
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Generate every entity in declared order into `out_dir`.
    pub fn run(&self, out_dir: &Path) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let run_id = self
            .run_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        self.settings.validate()?;
        validate_order(&ENTITY_ORDER)?;
        std::fs::create_dir_all(out_dir)?;

        let reference = match &self.reference {
            Some(reference) => reference.clone(),
            None => ReferenceData::from_dir(self.settings.assets_dir.as_deref())?,
        };
        let spill = SpillStore::open(
            self.settings.work_dir.as_deref(),
            self.settings.keep_intermediate,
            &fingerprint(&self.settings, &reference)?,
        )?;
        let mut session =
            GenerationSession::new(self.settings.clone(), reference).with_spill(spill);
        let mut report = GenerationReport::new(run_id.clone(), &self.settings);
        let mut checker = IntegrityChecker::new();

        info!(
            run_id = %run_id,
            seed = self.settings.seed,
            days = self.settings.days,
            format = %self.settings.format,
            out_dir = %out_dir.display(),
            "generation started"
        );

        let outcome = self.generate_all(&mut session, out_dir, &mut report, &mut checker);
        let cleanup = session.take_spill().map(SpillStore::finish).transpose();

        report.sales = session.sales_summary().clone();
        report.integrity_issue_count = checker.issue_count();
        report.integrity_issues = checker.into_issues();
        report.bytes_written = report.entities.iter().map(|e| e.bytes_written).sum();
        report.duration_ms = start.elapsed().as_millis() as u64;

        let outcome = outcome.and_then(|()| {
            if self.settings.verify && report.integrity_issue_count > 0 {
                return Err(GenerationError::Integrity(report.integrity_issue_count));
            }
            Ok(())
        });

        match outcome {
            Ok(()) => {
                let intermediate_dir = cleanup?.flatten();
                write_report(out_dir, &report)?;
                info!(
                    run_id = %run_id,
                    entities = report.entities.len(),
                    sales = report.sales.lines,
                    duration_ms = report.duration_ms,
                    bytes_written = report.bytes_written,
                    "generation completed"
                );
                Ok(GenerationResult {
                    out_dir: out_dir.to_path_buf(),
                    report,
                    intermediate_dir,
                })
            }
            Err(err) => {
                if let Err(cleanup_err) = cleanup {
                    warn!(error = %cleanup_err, "intermediate cleanup failed");
                }
                report.error = Some(err.to_string());
                write_report(out_dir, &report)?;
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
        }
    }

    fn generate_all(
        &self,
        session: &mut GenerationSession,
        out_dir: &Path,
        report: &mut GenerationReport,
        checker: &mut IntegrityChecker,
    ) -> Result<(), GenerationError> {
        for kind in ENTITY_ORDER {
            let started = Instant::now();
            info!(entity = %kind, "generating entity");

            let entry = match kind {
                EntityKind::Franchises => self.emit::<Franchise>(session, out_dir, checker)?,
                EntityKind::Categories => self.emit::<Category>(session, out_dir, checker)?,
                EntityKind::Brands => self.emit::<Brand>(session, out_dir, checker)?,
                EntityKind::Products => self.emit::<Product>(session, out_dir, checker)?,
                EntityKind::ZipCodes => self.emit::<ZipCode>(session, out_dir, checker)?,
                EntityKind::Stores => self.emit::<Store>(session, out_dir, checker)?,
                EntityKind::Skus => self.emit::<Sku>(session, out_dir, checker)?,
                EntityKind::Employees => self.emit::<Employee>(session, out_dir, checker)?,
                EntityKind::Sales => self.emit_sales(session, out_dir, checker)?,
                EntityKind::Dates => self.emit::<CalendarDate>(session, out_dir, checker)?,
                EntityKind::Times => self.emit::<TimeOfDay>(session, out_dir, checker)?,
            };
            let entry = EntityReport {
                duration_ms: started.elapsed().as_millis() as u64,
                ..entry
            };

            info!(
                entity = %kind,
                rows = entry.rows,
                bytes_written = entry.bytes_written,
                reused = entry.reused,
                duration_ms = entry.duration_ms,
                "entity generated"
            );
            report.entities.push(entry);
        }
        Ok(())
    }

    fn emit<T: Entity + References>(
        &self,
        session: &mut GenerationSession,
        out_dir: &Path,
        checker: &mut IntegrityChecker,
    ) -> Result<EntityReport, GenerationError> {
        let cache = session.get::<T>()?;

        let mut sink = EntitySink::create(out_dir, T::KIND, self.settings.format)?;
        sink.write_all(cache.iter())?;
        let summary = sink.finish()?;

        if self.settings.verify {
            checker.check_all(T::KIND, cache.iter());
        }

        Ok(EntityReport {
            entity: T::KIND,
            rows: summary.rows,
            bytes_written: summary.bytes_written,
            reused: session.was_reused(T::KIND),
            duration_ms: 0,
        })
    }

    /// Sales stream straight from the simulator (or a matching spill file)
    /// into the sink without being held in memory.
    fn emit_sales(
        &self,
        session: &mut GenerationSession,
        out_dir: &Path,
        checker: &mut IntegrityChecker,
    ) -> Result<EntityReport, GenerationError> {
        if self.settings.verify {
            let dates = session.get::<CalendarDate>()?;
            let times = session.get::<TimeOfDay>()?;
            checker.register_keys(EntityKind::Dates, dates.iter().map(Record::id));
            checker.register_keys(EntityKind::Times, times.iter().map(Record::id));
        }

        let mut sink = EntitySink::create(out_dir, EntityKind::Sales, self.settings.format)?;
        let mut check = self
            .settings
            .verify
            .then(|| checker.begin(EntityKind::Sales));
        let mut accept = |sale: &Sale| -> Result<(), GenerationError> {
            sink.write(sale)?;
            if let Some(check) = &mut check {
                check.observe(sale);
            }
            Ok(())
        };

        let reusable = session
            .spill()
            .is_some_and(|spill| spill.contains(EntityKind::Sales));
        let summary = if reusable {
            let rows = match session.spill() {
                Some(spill) => spill.replay(EntityKind::Sales, |sale: Sale| accept(&sale))?,
                None => 0,
            };
            session.mark_reused(EntityKind::Sales);
            SalesSummary {
                lines: rows.saturating_sub(1),
                ..SalesSummary::default()
            }
        } else {
            let inputs = SalesInputs::load(session)?;
            let mut spill_writer = match session.spill() {
                Some(spill) => Some(spill.writer(EntityKind::Sales)?),
                None => None,
            };
            let mut rng = session.stream(EntityKind::Sales);
            let summary = SalesSimulator::new(&inputs, &self.settings).run(&mut rng, |sale| {
                if let Some(writer) = &mut spill_writer {
                    writer.write(&sale)?;
                }
                accept(&sale)
            })?;
            if let Some(writer) = spill_writer {
                writer.commit()?;
            }
            summary
        };

        if let Some(check) = check {
            check.finish();
        }
        let written = sink.finish()?;
        session.record_sales(summary);

        Ok(EntityReport {
            entity: EntityKind::Sales,
            rows: written.rows,
            bytes_written: written.bytes_written,
            reused: session.was_reused(EntityKind::Sales),
            duration_ms: 0,
        })
    }
}

fn write_report(out_dir: &Path, report: &GenerationReport) -> Result<(), GenerationError> {
    std::fs::write(out_dir.join(REPORT_FILE), serde_json::to_vec_pretty(report)?)?;
    Ok(())
}
