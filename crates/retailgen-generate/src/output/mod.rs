//! Entity output files.
//!
//! One [`EntitySink`] per entity writes `<dir>/<entity>.<ext>` in emission
//! order. `finish` flushes and reports the byte count; a sink dropped
//! without `finish` still flushes through its buffered writer.

pub mod bson;
pub mod csv;
pub mod json;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use retailgen_core::EntityKind;

use crate::errors::GenerationError;
use crate::model::OutputFormat;

/// Output file path for `kind`.
pub fn entity_path(dir: &Path, kind: EntityKind, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", kind.name(), format.extension()))
}

/// Result of a closed sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSummary {
    pub path: PathBuf,
    pub rows: u64,
    pub bytes_written: u64,
}

type FileWriter = CountingWriter<BufWriter<File>>;

#[derive(Debug)]
enum Encoder {
    Csv(::csv::Writer<FileWriter>),
    Json(FileWriter),
    Bson(FileWriter),
}

/// Scoped writer for one entity's output file.
#[derive(Debug)]
pub struct EntitySink {
    entity: EntityKind,
    path: PathBuf,
    encoder: Encoder,
    rows: u64,
}

impl EntitySink {
    pub fn create(
        dir: &Path,
        entity: EntityKind,
        format: OutputFormat,
    ) -> Result<Self, GenerationError> {
        let path = entity_path(dir, entity, format);
        let writer = CountingWriter::new(BufWriter::new(File::create(&path)?));
        let encoder = match format {
            OutputFormat::Csv => Encoder::Csv(csv::encoder(writer)),
            OutputFormat::Json => Encoder::Json(writer),
            OutputFormat::Bson => Encoder::Bson(writer),
        };

        Ok(Self {
            entity,
            path,
            encoder,
            rows: 0,
        })
    }

    pub fn entity(&self) -> EntityKind {
        self.entity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), GenerationError> {
        match &mut self.encoder {
            Encoder::Csv(writer) => writer.serialize(record)?,
            Encoder::Json(writer) => json::write_line(writer, record)?,
            Encoder::Bson(writer) => bson::write_document(writer, record)?,
        }
        self.rows += 1;
        Ok(())
    }

    pub fn write_all<'a, T, I>(&mut self, records: I) -> Result<(), GenerationError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    /// Flush and close the file.
    pub fn finish(self) -> Result<SinkSummary, GenerationError> {
        let counting = match self.encoder {
            Encoder::Csv(writer) => writer.into_inner().map_err(|err| err.into_error())?,
            Encoder::Json(writer) | Encoder::Bson(writer) => writer,
        };
        let bytes_written = counting.finish()?;

        Ok(SinkSummary {
            path: self.path,
            rows: self.rows,
            bytes_written,
        })
    }
}

/// Counts bytes passed to the inner writer.
#[derive(Debug)]
pub(crate) struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn finish(mut self) -> std::io::Result<u64> {
        self.inner.flush()?;
        Ok(self.bytes)
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
