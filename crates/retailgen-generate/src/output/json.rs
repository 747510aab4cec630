use std::io::Write;

use serde::Serialize;

use crate::errors::GenerationError;

/// Append `record` as one JSON Lines entry.
pub(crate) fn write_line<W: Write, T: Serialize>(
    writer: &mut W,
    record: &T,
) -> Result<(), GenerationError> {
    serde_json::to_writer(&mut *writer, record)?;
    writer.write_all(b"\n")?;
    Ok(())
}
