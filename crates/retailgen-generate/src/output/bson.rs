use std::io::Write;

use serde::Serialize;

use crate::errors::GenerationError;

/// Append `record` as one BSON document. Documents are length-prefixed,
/// so a file is the plain concatenation of its records.
pub(crate) fn write_document<W: Write, T: Serialize>(
    writer: &mut W,
    record: &T,
) -> Result<(), GenerationError> {
    let bytes = bson::to_vec(record)?;
    writer.write_all(&bytes)?;
    Ok(())
}
