use std::io::Write;

/// CSV writer with a header row taken from the first record's field names.
pub(crate) fn encoder<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer)
}
