//! CSV export for emitted step samples.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::SecondsFormat;

use crate::shed::types::Sample;

/// Column header for CSV sample export.
const HEADER: &str = "class,program,timestamp,value";

/// Exports samples to a CSV file at the given path.
///
/// Writes a header row followed by one data row per sample, in the order
/// given. Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `samples` - Emitted step samples
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(samples: &[Sample], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(samples, buf)
}

/// Writes samples as CSV to any writer.
///
/// # Arguments
///
/// * `samples` - Emitted step samples
/// * `writer` - Destination implementing `Write`
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv<'a>(
    samples: impl IntoIterator<Item = &'a Sample>,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for s in samples {
        wtr.write_record(&[
            s.class.clone(),
            s.program.clone(),
            s.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            s.value.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
