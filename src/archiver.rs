use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::RecordEntry;

/// Write the intermediate record set: one compact `{slug: record}` row per
/// line, in extraction order.
pub fn write_record_lines(path: &Path, entries: &[RecordEntry]) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(b"[\n")?;
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            file.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut file, entry)?;
    }
    file.write_all(b"\n]")?;
    file.flush()?;
    Ok(())
}

/// Write the final record set, pretty-printed.
pub fn write_pretty(path: &Path, entries: &[RecordEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

pub fn read_records(path: &Path) -> Result<Vec<RecordEntry>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
