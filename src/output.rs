use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::record::Record;

pub const JSON_FILE: &str = "all_html_data.json";
pub const CSV_FILE: &str = "all_html_data.csv";

/// Records as a pretty JSON array: four-space indent, non-ASCII kept as-is.
pub fn to_json(records: &[Record]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

pub fn write_json(path: &Path, records: &[Record]) -> Result<()> {
    let bytes = to_json(records)?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Flattened table, one row per record. Columns are the union of every record's
/// dotted paths, in first-seen order.
pub fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let rows: Vec<Vec<(String, String)>> = records.iter().map(Record::flatten).collect();

    let mut columns: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for (key, _) in rows.iter().flatten() {
        if seen.insert(key.as_str()) {
            columns.push(key.as_str());
        }
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut wtr = csv::Writer::from_writer(BufWriter::new(file));
    if !columns.is_empty() {
        wtr.write_record(&columns)?;
    }
    for row in &rows {
        let cells: HashMap<&str, &str> = row.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        wtr.write_record(columns.iter().map(|c| cells.get(c).copied().unwrap_or("")))?;
    }
    wtr.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Write the batch artifacts into `dir`, creating it if needed. Returns what was written.
pub fn write_artifacts(dir: &Path, records: &[Record], with_csv: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = Vec::new();
    let json = dir.join(JSON_FILE);
    write_json(&json, records)?;
    written.push(json);

    if with_csv {
        let csv = dir.join(CSV_FILE);
        write_csv(&csv, records)?;
        written.push(csv);
    }

    for path in &written {
        info!(path = %path.display(), records = records.len(), "wrote artifact");
    }
    Ok(written)
}

/// Print one record to stdout the same way the JSON artifact stores it.
pub fn print_record(record: &Record) -> Result<()> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut ser)?;
    let mut out = std::io::stdout().lock();
    out.write_all(&buf)?;
    writeln!(out)?;
    Ok(())
}

// ── Tests ──
