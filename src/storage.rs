use crate::models::SeriesPoint;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save a series as CSV with a `date,value` header; dates are RFC 3339.
pub fn save_csv<P: AsRef<Path>>(points: &[SeriesPoint], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.serialize(("date", "value"))?;
    for p in points {
        wtr.serialize((p.date.to_rfc3339(), p.value))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a series as a pretty JSON array.
pub fn save_json<P: AsRef<Path>>(points: &[SeriesPoint], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(points)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save according to the path's extension (`csv` or `json`, default `csv`).
pub fn save_by_extension<P: AsRef<Path>>(points: &[SeriesPoint], path: P) -> Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" => save_csv(points, path),
        "json" => save_json(points, path),
        other => anyhow::bail!("unsupported format: {}", other),
    }
}
