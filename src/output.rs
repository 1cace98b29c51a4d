//! Output formatting and persistence for computed statistics.
//!
//! Supports pretty-printing, JSON (logged or written to a file) and CSV.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use csv::WriterBuilder;

/// Logs a value using Rust's pretty debug format.
pub fn print_pretty<T: Debug>(value: &T) {
    info!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}

/// Writes a value as pretty JSON, replacing any existing file.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes rows as a CSV file with a header, replacing any existing file.
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;
    debug!(path = %path.display(), rows = rows.len(), "Writing CSV");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "CSV written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::DailyCount;
    use chrono::NaiveDate;
    use std::env;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn rows() -> Vec<DailyCount> {
        vec![
            DailyCount {
                collection_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                direction: "A -> B".into(),
                flight_count: 1,
            },
            DailyCount {
                collection_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                direction: "A -> B".into(),
                flight_count: 0,
            },
        ]
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&rows());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&rows()).unwrap();
    }

    #[test]
    fn test_write_csv_has_header_and_rows() {
        let path = temp_path("aycf_tracker_test_daily.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        write_csv(&path, &rows()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "collection_date,direction,flight_count");
        assert_eq!(lines[1], "2024-01-01,A -> B,1");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_csv_replaces_existing_file() {
        let path = temp_path("aycf_tracker_test_replace.csv");
        write_csv(&path, &rows()).unwrap();
        write_csv(&path, &rows()[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = temp_path("aycf_tracker_test_json");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("out.json");

        write_json(&path, &rows()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["flight_count"], 1);
        assert_eq!(value[1]["collection_date"], "2024-01-02");

        fs::remove_dir_all(&dir).unwrap();
    }
}
