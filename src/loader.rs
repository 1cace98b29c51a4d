//! Builds a [`UnifiedDataset`] from persisted snapshot files.
//!
//! Problems with a single file never abort the load: the file is skipped (or,
//! for row-level integrity problems, kept) and a [`LoadWarning`] is recorded.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::dataset::{SnapshotSummary, UnifiedDataset};
use crate::error::{IntegrityIssue, LoadWarning};
use crate::model::{FlightRecord, SnapshotRow};
use crate::parser::{date_from_snapshot_name, parse_timestamp};
use crate::store::has_snapshot_name;

/// A persisted snapshot as handed to the loader: its name and raw CSV bytes.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    pub name: String,
    pub contents: Vec<u8>,
}

impl SnapshotFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

struct Loaded {
    summary: SnapshotSummary,
    records: Vec<FlightRecord>,
    integrity: Vec<LoadWarning>,
}

/// Reads every snapshot CSV in `dir`.
///
/// Only failing to open the directory itself is an error. An entry that
/// cannot be listed or read becomes a [`LoadWarning::Unreadable`] and the
/// rest of the directory still loads.
#[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn load_dir(dir: impl AsRef<Path>) -> Result<UnifiedDataset> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    let mut unreadable = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                unreadable.push(LoadWarning::Unreadable {
                    file: dir.display().to_string(),
                    detail: format!("listing entry: {e}"),
                });
                continue;
            }
        };
        if !has_snapshot_name(&path) {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match fs::read(&path) {
            Ok(contents) => files.push(SnapshotFile { name, contents }),
            Err(e) => unreadable.push(LoadWarning::Unreadable {
                file: name,
                detail: e.to_string(),
            }),
        }
    }

    info!(files = files.len(), unreadable = unreadable.len(), "Snapshot files found");
    Ok(assemble(files, unreadable))
}

/// Loads snapshots from any source. The result does not depend on the order
/// the snapshots are given in.
pub fn load_snapshots(files: impl IntoIterator<Item = SnapshotFile>) -> UnifiedDataset {
    assemble(files, Vec::new())
}

fn assemble(
    files: impl IntoIterator<Item = SnapshotFile>,
    mut warnings: Vec<LoadWarning>,
) -> UnifiedDataset {
    let mut records = Vec::new();
    let mut summaries = Vec::new();
    for warning in &warnings {
        warn!(%warning, "Snapshot skipped");
    }

    for file in files {
        match load_one(&file) {
            Ok(loaded) => {
                debug!(file = %file.name, records = loaded.records.len(), "Snapshot loaded");
                for warning in &loaded.integrity {
                    warn!(%warning, "Data integrity");
                }
                summaries.push(loaded.summary);
                records.extend(loaded.records);
                warnings.extend(loaded.integrity);
            }
            Err(warning) => {
                warn!(%warning, "Snapshot skipped");
                warnings.push(warning);
            }
        }
    }

    let integrity = warnings.iter().filter(|w| !w.skipped_snapshot()).count();
    info!(
        snapshots = summaries.len(),
        records = records.len(),
        skipped = warnings.len() - integrity,
        integrity_warnings = integrity,
        "Dataset loaded"
    );

    UnifiedDataset::new(records, summaries, warnings)
}

fn load_one(file: &SnapshotFile) -> Result<Loaded, LoadWarning> {
    let collection_date: NaiveDate =
        date_from_snapshot_name(&file.name).ok_or_else(|| LoadWarning::InvalidDateFormat {
            file: file.name.clone(),
            detail: "file name does not start with an ISO date followed by 'T'".into(),
        })?;

    let unreadable = |e: csv::Error| LoadWarning::Unreadable {
        file: file.name.clone(),
        detail: e.to_string(),
    };

    let mut reader = ReaderBuilder::new().from_reader(file.contents.as_slice());
    let headers: StringRecord = reader.headers().map_err(unreadable)?.clone();

    let missing: Vec<String> = SnapshotRow::COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h.trim() == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadWarning::MissingColumns {
            file: file.name.clone(),
            missing,
        });
    }
    let headers: StringRecord = headers.iter().map(str::trim).collect();

    let mut records = Vec::new();
    let mut integrity = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row: SnapshotRow = result
            .and_then(|r| r.deserialize(Some(&headers)))
            .map_err(unreadable)?;
        // header is line 1
        let line = index + 2;

        let record = to_record(&row, collection_date).ok_or_else(|| {
            LoadWarning::InvalidDateFormat {
                file: file.name.clone(),
                detail: format!("unparsable timestamp on line {line}"),
            }
        })?;

        if record.validity_start > record.validity_end {
            integrity.push(LoadWarning::DataIntegrity {
                file: file.name.clone(),
                row: line,
                issue: IntegrityIssue::InvertedValidity,
            });
        }
        if record.has_blank_endpoint() {
            integrity.push(LoadWarning::DataIntegrity {
                file: file.name.clone(),
                row: line,
                issue: IntegrityIssue::BlankEndpoint,
            });
        }
        records.push(record);
    }

    Ok(Loaded {
        summary: SnapshotSummary {
            collection_date,
            name: file.name.clone(),
            records: records.len(),
        },
        records,
        integrity,
    })
}

fn to_record(row: &SnapshotRow, collection_date: NaiveDate) -> Option<FlightRecord> {
    Some(FlightRecord {
        collection_date,
        origin: row.departure_from.trim().to_string(),
        destination: row.departure_to.trim().to_string(),
        validity_start: parse_timestamp(&row.availability_start)?,
        validity_end: parse_timestamp(&row.availability_end)?,
        generated_at: parse_timestamp(&row.data_generated)?,
    })
}
