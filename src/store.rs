//! Flat-file snapshot persistence.
//!
//! One CSV per snapshot, named after its generation timestamp. Downloaded
//! documents are kept next to it under the same name once they parse.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::dataset::UnifiedDataset;
use crate::loader::load_dir;
use crate::model::{Snapshot, SnapshotRow};
use crate::parser::format_timestamp;

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, snapshot: &Snapshot) -> PathBuf {
        self.dir.join(format!("{}.csv", snapshot.file_stem()))
    }

    /// Writes a snapshot as CSV.
    ///
    /// The file is written under a temporary name and renamed into place, so an
    /// interrupted write never leaves a half-written snapshot behind. Writing
    /// the same snapshot twice replaces the earlier copy.
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display(), routes = snapshot.routes.len()))]
    pub fn write(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating snapshot directory {}", self.dir.display()))?;

        let path = self.snapshot_path(snapshot);
        let tmp = self.dir.join(format!(".{}.csv.tmp", snapshot.file_stem()));

        {
            let mut writer = WriterBuilder::new()
                .has_headers(false) // header written explicitly so empty snapshots keep it
                .from_path(&tmp)
                .with_context(|| format!("opening {}", tmp.display()))?;

            writer.write_record(SnapshotRow::COLUMNS)?;
            for row in snapshot.rows() {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }

        fs::rename(&tmp, &path)
            .with_context(|| format!("moving snapshot into place at {}", path.display()))?;

        info!(path = %path.display(), "Snapshot written");
        Ok(path)
    }

    /// Snapshot files currently in the store, sorted by name.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if is_snapshot_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        debug!(count = paths.len(), "Snapshots listed");
        Ok(paths)
    }

    /// Loads every stored snapshot into a fresh dataset.
    pub fn load(&self) -> Result<UnifiedDataset> {
        load_dir(&self.dir)
    }
}

/// `*.csv` files that are not hidden temporaries.
pub(crate) fn is_snapshot_file(path: &Path) -> bool {
    has_snapshot_name(path) && path.is_file()
}

/// A visible `.csv` name, whatever the entry turns out to be on disk.
pub(crate) fn has_snapshot_name(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| !n.starts_with('.'));
    visible && path.extension().and_then(|e| e.to_str()) == Some("csv")
}

/// Where a freshly downloaded, not yet extracted document is kept.
pub fn unparsed_document_path(dir: &Path, fetched_at: NaiveDateTime) -> PathBuf {
    dir.join(format!("{}_unparsed.pdf", format_timestamp(&fetched_at)))
}

/// Renames a successfully extracted document after its snapshot.
///
/// A document that failed extraction keeps its `_unparsed` name.
pub fn archive_document(unparsed: &Path, snapshot: &Snapshot) -> Result<PathBuf> {
    let dir = unparsed.parent().unwrap_or(Path::new("."));
    let archived = dir.join(format!("{}.pdf", snapshot.file_stem()));
    fs::rename(unparsed, &archived).with_context(|| {
        format!(
            "renaming {} to {}",
            unparsed.display(),
            archived.display()
        )
    })?;
    info!(path = %archived.display(), "Document archived");
    Ok(archived)
}
