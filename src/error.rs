//! Error and warning types shared by extraction, loading and filtering.

use std::fmt;

use thiserror::Error;

/// Fatal failure of a single extraction attempt. Nothing is persisted when
/// one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The bytes could not be read as a PDF document.
    #[error("unreadable document: {0}")]
    Document(String),

    /// The validity window or generation timestamp could not be located or parsed.
    #[error("metadata extraction failed: {0}")]
    Metadata(String),

    /// No route table could be recovered from the document.
    #[error("record extraction failed: {0}")]
    Records(String),
}

/// Caller-input errors on filter and aggregate calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown location '{0}': it appears neither as a departure nor as a destination")]
    UnknownLocation(String),
}

/// Non-fatal row-level problems found while loading a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// `availability_start` is later than `availability_end`.
    InvertedValidity,
    /// `departure_from` or `departure_to` is blank.
    BlankEndpoint,
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::InvertedValidity => write!(f, "availability start after availability end"),
            IntegrityIssue::BlankEndpoint => write!(f, "blank departure endpoint"),
        }
    }
}

/// Something the loader noticed about one snapshot file.
///
/// `MissingColumns`, `InvalidDateFormat` and `Unreadable` mean the snapshot was
/// skipped; `DataIntegrity` rows are kept in the dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    #[error("{file}: missing columns {missing:?}")]
    MissingColumns { file: String, missing: Vec<String> },

    #[error("{file}: invalid date format: {detail}")]
    InvalidDateFormat { file: String, detail: String },

    #[error("{file}: unreadable snapshot: {detail}")]
    Unreadable { file: String, detail: String },

    #[error("{file} row {row}: {issue}")]
    DataIntegrity {
        file: String,
        row: usize,
        issue: IntegrityIssue,
    },
}

impl LoadWarning {
    /// Returns `true` if the warning caused the whole snapshot to be dropped.
    pub fn skipped_snapshot(&self) -> bool {
        !matches!(self, LoadWarning::DataIntegrity { .. })
    }
}
