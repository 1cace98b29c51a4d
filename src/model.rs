//! Core records: extracted snapshots and the flattened flight records the
//! aggregation pipeline works on.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::parser::format_timestamp;

/// Airport names are taken verbatim from the published document.
pub type AirportName = String;

/// The departure window a published document covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidityWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// One directed (origin, destination) pair as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Route {
    pub origin: AirportName,
    pub destination: AirportName,
}

impl Route {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

/// The result of one successful extraction. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub generated_at: NaiveDateTime,
    pub validity: ValidityWindow,
    /// Sorted by `(origin, destination)`.
    pub routes: Vec<Route>,
}

impl Snapshot {
    /// Name the snapshot is persisted under; its date prefix is the collection date.
    pub fn file_stem(&self) -> String {
        format_timestamp(&self.generated_at)
    }

    /// Flattens the snapshot into its persisted row form.
    pub fn rows(&self) -> impl Iterator<Item = SnapshotRow> + '_ {
        let start = format_timestamp(&self.validity.start);
        let end = format_timestamp(&self.validity.end);
        let generated = format_timestamp(&self.generated_at);

        self.routes.iter().map(move |route| SnapshotRow {
            departure_from: route.origin.clone(),
            departure_to: route.destination.clone(),
            availability_start: start.clone(),
            availability_end: end.clone(),
            data_generated: generated.clone(),
        })
    }
}

/// A single row of a persisted snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub departure_from: String,
    pub departure_to: String,
    pub availability_start: String,
    pub availability_end: String,
    pub data_generated: String,
}

impl SnapshotRow {
    /// Column names every snapshot file must carry.
    pub const COLUMNS: [&'static str; 5] = [
        "departure_from",
        "departure_to",
        "availability_start",
        "availability_end",
        "data_generated",
    ];
}

/// One observed route at one snapshot.
///
/// Field order matters: the derived ordering sorts by collection date first,
/// which is the order the loader hands records out in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FlightRecord {
    pub collection_date: NaiveDate,
    pub origin: AirportName,
    pub destination: AirportName,
    pub validity_start: NaiveDateTime,
    pub validity_end: NaiveDateTime,
    pub generated_at: NaiveDateTime,
}

impl FlightRecord {
    pub fn is_route(&self, origin: &str, destination: &str) -> bool {
        self.origin == origin && self.destination == destination
    }

    pub fn has_blank_endpoint(&self) -> bool {
        self.origin.trim().is_empty() || self.destination.trim().is_empty()
    }
}
