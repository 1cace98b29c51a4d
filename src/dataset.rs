//! The unified, immutable dataset every analysis runs against.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::LoadWarning;
use crate::model::FlightRecord;

/// Per-file bookkeeping kept alongside the flattened records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SnapshotSummary {
    pub collection_date: NaiveDate,
    pub name: String,
    pub records: usize,
}

/// Sorted distinct endpoint names, as offered to a hub/destination picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Locations {
    pub departures: Vec<String>,
    pub destinations: Vec<String>,
}

/// All loaded snapshots flattened into one record list, plus the dates on
/// which a snapshot was actually taken.
///
/// Built once per load and never mutated; reloading means building a new one.
#[derive(Debug, Clone, Default)]
pub struct UnifiedDataset {
    records: Vec<FlightRecord>,
    available_dates: BTreeSet<NaiveDate>,
    snapshots: Vec<SnapshotSummary>,
    warnings: Vec<LoadWarning>,
}

impl UnifiedDataset {
    /// Assembles a dataset. Records and snapshots are sorted so the result does
    /// not depend on the order snapshots were visited in, and every record's
    /// collection date is guaranteed to be an available date.
    pub fn new(
        mut records: Vec<FlightRecord>,
        mut snapshots: Vec<SnapshotSummary>,
        warnings: Vec<LoadWarning>,
    ) -> Self {
        records.sort();
        snapshots.sort();

        let available_dates = snapshots
            .iter()
            .map(|s| s.collection_date)
            .chain(records.iter().map(|r| r.collection_date))
            .collect();

        Self {
            records,
            available_dates,
            snapshots,
            warnings,
        }
    }

    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn available_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.available_dates
    }

    pub fn snapshots(&self) -> &[SnapshotSummary] {
        &self.snapshots
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last available date.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((
            *self.available_dates.first()?,
            *self.available_dates.last()?,
        ))
    }

    pub fn locations(&self) -> Locations {
        let departures: BTreeSet<&str> = self.records.iter().map(|r| r.origin.as_str()).collect();
        let destinations: BTreeSet<&str> =
            self.records.iter().map(|r| r.destination.as_str()).collect();

        Locations {
            departures: departures.into_iter().map(str::to_string).collect(),
            destinations: destinations.into_iter().map(str::to_string).collect(),
        }
    }

    /// Whether `name` appears as an origin or destination anywhere in the dataset.
    pub fn knows_location(&self, name: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.origin == name || r.destination == name)
    }
}
