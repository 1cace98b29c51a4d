//! Hub/destination selection over a loaded dataset.
//!
//! The hub/destination combination is resolved once into a [`Selection`]; every
//! aggregator dispatches on that instead of re-checking which filters are set.

use serde::Serialize;
use tracing::debug;

use crate::dataset::UnifiedDataset;
use crate::error::FilterError;
use crate::model::FlightRecord;

/// Which records a query is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selection {
    NoFilter,
    HubOnly { hub: String },
    DestinationOnly { destination: String },
    /// Both directions between two airports.
    RoutePair { hub: String, destination: String },
}

/// Which side of a selection a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Direction {
    /// The single direction of a non route-pair selection.
    All,
    /// Hub to destination.
    Forward,
    /// Destination to hub.
    Reverse,
}

impl Selection {
    /// Builds a selection; blank names count as unset.
    pub fn new(hub: Option<&str>, destination: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        match (clean(hub), clean(destination)) {
            (None, None) => Selection::NoFilter,
            (Some(hub), None) => Selection::HubOnly { hub },
            (None, Some(destination)) => Selection::DestinationOnly { destination },
            (Some(hub), Some(destination)) => Selection::RoutePair { hub, destination },
        }
    }

    pub fn hub(&self) -> Option<&str> {
        match self {
            Selection::HubOnly { hub } | Selection::RoutePair { hub, .. } => Some(hub),
            _ => None,
        }
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Selection::DestinationOnly { destination }
            | Selection::RoutePair { destination, .. } => Some(destination),
            _ => None,
        }
    }

    pub fn is_route_pair(&self) -> bool {
        matches!(self, Selection::RoutePair { .. })
    }

    /// Directions a query over this selection reports on, in display order.
    pub fn directions(&self) -> Vec<Direction> {
        match self {
            Selection::RoutePair { hub, destination } if hub == destination => {
                vec![Direction::Forward]
            }
            Selection::RoutePair { .. } => vec![Direction::Forward, Direction::Reverse],
            _ => vec![Direction::All],
        }
    }

    pub fn label(&self, direction: Direction) -> String {
        match (self, direction) {
            (Selection::RoutePair { hub, destination }, Direction::Reverse) => {
                format!("{destination} -> {hub}")
            }
            (Selection::RoutePair { hub, destination }, _) => format!("{hub} -> {destination}"),
            (Selection::HubOnly { hub }, _) => format!("From {hub}"),
            (Selection::DestinationOnly { destination }, _) => format!("To {destination}"),
            (Selection::NoFilter, _) => "All Flights".to_string(),
        }
    }

    /// Short description of the selection for report titles.
    pub fn describe(&self) -> String {
        match self {
            Selection::NoFilter => "all flights".to_string(),
            Selection::HubOnly { hub } => format!("flights from {hub}"),
            Selection::DestinationOnly { destination } => format!("flights to {destination}"),
            Selection::RoutePair { hub, destination } => {
                format!("flights between {hub} and {destination} (both directions)")
            }
        }
    }

    fn classify(&self, record: &FlightRecord) -> Option<Direction> {
        match self {
            Selection::NoFilter => Some(Direction::All),
            Selection::HubOnly { hub } => (record.origin == *hub).then_some(Direction::All),
            Selection::DestinationOnly { destination } => {
                (record.destination == *destination).then_some(Direction::All)
            }
            Selection::RoutePair { hub, destination } => {
                if record.is_route(hub, destination) {
                    Some(Direction::Forward)
                } else if record.is_route(destination, hub) {
                    Some(Direction::Reverse)
                } else {
                    None
                }
            }
        }
    }

    /// Fails on the first selected name that appears nowhere in `dataset`.
    pub(crate) fn check_known(&self, dataset: &UnifiedDataset) -> Result<(), FilterError> {
        for name in [self.hub(), self.destination()].into_iter().flatten() {
            if !dataset.knows_location(name) {
                return Err(FilterError::UnknownLocation(name.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewEntry<'a> {
    pub record: &'a FlightRecord,
    pub direction: Direction,
}

/// The records of a dataset matching one selection. Borrows the dataset.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a UnifiedDataset,
    selection: Selection,
    entries: Vec<ViewEntry<'a>>,
}

impl<'a> FilteredView<'a> {
    pub fn dataset(&self) -> &'a UnifiedDataset {
        self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn entries(&self) -> &[ViewEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self, entry: &ViewEntry<'_>) -> String {
        self.selection.label(entry.direction)
    }

    pub fn records(&self) -> impl Iterator<Item = &'a FlightRecord> + '_ {
        self.entries.iter().map(|e| e.record)
    }
}

/// Restricts `dataset` to `selection`.
///
/// Fails with [`FilterError::UnknownLocation`] if a named hub or destination
/// never appears in the dataset, rather than quietly matching nothing.
pub fn filter<'a>(
    dataset: &'a UnifiedDataset,
    selection: &Selection,
) -> Result<FilteredView<'a>, FilterError> {
    selection.check_known(dataset)?;

    let entries: Vec<ViewEntry<'a>> = dataset
        .records()
        .iter()
        .filter_map(|record| {
            selection
                .classify(record)
                .map(|direction| ViewEntry { record, direction })
        })
        .collect();

    debug!(
        selection = ?selection,
        matched = entries.len(),
        total = dataset.records().len(),
        "Dataset filtered"
    );

    Ok(FilteredView {
        dataset,
        selection: selection.clone(),
        entries,
    })
}
