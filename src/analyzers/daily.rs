//! Daily flight counts, gap-filled against the dates snapshots were taken on.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

use crate::analyzers::types::{CollectionInterval, DailyCount, DirectionAverage};
use crate::analyzers::utility::mean;
use crate::filter::{Direction, FilteredView};

/// First and last collection date present in the view.
pub fn collection_interval(view: &FilteredView<'_>) -> Option<CollectionInterval> {
    let start = view.records().map(|r| r.collection_date).min()?;
    let end = view.records().map(|r| r.collection_date).max()?;
    Some(CollectionInterval {
        start,
        end,
        days: (end - start).num_days() + 1,
    })
}

/// Available dates inside the view's observed range. Dates without a
/// snapshot are never part of the grid.
pub(crate) fn date_grid(view: &FilteredView<'_>) -> Vec<NaiveDate> {
    match collection_interval(view) {
        Some(interval) => view
            .dataset()
            .available_dates()
            .range(interval.start..=interval.end)
            .copied()
            .collect(),
        None => Vec::new(),
    }
}

/// Record counts per available date and direction, zero where a snapshot
/// exists but showed no matching flight.
///
/// Route pairs get one row per date for each direction; other selections get
/// a single row per date. An empty view yields an empty series.
pub fn daily_counts(view: &FilteredView<'_>) -> Vec<DailyCount> {
    let grid = date_grid(view);
    if grid.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<(NaiveDate, Direction), usize> = HashMap::new();
    for entry in view.entries() {
        *counts
            .entry((entry.record.collection_date, entry.direction))
            .or_default() += 1;
    }

    let selection = view.selection();
    let directions: Vec<(Direction, String)> = selection
        .directions()
        .into_iter()
        .map(|d| (d, selection.label(d)))
        .collect();

    grid.iter()
        .flat_map(|date| {
            directions.iter().map(|(direction, label)| DailyCount {
                collection_date: *date,
                direction: label.clone(),
                flight_count: counts.get(&(*date, *direction)).copied().unwrap_or(0),
            })
        })
        .collect()
}

/// Mean flights per available day; for route pairs both directions are summed
/// per day first. `None` for an empty view.
pub fn average_daily_flights(view: &FilteredView<'_>) -> Option<f64> {
    let series = daily_counts(view);
    if series.is_empty() {
        return None;
    }

    let mut totals: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for row in &series {
        *totals.entry(row.collection_date).or_default() += row.flight_count;
    }
    let totals: Vec<f64> = totals.values().map(|&v| v as f64).collect();
    Some(mean(&totals))
}

/// Mean of the daily series for each direction, in display order.
pub fn direction_averages(view: &FilteredView<'_>) -> Vec<DirectionAverage> {
    let series = daily_counts(view);
    let selection = view.selection();

    selection
        .directions()
        .into_iter()
        .map(|d| selection.label(d))
        .filter_map(|label| {
            let values: Vec<f64> = series
                .iter()
                .filter(|row| row.direction == label)
                .map(|row| row.flight_count as f64)
                .collect();
            (!values.is_empty()).then(|| DirectionAverage {
                average: mean(&values),
                direction: label,
            })
        })
        .collect()
}
