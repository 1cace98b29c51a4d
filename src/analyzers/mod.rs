//! Aggregations over a filtered dataset.
//!
//! Every statistic is recomputed on demand from a [`FilteredView`] and the
//! dataset's available dates. Nothing here is cached or persisted.

pub mod airports;
pub mod daily;
pub mod monthly;
pub mod report;
pub mod types;
pub mod utility;
pub mod weekday;

use serde::Serialize;

use crate::dataset::UnifiedDataset;
use crate::error::FilterError;
use crate::filter::{Selection, filter};
use types::{
    AirportProbability, CollectionInterval, DailyCount, DirectionAverage, MonthlyCount,
    WeekdayStat,
};

/// Everything the dashboard shows for one hub/destination selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    pub selection: String,
    pub records: usize,
    pub interval: Option<CollectionInterval>,
    pub average_daily_flights: Option<f64>,
    pub direction_averages: Vec<DirectionAverage>,
    pub daily: Vec<DailyCount>,
    pub monthly: Vec<MonthlyCount>,
    pub weekday: Vec<WeekdayStat>,
    pub airports: Vec<AirportProbability>,
}

impl SelectionReport {
    #[tracing::instrument(skip(dataset))]
    pub fn build(dataset: &UnifiedDataset, selection: &Selection) -> Result<Self, FilterError> {
        let view = filter(dataset, selection)?;

        Ok(Self {
            selection: selection.describe(),
            records: view.len(),
            interval: daily::collection_interval(&view),
            average_daily_flights: daily::average_daily_flights(&view),
            direction_averages: daily::direction_averages(&view),
            daily: daily::daily_counts(&view),
            monthly: monthly::monthly_counts(&view),
            weekday: weekday::weekday_stats(&view),
            airports: airports::airport_stats(dataset, selection)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::dataset;

    #[test]
    fn test_selection_report_bundles_every_statistic() {
        let ds = dataset(&[
            ("2024-01-01", &[("A", "B"), ("B", "A")]),
            ("2024-01-02", &[("A", "C")]),
            ("2024-01-04", &[("A", "B")]),
        ]);
        let report = SelectionReport::build(&ds, &Selection::new(Some("A"), Some("B"))).unwrap();

        assert_eq!(report.selection, "flights between A and B (both directions)");
        assert_eq!(report.records, 3);
        assert_eq!(report.daily.len(), 6);
        assert_eq!(report.direction_averages.len(), 2);
        assert_eq!(report.airports.len(), 2);
        assert_eq!(report.interval.map(|i| i.days), Some(4));
    }

    #[test]
    fn test_selection_report_rejects_unknown_airport() {
        let ds = dataset(&[("2024-01-01", &[("A", "B")])]);
        let err = SelectionReport::build(&ds, &Selection::new(None, Some("Q"))).unwrap_err();
        assert_eq!(err, FilterError::UnknownLocation("Q".into()));
    }
}
