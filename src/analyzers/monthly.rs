//! Monthly buckets. Route pairs report how often a direction was offered,
//! everything else reports raw volume.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::analyzers::types::{MonthlyCount, MonthlyMeasure};
use crate::analyzers::utility::pct;
use crate::dataset::UnifiedDataset;
use crate::filter::{Direction, FilteredView};

fn month_key(date: &NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Number of available dates in each month, across the whole dataset.
pub fn available_days_per_month(dataset: &UnifiedDataset) -> BTreeMap<String, usize> {
    let mut months = BTreeMap::new();
    for date in dataset.available_dates() {
        *months.entry(month_key(date)).or_default() += 1;
    }
    months
}

/// Monthly statistics for a view, one row per available month and direction.
///
/// For a route pair the measure is the percentage of the month's available
/// days on which the direction had at least one record. For other selections
/// it is the number of matching records. Months without matches are reported
/// as zero as long as a snapshot was taken in them.
pub fn monthly_counts(view: &FilteredView<'_>) -> Vec<MonthlyCount> {
    if view.is_empty() {
        return Vec::new();
    }

    let months = available_days_per_month(view.dataset());
    let selection = view.selection();

    let mut active: HashMap<(String, Direction), BTreeSet<NaiveDate>> = HashMap::new();
    let mut volume: HashMap<(String, Direction), usize> = HashMap::new();
    for entry in view.entries() {
        let key = (month_key(&entry.record.collection_date), entry.direction);
        active
            .entry(key.clone())
            .or_default()
            .insert(entry.record.collection_date);
        *volume.entry(key).or_default() += 1;
    }

    let mut rows = Vec::new();
    for (month, &available_days) in &months {
        for direction in selection.directions() {
            let key = (month.clone(), direction);
            let measure = if selection.is_route_pair() {
                let active_days = active.get(&key).map_or(0, BTreeSet::len);
                MonthlyMeasure::Availability {
                    active_days,
                    percentage: pct(active_days, available_days),
                }
            } else {
                MonthlyMeasure::Volume {
                    flights: volume.get(&key).copied().unwrap_or(0),
                }
            };
            rows.push(MonthlyCount {
                month: month.clone(),
                direction: selection.label(direction),
                available_days,
                measure,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::dataset;
    use crate::filter::{Selection, filter};

    fn sample() -> UnifiedDataset {
        dataset(&[
            ("2024-01-01", &[("A", "B"), ("A", "B"), ("B", "A")]),
            ("2024-01-02", &[("A", "C")]),
            ("2024-01-15", &[("A", "B")]),
            ("2024-01-20", &[]),
            ("2024-02-03", &[("C", "A")]),
            ("2024-02-04", &[("B", "A")]),
        ])
    }

    #[test]
    fn test_available_days_per_month() {
        let months = available_days_per_month(&sample());
        assert_eq!(months.get("2024-01"), Some(&4));
        assert_eq!(months.get("2024-02"), Some(&2));
    }

    #[test]
    fn test_route_pair_reports_share_of_available_days() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("A"), Some("B"))).unwrap();
        let rows = monthly_counts(&view);

        assert_eq!(rows.len(), 4);
        // duplicates on 01-01 count as one active day
        assert_eq!(rows[0].month, "2024-01");
        assert_eq!(rows[0].direction, "A -> B");
        assert_eq!(
            rows[0].measure,
            MonthlyMeasure::Availability {
                active_days: 2,
                percentage: 50.0
            }
        );
        assert_eq!(rows[1].direction, "B -> A");
        assert_eq!(
            rows[1].measure,
            MonthlyMeasure::Availability {
                active_days: 1,
                percentage: 25.0
            }
        );
        // no A -> B in February, still reported
        assert_eq!(rows[2].month, "2024-02");
        assert_eq!(
            rows[2].measure,
            MonthlyMeasure::Availability {
                active_days: 0,
                percentage: 0.0
            }
        );
    }

    #[test]
    fn test_route_pair_percentages_are_bounded() {
        let ds = sample();
        for (hub, dest) in [("A", "B"), ("B", "A"), ("A", "C")] {
            let view = filter(&ds, &Selection::new(Some(hub), Some(dest))).unwrap();
            for row in monthly_counts(&view) {
                let MonthlyMeasure::Availability { percentage, .. } = row.measure else {
                    panic!("route pair should report availability");
                };
                assert!((0.0..=100.0).contains(&percentage));
            }
        }
    }

    #[test]
    fn test_hub_only_reports_volume() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("A"), None)).unwrap();
        let rows = monthly_counts(&view);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].direction, "From A");
        assert_eq!(rows[0].measure, MonthlyMeasure::Volume { flights: 4 });
        assert_eq!(rows[1].measure, MonthlyMeasure::Volume { flights: 0 });
    }

    #[test]
    fn test_empty_view_has_no_months() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("C"), Some("B"))).unwrap();
        assert!(monthly_counts(&view).is_empty());
    }
}
