//! Day-of-week patterns.

use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::{BTreeSet, HashSet};

use crate::analyzers::daily::daily_counts;
use crate::analyzers::types::{WEEKDAYS, WeekdayMeasure, WeekdayStat};
use crate::analyzers::utility::{mean, pct, sample_stddev};
use crate::filter::{Direction, FilteredView};

/// Weekday statistics for a view, Monday first.
///
/// Route pairs report, per direction, the percentage of the dataset's
/// available dates falling on that weekday on which the direction appeared.
/// Other selections report the mean and spread of the daily series grouped by
/// weekday. A weekday with no available date is left out.
pub fn weekday_stats(view: &FilteredView<'_>) -> Vec<WeekdayStat> {
    if view.is_empty() {
        return Vec::new();
    }
    if view.selection().is_route_pair() {
        presence(view)
    } else {
        volume(view)
    }
}

fn presence(view: &FilteredView<'_>) -> Vec<WeekdayStat> {
    let selection = view.selection();
    let available = view.dataset().available_dates();

    let active: HashSet<(NaiveDate, Direction)> = view
        .entries()
        .iter()
        .map(|e| (e.record.collection_date, e.direction))
        .collect();

    let mut stats = Vec::new();
    for weekday in WEEKDAYS {
        let days: BTreeSet<&NaiveDate> =
            available.iter().filter(|d| d.weekday() == weekday).collect();
        if days.is_empty() {
            continue;
        }
        for direction in selection.directions() {
            let active_days = days
                .iter()
                .filter(|d| active.contains(&(***d, direction)))
                .count();
            stats.push(WeekdayStat {
                weekday,
                direction: selection.label(direction),
                measure: WeekdayMeasure::Presence {
                    active_days,
                    available_days: days.len(),
                    percentage: pct(active_days, days.len()),
                },
            });
        }
    }
    stats
}

fn volume(view: &FilteredView<'_>) -> Vec<WeekdayStat> {
    let series = daily_counts(view);
    let label = view.selection().label(Direction::All);

    WEEKDAYS
        .iter()
        .filter_map(|&weekday: &Weekday| {
            let values: Vec<f64> = series
                .iter()
                .filter(|row| row.collection_date.weekday() == weekday)
                .map(|row| row.flight_count as f64)
                .collect();
            if values.is_empty() {
                return None;
            }
            let avg = mean(&values);
            Some(WeekdayStat {
                weekday,
                direction: label.clone(),
                measure: WeekdayMeasure::Volume {
                    mean: avg,
                    std_dev: sample_stddev(&values, avg),
                    samples: values.len(),
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::dataset;
    use crate::filter::{Selection, filter};

    // 2024-01-01 and 2024-01-08 are Mondays, 2024-01-02 a Tuesday
    fn sample() -> crate::dataset::UnifiedDataset {
        dataset(&[
            ("2024-01-01", &[("A", "B"), ("A", "B"), ("A", "C")]),
            ("2024-01-02", &[("B", "A")]),
            ("2024-01-08", &[("C", "B")]),
        ])
    }

    #[test]
    fn test_route_pair_presence_per_direction() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("A"), Some("B"))).unwrap();
        let stats = weekday_stats(&view);

        // Monday and Tuesday only, two directions each
        assert_eq!(stats.len(), 4);
        assert_eq!(stats[0].weekday, Weekday::Mon);
        assert_eq!(stats[0].direction, "A -> B");
        assert_eq!(
            stats[0].measure,
            WeekdayMeasure::Presence {
                active_days: 1,
                available_days: 2,
                percentage: 50.0
            }
        );
        assert_eq!(stats[3].weekday, Weekday::Tue);
        assert_eq!(stats[3].direction, "B -> A");
        assert_eq!(
            stats[3].measure,
            WeekdayMeasure::Presence {
                active_days: 1,
                available_days: 1,
                percentage: 100.0
            }
        );
    }

    #[test]
    fn test_route_pair_percentages_are_bounded() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("B"), Some("A"))).unwrap();
        for stat in weekday_stats(&view) {
            let WeekdayMeasure::Presence { percentage, .. } = stat.measure else {
                panic!("route pair should report presence");
            };
            assert!((0.0..=100.0).contains(&percentage));
        }
    }

    #[test]
    fn test_hub_only_reports_volume_of_daily_series() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("A"), None)).unwrap();
        let stats = weekday_stats(&view);

        // the view spans only 01-01, so Tuesday never makes the grid
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].direction, "From A");
        assert_eq!(
            stats[0].measure,
            WeekdayMeasure::Volume {
                mean: 3.0,
                std_dev: 0.0,
                samples: 1
            }
        );
    }

    #[test]
    fn test_no_filter_mondays_include_spread() {
        let ds = sample();
        let view = filter(&ds, &Selection::NoFilter).unwrap();
        let stats = weekday_stats(&view);

        let monday = stats.iter().find(|s| s.weekday == Weekday::Mon).unwrap();
        let WeekdayMeasure::Volume {
            mean,
            std_dev,
            samples,
        } = monday.measure
        else {
            panic!("expected volume");
        };
        assert_eq!(samples, 2);
        assert_eq!(mean, 2.0);
        assert!((std_dev - 2.0_f64.sqrt()).abs() < 1e-9);
        assert!(stats.iter().all(|s| s.weekday != Weekday::Wed));
    }

    #[test]
    fn test_empty_view_has_no_weekdays() {
        let ds = sample();
        let view = filter(&ds, &Selection::new(Some("A"), Some("A"))).unwrap();
        assert!(view.is_empty());
        assert!(weekday_stats(&view).is_empty());
    }
}
