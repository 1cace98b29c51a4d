//! The dashboard summary written to `dashboard_data.json`.

use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::info;

use crate::analyzers::types::{WEEKDAYS, weekday_name};
use crate::analyzers::utility::{mean, sample_stddev};
use crate::dataset::UnifiedDataset;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekdaySummary {
    /// Mean records per snapshot, rounded.
    pub average: u64,
    pub std_dev: f64,
    pub count: usize,
    /// Records per snapshot taken on this weekday.
    pub flights: Vec<usize>,
}

/// Weekday summaries keyed by full weekday name, Monday first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekdayTable(Vec<(Weekday, WeekdaySummary)>);

impl WeekdayTable {
    pub fn get(&self, weekday: Weekday) -> Option<&WeekdaySummary> {
        self.0.iter().find(|(w, _)| *w == weekday).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for WeekdayTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (weekday, summary) in &self.0 {
            map.serialize_entry(weekday_name(*weekday), summary)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_days: usize,
    pub avg_daily_flights: u64,
    /// `YYYY-MM-DD - YYYY-MM-DD`, or `N/A` without snapshots.
    pub date_range: String,
}

/// An undirected route and how often it was seen across all snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCount {
    pub cities: [String; 2],
    pub count: usize,
    pub route_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub total_files: usize,
    pub total_routes: usize,
    pub top_routes_shown: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    #[serde(rename = "generated_at")]
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub weekday_stats: WeekdayTable,
    pub top_routes: Vec<RouteCount>,
    pub metadata: ReportMetadata,
}

impl DashboardReport {
    /// Summarises every loaded snapshot. `top_n` limits the route ranking;
    /// `None` keeps every route.
    pub fn build(
        dataset: &UnifiedDataset,
        generated_at: DateTime<Utc>,
        top_n: Option<usize>,
    ) -> Self {
        let weekday_stats = weekday_table(dataset);
        let summary = summary(dataset);

        let ranked = rank_routes(dataset);
        let total_routes = ranked.len();
        let top_routes: Vec<RouteCount> = match top_n {
            Some(n) => ranked.into_iter().take(n).collect(),
            None => ranked,
        };

        info!(
            files = dataset.snapshots().len(),
            routes = total_routes,
            shown = top_routes.len(),
            "Dashboard report built"
        );

        Self {
            generated_at,
            summary,
            weekday_stats,
            metadata: ReportMetadata {
                total_files: dataset.snapshots().len(),
                total_routes,
                top_routes_shown: top_routes.len(),
            },
            top_routes,
        }
    }
}

fn weekday_table(dataset: &UnifiedDataset) -> WeekdayTable {
    let mut per_weekday: HashMap<Weekday, Vec<usize>> = HashMap::new();
    for snapshot in dataset.snapshots() {
        per_weekday
            .entry(snapshot.collection_date.weekday())
            .or_default()
            .push(snapshot.records);
    }

    let rows = WEEKDAYS
        .iter()
        .filter_map(|weekday| {
            let flights = per_weekday.remove(weekday)?;
            let values: Vec<f64> = flights.iter().map(|&f| f as f64).collect();
            let avg = mean(&values);
            Some((
                *weekday,
                WeekdaySummary {
                    average: avg.round() as u64,
                    std_dev: sample_stddev(&values, avg),
                    count: flights.len(),
                    flights,
                },
            ))
        })
        .collect();
    WeekdayTable(rows)
}

fn summary(dataset: &UnifiedDataset) -> ReportSummary {
    let snapshots = dataset.snapshots();
    let total_days = snapshots.len();
    let total_flights: usize = snapshots.iter().map(|s| s.records).sum();
    let avg_daily_flights = if total_days == 0 {
        0
    } else {
        (total_flights as f64 / total_days as f64).round() as u64
    };

    let first = snapshots.iter().map(|s| s.collection_date).min();
    let last = snapshots.iter().map(|s| s.collection_date).max();
    let date_range = match (first, last) {
        (Some(first), Some(last)) => {
            format!("{} - {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d"))
        }
        _ => "N/A".to_string(),
    };

    ReportSummary {
        total_days,
        avg_daily_flights,
        date_range,
    }
}

/// Routes counted without regard to direction, most frequent first.
fn rank_routes(dataset: &UnifiedDataset) -> Vec<RouteCount> {
    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for record in dataset.records() {
        if record.has_blank_endpoint() {
            continue;
        }
        let (a, b) = (record.origin.as_str(), record.destination.as_str());
        let key = if a <= b { (a, b) } else { (b, a) };
        *counts.entry(key).or_default() += 1;
    }

    let mut ranked: Vec<RouteCount> = counts
        .into_iter()
        .map(|((a, b), count)| RouteCount {
            route_key: format!("{a} - {b}"),
            cities: [a.to_string(), b.to_string()],
            count,
        })
        .collect();
    ranked.sort_by(|x, y| y.count.cmp(&x.count).then_with(|| x.route_key.cmp(&y.route_key)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::dataset;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap()
    }

    // 2024-01-01 and 2024-01-08 are Mondays
    fn sample() -> UnifiedDataset {
        dataset(&[
            ("2024-01-01", &[("Budapest", "Rome"), ("Rome", "Budapest"), ("Sofia", "Rome")]),
            ("2024-01-02", &[("Budapest", "Rome")]),
            ("2024-01-08", &[("Budapest", "Sofia"), ("Rome", "Budapest"), ("Budapest", "")]),
            ("2024-01-09", &[]),
        ])
    }

    #[test]
    fn test_weekday_stats_over_snapshot_sizes() {
        let report = DashboardReport::build(&sample(), now(), None);
        let monday = report.weekday_stats.get(Weekday::Mon).unwrap();

        assert_eq!(monday.flights, vec![3, 3]);
        assert_eq!(monday.average, 3);
        assert_eq!(monday.std_dev, 0.0);
        assert_eq!(monday.count, 2);

        let tuesday = report.weekday_stats.get(Weekday::Tue).unwrap();
        assert_eq!(tuesday.flights, vec![1, 0]);
        assert_eq!(tuesday.average, 1); // 0.5 rounds away from zero
        assert!((tuesday.std_dev - 0.5_f64.sqrt()).abs() < 1e-9);

        assert_eq!(report.weekday_stats.len(), 2);
        assert!(report.weekday_stats.get(Weekday::Sun).is_none());
    }

    #[test]
    fn test_summary() {
        let report = DashboardReport::build(&sample(), now(), None);
        assert_eq!(report.summary.total_days, 4);
        // 7 rows over 4 files
        assert_eq!(report.summary.avg_daily_flights, 2);
        assert_eq!(report.summary.date_range, "2024-01-01 - 2024-01-09");
    }

    #[test]
    fn test_routes_are_undirected_and_ranked() {
        let report = DashboardReport::build(&sample(), now(), None);
        let top = &report.top_routes[0];

        assert_eq!(top.route_key, "Budapest - Rome");
        assert_eq!(top.cities, ["Budapest".to_string(), "Rome".to_string()]);
        assert_eq!(top.count, 4);
        // blank endpoints are not routes
        assert_eq!(report.metadata.total_routes, 3);
        assert_eq!(report.top_routes[1].route_key, "Budapest - Sofia");
        assert_eq!(report.top_routes[2].route_key, "Rome - Sofia");
    }

    #[test]
    fn test_top_n_limits_shown_routes() {
        let report = DashboardReport::build(&sample(), now(), Some(1));
        assert_eq!(report.top_routes.len(), 1);
        assert_eq!(report.metadata.top_routes_shown, 1);
        assert_eq!(report.metadata.total_routes, 3);
        assert_eq!(report.metadata.total_files, 4);
    }

    #[test]
    fn test_empty_dataset() {
        let report = DashboardReport::build(&UnifiedDataset::default(), now(), None);
        assert_eq!(report.summary.date_range, "N/A");
        assert_eq!(report.summary.avg_daily_flights, 0);
        assert!(report.weekday_stats.is_empty());
        assert!(report.top_routes.is_empty());
    }

    #[test]
    fn test_serialises_in_dashboard_shape() {
        let report = DashboardReport::build(&sample(), now(), None);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["summary"]["totalDays"], 4);
        assert_eq!(json["summary"]["dateRange"], "2024-01-01 - 2024-01-09");
        assert_eq!(json["weekdayStats"]["Monday"]["count"], 2);
        assert!(json["weekdayStats"]["Monday"]["stdDev"].is_number());
        assert_eq!(json["topRoutes"][0]["routeKey"], "Budapest - Rome");
        assert_eq!(json["metadata"]["topRoutesShown"], 3);
        assert!(json["generated_at"].is_string());
    }
}
