//! Data types produced by the aggregation pipeline.

use chrono::{NaiveDate, Weekday};
use serde::Serialize;

/// Flights seen on one available date in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub collection_date: NaiveDate,
    pub direction: String,
    pub flight_count: usize,
}

/// Mean of the zero-filled daily series for one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionAverage {
    pub direction: String,
    pub average: f64,
}

/// First and last collection date of a view, with the inclusive day span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionInterval {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

/// What a monthly bucket reports: presence for route pairs, volume otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonthlyMeasure {
    /// Share of the month's available days on which the direction flew.
    Availability { active_days: usize, percentage: f64 },
    /// Raw record total for the month.
    Volume { flights: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`
    pub month: String,
    pub direction: String,
    /// Days in the month on which any snapshot was taken.
    pub available_days: usize,
    #[serde(flatten)]
    pub measure: MonthlyMeasure,
}

/// What a weekday bucket reports: presence for route pairs, volume otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeekdayMeasure {
    Presence {
        active_days: usize,
        available_days: usize,
        percentage: f64,
    },
    Volume {
        mean: f64,
        std_dev: f64,
        samples: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayStat {
    pub weekday: Weekday,
    pub direction: String,
    #[serde(flatten)]
    pub measure: WeekdayMeasure,
}

/// How an airport relates to the query it was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportRole {
    /// The selected hub.
    Hub,
    /// The selected destination, or a destination reached from the hub.
    Destination,
    /// An airport with flights into the selected destination.
    Origin,
    /// Any airport of an unfiltered query.
    Airport,
}

/// Day-level appearance probabilities of one airport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportProbability {
    pub name: String,
    pub role: AirportRole,
    /// Days on which the outbound leg was seen. For an airport next to a
    /// selected hub this is `hub -> airport`, next to a selected destination
    /// `airport -> destination`; otherwise a departure of the airport itself.
    pub outbound_days: usize,
    /// Days on which the return leg was seen, or an arrival of the airport
    /// itself where `outbound_days` counts its departures.
    pub inbound_days: usize,
    /// Available dates of the whole dataset.
    pub total_days: usize,
    pub outbound_probability: f64,
    pub inbound_probability: f64,
}

/// An airport ready for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub role: AirportRole,
    pub hover_summary: String,
}

/// Full name of a weekday, as shown on reports.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Monday first.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];
