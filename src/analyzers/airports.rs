//! Per-airport appearance probabilities for route-map presentation.

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::analyzers::types::{AirportProbability, AirportRole, MapPoint};
use crate::dataset::UnifiedDataset;
use crate::error::FilterError;
use crate::filter::Selection;
use crate::geo::CoordinateLookup;

type DateSet = BTreeSet<NaiveDate>;

/// Collection dates per departure, arrival and directed pair, over the whole
/// dataset. Records with a blank endpoint are ignored.
#[derive(Default)]
struct DayIndex<'a> {
    departures: HashMap<&'a str, DateSet>,
    arrivals: HashMap<&'a str, DateSet>,
    pairs: HashMap<(&'a str, &'a str), DateSet>,
}

impl<'a> DayIndex<'a> {
    fn build(dataset: &'a UnifiedDataset) -> Self {
        let mut index = Self::default();
        for record in dataset.records() {
            if record.has_blank_endpoint() {
                continue;
            }
            let (origin, destination) = (record.origin.as_str(), record.destination.as_str());
            let day = record.collection_date;
            index.departures.entry(origin).or_default().insert(day);
            index.arrivals.entry(destination).or_default().insert(day);
            index
                .pairs
                .entry((origin, destination))
                .or_default()
                .insert(day);
        }
        index
    }

    fn days_departing(&self, airport: &str) -> usize {
        self.departures.get(airport).map_or(0, BTreeSet::len)
    }

    fn days_arriving(&self, airport: &str) -> usize {
        self.arrivals.get(airport).map_or(0, BTreeSet::len)
    }

    fn days_flown(&self, origin: &str, destination: &str) -> usize {
        self.pairs
            .get(&(origin, destination))
            .map_or(0, BTreeSet::len)
    }

    fn airports(&self) -> BTreeSet<&'a str> {
        self.departures
            .keys()
            .chain(self.arrivals.keys())
            .copied()
            .collect()
    }

    fn destinations_of(&self, origin: &str) -> BTreeSet<&'a str> {
        self.pairs
            .keys()
            .filter(|(o, _)| *o == origin)
            .map(|(_, d)| *d)
            .collect()
    }

    fn origins_of(&self, destination: &str) -> BTreeSet<&'a str> {
        self.pairs
            .keys()
            .filter(|(_, d)| *d == destination)
            .map(|(o, _)| *o)
            .collect()
    }
}

fn entry(
    name: &str,
    role: AirportRole,
    outbound_days: usize,
    inbound_days: usize,
    total_days: usize,
) -> AirportProbability {
    let ratio = |days: usize| {
        if total_days == 0 {
            0.0
        } else {
            days as f64 / total_days as f64
        }
    };
    AirportProbability {
        name: name.to_string(),
        role,
        outbound_days,
        inbound_days,
        total_days,
        outbound_probability: ratio(outbound_days),
        inbound_probability: ratio(inbound_days),
    }
}

/// Outbound and inbound day-level probabilities for every airport relevant to
/// `selection`.
///
/// Probabilities are the number of distinct collection dates on which a
/// directed pair was seen, divided by all available dates of the unfiltered
/// dataset. The anchor of a hub-only or destination-only query, and every
/// airport of an unfiltered one, counts its own departures (outbound) and
/// arrivals (inbound). An airport reached from a hub counts `hub -> airport`
/// as outbound and the `airport -> hub` return leg, which the hub view never
/// holds, as inbound. An airport flying into a destination counts
/// `airport -> destination` as outbound and `destination -> airport` as
/// inbound. Airports that never appear in either direction are left out. The
/// anchor, if any, comes first.
pub fn airport_stats(
    dataset: &UnifiedDataset,
    selection: &Selection,
) -> Result<Vec<AirportProbability>, FilterError> {
    selection.check_known(dataset)?;

    let index = DayIndex::build(dataset);
    let total = dataset.available_dates().len();

    let mut stats = Vec::new();
    match selection {
        Selection::NoFilter => {
            for airport in index.airports() {
                stats.push(entry(
                    airport,
                    AirportRole::Airport,
                    index.days_departing(airport),
                    index.days_arriving(airport),
                    total,
                ));
            }
        }
        Selection::HubOnly { hub } => {
            stats.push(entry(
                hub,
                AirportRole::Hub,
                index.days_departing(hub),
                index.days_arriving(hub),
                total,
            ));
            for destination in index.destinations_of(hub) {
                if destination == hub {
                    continue;
                }
                stats.push(entry(
                    destination,
                    AirportRole::Destination,
                    index.days_flown(hub, destination),
                    index.days_flown(destination, hub),
                    total,
                ));
            }
        }
        Selection::DestinationOnly { destination } => {
            stats.push(entry(
                destination,
                AirportRole::Destination,
                index.days_departing(destination),
                index.days_arriving(destination),
                total,
            ));
            for origin in index.origins_of(destination) {
                if origin == destination {
                    continue;
                }
                stats.push(entry(
                    origin,
                    AirportRole::Origin,
                    index.days_flown(origin, destination),
                    index.days_flown(destination, origin),
                    total,
                ));
            }
        }
        Selection::RoutePair { hub, destination } => {
            stats.push(entry(
                hub,
                AirportRole::Hub,
                index.days_flown(hub, destination),
                index.days_flown(destination, hub),
                total,
            ));
            if hub != destination {
                stats.push(entry(
                    destination,
                    AirportRole::Destination,
                    index.days_flown(destination, hub),
                    index.days_flown(hub, destination),
                    total,
                ));
            }
        }
    }

    stats.retain(|s| s.outbound_days > 0 || s.inbound_days > 0);
    debug!(selection = ?selection, airports = stats.len(), "Airport statistics computed");
    Ok(stats)
}

fn hover_summary(stat: &AirportProbability) -> String {
    format!(
        "{}<br>Outbound: {:.1}%<br>Inbound: {:.1}%",
        stat.name,
        stat.outbound_probability * 100.0,
        stat.inbound_probability * 100.0
    )
}

/// Attaches coordinates to airport statistics. Airports the lookup cannot
/// place are skipped.
pub fn map_points(stats: &[AirportProbability], lookup: &impl CoordinateLookup) -> Vec<MapPoint> {
    stats
        .iter()
        .filter_map(|stat| {
            let Some(coords) = lookup.coordinates(&stat.name) else {
                warn!(airport = %stat.name, "No coordinates for airport, skipping");
                return None;
            };
            Some(MapPoint {
                name: stat.name.clone(),
                lat: coords.lat,
                lon: coords.lon,
                role: stat.role,
                hover_summary: hover_summary(stat),
            })
        })
        .collect()
}
