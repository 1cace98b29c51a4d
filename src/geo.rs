//! Static airport coordinates used to place airports on a map.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Anything that can place an airport name on the globe.
pub trait CoordinateLookup {
    fn coordinates(&self, airport: &str) -> Option<Coordinates>;
}

/// Coordinates read once from a JSON file keyed by airport name:
/// ```json
/// {
///   "Budapest": { "lat": 47.43, "lon": 19.26 },
///   "Rome (Fiumicino)": { "lat": 41.80, "lon": 12.25 }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticCoordinates {
    entries: HashMap<String, Coordinates>,
}

impl StaticCoordinates {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading coordinates from {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let entries: HashMap<String, Coordinates> = serde_json::from_str(content)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Coordinates)> for StaticCoordinates {
    fn from_iter<I: IntoIterator<Item = (String, Coordinates)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl CoordinateLookup for StaticCoordinates {
    fn coordinates(&self, airport: &str) -> Option<Coordinates> {
        self.entries.get(airport.trim()).copied()
    }
}
