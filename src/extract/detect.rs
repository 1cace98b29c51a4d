//! Table detection strategies.
//!
//! Both detectors reduce a page to raw cell grids. The extractor only sees
//! [`RawTable`]s, so it can be driven by synthetic grids in tests.

use super::document::{Document, PageSelection};

pub use super::lattice::LatticeDetector;
pub use super::stream::StreamDetector;

/// A detected table: rows of cell strings in reading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub page: u32,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(page: u32, rows: Vec<Vec<String>>) -> Self {
        Self { page, rows }
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// Recovers tables from the selected pages of a document.
pub trait TableDetector {
    fn detect(&self, document: &Document, pages: PageSelection) -> Vec<RawTable>;
}

impl<T: TableDetector + ?Sized> TableDetector for &T {
    fn detect(&self, document: &Document, pages: PageSelection) -> Vec<RawTable> {
        (**self).detect(document, pages)
    }
}

/// Groups sorted-or-not positions into clusters whose neighbours lie within
/// `tolerance`, returning each cluster's mean in ascending order.
pub(crate) fn cluster_positions(values: impl IntoIterator<Item = f64>, tolerance: f64) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for v in sorted {
        match clusters.last_mut() {
            Some(current) if current.last().is_some_and(|last| v - last <= tolerance) => {
                current.push(v)
            }
            _ => clusters.push(vec![v]),
        }
    }

    clusters
        .iter()
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_positions() {
        let clusters = cluster_positions([10.0, 101.0, 10.5, 100.0, 250.0, 11.0], 2.0);
        assert_eq!(clusters, vec![10.5, 100.5, 250.0]);
    }

    #[test]
    fn test_cluster_positions_empty() {
        assert!(cluster_positions(Vec::new(), 1.0).is_empty());
    }

    #[test]
    fn test_raw_table_accessors() {
        let table = RawTable::new(
            1,
            vec![
                vec!["a".into(), "b".into()],
                vec!["c".into(), "d".into(), "e".into()],
            ],
        );
        assert_eq!(table.cell(1, 2), Some("e"));
        assert_eq!(table.cell(2, 0), None);
        assert_eq!(table.width(), 3);
        assert_eq!(table.cells().count(), 5);
    }
}
