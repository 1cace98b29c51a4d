//! Snapshot extraction from the published availability document.
//!
//! The header block (validity window and generation timestamp) is laid out as
//! free-standing text and is read with a [`StreamDetector`]; the route list is a
//! ruled grid spanning every page and is read with a [`LatticeDetector`].

pub mod detect;
pub mod document;
mod lattice;
mod stream;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::model::{Route, Snapshot, ValidityWindow};
use crate::parser::{parse_timestamp, parse_window};

pub use detect::{LatticeDetector, RawTable, StreamDetector, TableDetector};
pub use document::{Document, Page, PageSelection, Ruling, TextChunk};

/// Conventional header cells: validity window at (1, 1), generation time at (1, 3).
const WINDOW_CELL: (usize, usize) = (1, 1);
const GENERATED_CELL: (usize, usize) = (1, 3);

/// Columns of the route table.
const ROUTE_COLUMNS: usize = 2;

pub struct Extractor<M = StreamDetector, R = LatticeDetector> {
    metadata_detector: M,
    record_detector: R,
}

impl Extractor {
    /// Extractor with the stock PDF detectors.
    pub fn pdf() -> Self {
        Self::new(StreamDetector::default(), LatticeDetector::default())
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::pdf()
    }
}

impl<M: TableDetector, R: TableDetector> Extractor<M, R> {
    pub fn new(metadata_detector: M, record_detector: R) -> Self {
        Self {
            metadata_detector,
            record_detector,
        }
    }

    /// Parses PDF bytes and extracts a snapshot from them.
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<Snapshot, ExtractionError> {
        let document = Document::from_pdf_bytes(bytes)?;
        self.extract(&document)
    }

    #[tracing::instrument(skip_all, fields(pages = document.pages().len()))]
    pub fn extract(&self, document: &Document) -> Result<Snapshot, ExtractionError> {
        let (validity, generated_at) = self.metadata(document)?;
        let routes = self.routes(document)?;

        info!(
            generated_at = %generated_at,
            validity_start = %validity.start,
            validity_end = %validity.end,
            routes = routes.len(),
            "Snapshot extracted"
        );

        Ok(Snapshot {
            generated_at,
            validity,
            routes,
        })
    }

    /// Reads the validity window and generation timestamp from the first page.
    pub fn metadata(
        &self,
        document: &Document,
    ) -> Result<(ValidityWindow, NaiveDateTime), ExtractionError> {
        let tables = self.metadata_detector.detect(document, PageSelection::Page(1));
        if tables.is_empty() {
            return Err(ExtractionError::Metadata(
                "no text table found on the first page".into(),
            ));
        }

        let (window, generated_at) = tables
            .iter()
            .find_map(positional_metadata)
            .or_else(|| {
                debug!("Header cells not at the usual position, scanning page 1");
                tables.iter().find_map(scanned_metadata)
            })
            .ok_or_else(|| {
                ExtractionError::Metadata(
                    "validity window and generation timestamp not found".into(),
                )
            })?;

        if window.0 > window.1 {
            warn!(start = %window.0, end = %window.1, "Validity window ends before it starts");
        }

        Ok((
            ValidityWindow {
                start: window.0,
                end: window.1,
            },
            generated_at,
        ))
    }

    /// Reads every ruled table, drops each header row and returns the sorted routes.
    pub fn routes(&self, document: &Document) -> Result<Vec<Route>, ExtractionError> {
        let tables = self.record_detector.detect(document, PageSelection::All);
        if tables.is_empty() {
            return Err(ExtractionError::Records("no ruled tables found".into()));
        }

        let mut routes = Vec::new();
        for (index, table) in tables.iter().enumerate() {
            let body: Vec<Vec<String>> = table
                .rows
                .iter()
                .skip(1)
                .map(|row| row.iter().map(|cell| normalize_cell(cell)).collect())
                .filter(|row: &Vec<String>| row.iter().any(|cell| !cell.is_empty()))
                .collect();

            if let Some(bad) = body.iter().find(|row| row.len() != ROUTE_COLUMNS) {
                return Err(ExtractionError::Records(format!(
                    "table {} on page {} has {} columns, expected {}",
                    index + 1,
                    table.page,
                    bad.len(),
                    ROUTE_COLUMNS
                )));
            }

            routes.extend(body.into_iter().map(|mut row| {
                let destination = row.pop().unwrap_or_default();
                let origin = row.pop().unwrap_or_default();
                Route {
                    origin,
                    destination,
                }
            }));
        }

        if routes.is_empty() {
            warn!(tables = tables.len(), "Route tables contain only header rows");
        }

        routes.sort();
        Ok(routes)
    }
}

type Metadata = ((NaiveDateTime, NaiveDateTime), NaiveDateTime);

fn positional_metadata(table: &RawTable) -> Option<Metadata> {
    let window = parse_window(table.cell(WINDOW_CELL.0, WINDOW_CELL.1)?)?;
    let generated = parse_timestamp(table.cell(GENERATED_CELL.0, GENERATED_CELL.1)?)?;
    Some((window, generated))
}

fn scanned_metadata(table: &RawTable) -> Option<Metadata> {
    let window = table.cells().find_map(parse_window)?;
    let generated = table
        .cells()
        .filter(|cell| !cell.contains(" - "))
        .find_map(parse_timestamp)?;
    Some((window, generated))
}

/// Collapses runs of whitespace, including line breaks inside wrapped cells.
fn normalize_cell(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}
