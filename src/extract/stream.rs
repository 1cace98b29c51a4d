//! Whitespace-layout table detection.
//!
//! Text runs are grouped into lines by baseline, neighbouring runs merged into
//! cells, and columns inferred from where cells start across all lines.

use super::detect::{RawTable, TableDetector, cluster_positions};
use super::document::{Document, Page, PageSelection, TextChunk};

#[derive(Debug, Clone, Copy)]
pub struct StreamDetector {
    /// Baseline difference, as a fraction of font size, still counted as the same line.
    pub row_tolerance: f64,
    /// Horizontal gap, as a multiple of font size, below which runs join one cell.
    pub word_gap: f64,
    /// Distance in points between cell starts that still share a column.
    pub column_tolerance: f64,
}

impl Default for StreamDetector {
    fn default() -> Self {
        Self {
            row_tolerance: 0.5,
            word_gap: 1.0,
            column_tolerance: 10.0,
        }
    }
}

struct Cell {
    x: f64,
    right: f64,
    font_size: f64,
    text: String,
}

impl TableDetector for StreamDetector {
    fn detect(&self, document: &Document, pages: PageSelection) -> Vec<RawTable> {
        document
            .select(pages)
            .filter_map(|page| self.page_table(page))
            .collect()
    }
}

impl StreamDetector {
    fn page_table(&self, page: &Page) -> Option<RawTable> {
        let lines = self.lines(&page.chunks);
        if lines.is_empty() {
            return None;
        }

        let rows: Vec<Vec<Cell>> = lines.into_iter().map(|line| self.cells(line)).collect();
        let anchors = cluster_positions(
            rows.iter().flatten().map(|c| c.x),
            self.column_tolerance,
        );

        let grid = rows
            .iter()
            .map(|row| {
                let mut out = vec![String::new(); anchors.len()];
                for cell in row {
                    let column = nearest(&anchors, cell.x);
                    if !out[column].is_empty() {
                        out[column].push(' ');
                    }
                    out[column].push_str(&cell.text);
                }
                out
            })
            .collect();

        Some(RawTable::new(page.number, grid))
    }

    /// Chunks grouped top to bottom by baseline, each line sorted left to right.
    fn lines<'a>(&self, chunks: &'a [TextChunk]) -> Vec<Vec<&'a TextChunk>> {
        let mut sorted: Vec<&TextChunk> = chunks.iter().collect();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut lines: Vec<(f64, Vec<&TextChunk>)> = Vec::new();
        for chunk in sorted {
            let tolerance = self.row_tolerance * chunk.font_size.max(1.0);
            match lines.last_mut() {
                Some((y, line)) if (*y - chunk.y).abs() <= tolerance => line.push(chunk),
                _ => lines.push((chunk.y, vec![chunk])),
            }
        }

        lines
            .into_iter()
            .map(|(_, mut line)| {
                line.sort_by(|a, b| a.x.total_cmp(&b.x));
                line
            })
            .collect()
    }

    fn cells(&self, line: Vec<&TextChunk>) -> Vec<Cell> {
        let mut cells: Vec<Cell> = Vec::new();
        for chunk in line {
            match cells.last_mut() {
                Some(cell) if chunk.x - cell.right <= self.word_gap * cell.font_size.max(1.0) => {
                    cell.text.push(' ');
                    cell.text.push_str(chunk.text.trim());
                    cell.right = cell.right.max(chunk.right());
                }
                _ => cells.push(Cell {
                    x: chunk.x,
                    right: chunk.right(),
                    font_size: chunk.font_size,
                    text: chunk.text.trim().to_string(),
                }),
            }
        }
        cells
    }
}

fn nearest(anchors: &[f64], x: f64) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - x).abs().total_cmp(&(*b - x).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_page() -> Page {
        // Two label/value lines laid out in four columns, like the document header.
        Page {
            number: 1,
            chunks: vec![
                TextChunk::new(40.0, 800.0, 8.0, "Departure"),
                TextChunk::new(80.0, 800.0, 8.0, "period"),
                TextChunk::new(140.0, 800.0, 8.0, "Flights"),
                TextChunk::new(360.0, 800.0, 8.0, "Data generated"),
                TextChunk::new(460.0, 800.0, 8.0, "Timestamp"),
                TextChunk::new(40.0, 788.0, 8.0, "Window"),
                TextChunk::new(140.0, 788.5, 8.0, "2024-03-06 00:00 (CET) - 2024-03-08 23:59 (CET)"),
                TextChunk::new(360.0, 788.0, 8.0, "Generated"),
                TextChunk::new(460.0, 788.0, 8.0, "2024-03-05 08:30:00 (CET)"),
            ],
            rulings: vec![],
        }
    }

    #[test]
    fn test_detects_one_table_per_page() {
        let doc = Document::from_pages(vec![header_page()]);
        let tables = StreamDetector::default().detect(&doc, PageSelection::Page(1));

        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.width(), 4);
        assert_eq!(table.cell(0, 0), Some("Departure period"));
        assert_eq!(
            table.cell(1, 1),
            Some("2024-03-06 00:00 (CET) - 2024-03-08 23:59 (CET)")
        );
        assert_eq!(table.cell(1, 3), Some("2024-03-05 08:30:00 (CET)"));
    }

    #[test]
    fn test_empty_page_yields_no_table() {
        let doc = Document::from_pages(vec![Page {
            number: 1,
            ..Default::default()
        }]);
        assert!(StreamDetector::default().detect(&doc, PageSelection::All).is_empty());
    }

    #[test]
    fn test_other_pages_are_ignored() {
        let mut second = header_page();
        second.number = 2;
        let doc = Document::from_pages(vec![header_page(), second]);
        let tables = StreamDetector::default().detect(&doc, PageSelection::Page(1));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 1);
    }
}
