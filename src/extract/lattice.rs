//! Ruled-grid table detection.
//!
//! Rulings that touch each other form a grid; each grid becomes one table whose
//! cells are the spaces between consecutive rulings.

use super::detect::{RawTable, TableDetector, cluster_positions};
use super::document::{Document, Page, PageSelection, Ruling, TextChunk};

#[derive(Debug, Clone, Copy)]
pub struct LatticeDetector {
    /// Slack in points when deciding whether two rulings touch or coincide.
    pub line_tolerance: f64,
    /// Rulings shorter than this are ignored (rectangle ends of hairlines).
    pub min_ruling_length: f64,
}

impl Default for LatticeDetector {
    fn default() -> Self {
        Self {
            line_tolerance: 2.0,
            min_ruling_length: 4.0,
        }
    }
}

impl TableDetector for LatticeDetector {
    fn detect(&self, document: &Document, pages: PageSelection) -> Vec<RawTable> {
        document
            .select(pages)
            .flat_map(|page| self.page_tables(page))
            .collect()
    }
}

struct Grid {
    /// Descending.
    rows: Vec<f64>,
    /// Ascending.
    columns: Vec<f64>,
}

impl LatticeDetector {
    fn page_tables(&self, page: &Page) -> Vec<RawTable> {
        let rulings: Vec<&Ruling> = page
            .rulings
            .iter()
            .filter(|r| r.length() >= self.min_ruling_length)
            .collect();

        let mut grids: Vec<Grid> = self
            .components(&rulings)
            .into_iter()
            .filter_map(|component| self.grid(&component))
            .collect();
        grids.sort_by(|a, b| b.rows[0].total_cmp(&a.rows[0]));

        grids
            .iter()
            .map(|grid| RawTable::new(page.number, fill(grid, &page.chunks)))
            .collect()
    }

    fn touches(&self, a: &Ruling, b: &Ruling) -> bool {
        let t = self.line_tolerance;
        a.x0 <= b.x1 + t && b.x0 <= a.x1 + t && a.y0 <= b.y1 + t && b.y0 <= a.y1 + t
    }

    /// Connected groups of rulings.
    fn components<'a>(&self, rulings: &[&'a Ruling]) -> Vec<Vec<&'a Ruling>> {
        let mut parent: Vec<usize> = (0..rulings.len()).collect();

        fn root(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for i in 0..rulings.len() {
            for j in (i + 1)..rulings.len() {
                if self.touches(rulings[i], rulings[j]) {
                    let (a, b) = (root(&mut parent, i), root(&mut parent, j));
                    if a != b {
                        parent[b] = a;
                    }
                }
            }
        }

        let mut groups: Vec<Vec<&Ruling>> = Vec::new();
        let mut slot_of_root = vec![usize::MAX; rulings.len()];
        for i in 0..rulings.len() {
            let r = root(&mut parent, i);
            if slot_of_root[r] == usize::MAX {
                slot_of_root[r] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot_of_root[r]].push(rulings[i]);
        }
        groups
    }

    fn grid(&self, component: &[&Ruling]) -> Option<Grid> {
        let mut rows = cluster_positions(
            component.iter().filter(|r| r.is_horizontal()).map(|r| r.y0),
            self.line_tolerance,
        );
        let columns = cluster_positions(
            component.iter().filter(|r| r.is_vertical()).map(|r| r.x0),
            self.line_tolerance,
        );
        if rows.len() < 2 || columns.len() < 2 {
            return None;
        }
        rows.reverse();
        Some(Grid { rows, columns })
    }
}

/// Places every chunk lying inside the grid into its cell.
fn fill(grid: &Grid, chunks: &[TextChunk]) -> Vec<Vec<String>> {
    let mut cells: Vec<Vec<Vec<&TextChunk>>> =
        vec![vec![Vec::new(); grid.columns.len() - 1]; grid.rows.len() - 1];

    for chunk in chunks {
        let px = chunk.x + 0.5;
        let py = chunk.y + 0.25 * chunk.font_size;
        let column = grid.columns.windows(2).position(|w| w[0] <= px && px < w[1]);
        let row = grid.rows.windows(2).position(|w| w[0] >= py && py > w[1]);
        if let (Some(row), Some(column)) = (row, column) {
            cells[row][column].push(chunk);
        }
    }

    cells
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect()
}

fn cell_text(mut chunks: Vec<&TextChunk>) -> String {
    chunks.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut text = String::new();
    let mut last_y: Option<f64> = None;
    for chunk in chunks {
        if let Some(y) = last_y {
            text.push(if (y - chunk.y).abs() > 1.0 { '\n' } else { ' ' });
        }
        text.push_str(chunk.text.trim());
        last_y = Some(chunk.y);
    }
    text
}
