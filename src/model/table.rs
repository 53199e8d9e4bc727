//! Table types.

use super::BBox;
use serde::{Deserialize, Serialize};

/// A table recovered from ruling lines, or a logical table merged from
/// fragments on several pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Extent of the table on its first page
    pub bbox: BBox,

    /// Cells in row-major order of their top-left grid slot
    pub cells: Vec<Cell>,

    /// Page (1-indexed) of the first fragment that contributed to this table
    pub start_page_num: u32,
}

impl Table {
    /// Create a new empty table.
    pub fn new(bbox: BBox, start_page_num: u32) -> Self {
        Self {
            bbox,
            cells: Vec::new(),
            start_page_num,
        }
    }

    /// Create a table with cells.
    pub fn with_cells(bbox: BBox, start_page_num: u32, cells: Vec<Cell>) -> Self {
        Self {
            bbox,
            cells,
            start_page_num,
        }
    }

    /// Add a cell to the table.
    pub fn add_cell(&mut self, cell: Cell) {
        self.cells.push(cell);
    }

    /// Get the number of grid rows (`max(row + rowspan)`).
    pub fn row_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.row + c.rowspan)
            .max()
            .unwrap_or(0)
    }

    /// Get the number of grid columns (`max(col + colspan)`).
    pub fn column_count(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.col + c.colspan)
            .max()
            .unwrap_or(0)
    }

    /// Check if the table has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.cells.iter().any(Cell::is_merged)
    }

    /// Find the cell covering grid slot `(row, col)`.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.iter().find(|c| c.covers(row, col))
    }

    /// Cells whose top-left slot is in grid row `row`, ordered by column.
    pub fn row_cells(&self, row: usize) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.iter().filter(|c| c.row == row).collect();
        cells.sort_by_key(|c| c.col);
        cells
    }

    /// Get plain text representation of the table.
    ///
    /// One line per grid row, cells separated by tabs.
    pub fn plain_text(&self) -> String {
        (0..self.row_count())
            .map(|row| {
                self.row_cells(row)
                    .iter()
                    .map(|c| c.text.trim())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A table cell, possibly spanning several grid slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell extent in page pixels
    pub bbox: BBox,

    /// Grid row of the top-left slot (0-based)
    pub row: usize,

    /// Grid column of the top-left slot (0-based)
    pub col: usize,

    /// Number of columns this cell spans
    pub colspan: usize,

    /// Number of rows this cell spans
    pub rowspan: usize,

    /// Recognized text (empty until recognition runs)
    pub text: String,

    /// Recognized sub-elements (words, lines) in page pixels
    pub blobs: Vec<BBox>,

    /// Page the cell was detected on
    pub original_page_num: u32,
}

impl Cell {
    /// Create a single-slot cell.
    pub fn new(bbox: BBox, row: usize, col: usize, page_num: u32) -> Self {
        Self {
            bbox,
            row,
            col,
            colspan: 1,
            rowspan: 1,
            text: String::new(),
            blobs: Vec::new(),
            original_page_num: page_num,
        }
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: usize) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: usize) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }

    /// Check if grid slot `(row, col)` falls inside this cell.
    pub fn covers(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.rowspan).contains(&row)
            && (self.col..self.col + self.colspan).contains(&col)
    }

    /// Check if the cell has no recognized text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
