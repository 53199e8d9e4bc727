//! Page-level types.

use super::{Paragraph, Table};
use serde::{Deserialize, Serialize};

/// A single analysed page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub num_page: u32,

    /// Raster width in pixels
    pub width: u32,

    /// Raster height in pixels
    pub height: u32,

    /// Tables in reading order (top to bottom)
    pub tables: Vec<Table>,

    /// Paragraphs in reading order (top to bottom)
    pub paragraphs: Vec<Paragraph>,
}

impl Page {
    /// Create a new page with the given raster dimensions.
    pub fn new(num_page: u32, width: u32, height: u32) -> Self {
        Self {
            num_page,
            width,
            height,
            tables: Vec::new(),
            paragraphs: Vec::new(),
        }
    }

    /// Add a table to the page.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Add a paragraph to the page.
    pub fn add_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.push(paragraph);
    }

    /// Check if the page has no tables and no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.paragraphs.is_empty()
    }

    /// Total number of cells over all tables on the page.
    pub fn cell_count(&self) -> usize {
        self.tables.iter().map(|t| t.cells.len()).sum()
    }

    /// Get plain text content of the page, blocks ordered by their top edge.
    pub fn plain_text(&self) -> String {
        let mut blocks: Vec<(i32, String)> = self
            .tables
            .iter()
            .map(|t| (t.bbox.y1, t.plain_text()))
            .chain(self.paragraphs.iter().map(|p| (p.bbox.y1, p.text.clone())))
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();
        blocks.sort_by_key(|(y, _)| *y);

        blocks
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
