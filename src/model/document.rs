//! Document-level types and cross-page table merging.

use super::{BBox, Cell, Page, Paragraph, Table};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An analysed multi-page document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Analysis metadata
    pub metadata: Metadata,

    /// Pages in the document, in page order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, num_page: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.num_page == num_page)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
        self.metadata.page_count = self.page_count();
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Merge physical table fragments into logical tables.
    ///
    /// Walks every page's tables and paragraphs in `(page, top_y)` order.
    /// Body paragraphs end the current table; header and footer paragraphs
    /// are transparent. A fragment continues the current table only when it
    /// sits on a later page than the previous fragment and has the same
    /// column count; its rows are shifted below the rows accumulated so far.
    /// Pages are not modified.
    pub fn logical_tables(&self) -> Vec<Table> {
        let mut elements: Vec<(u32, i32, Element<'_>)> = Vec::new();
        for page in &self.pages {
            elements.extend(
                page.tables
                    .iter()
                    .map(|t| (page.num_page, t.bbox.y1, Element::Table(t))),
            );
            elements.extend(
                page.paragraphs
                    .iter()
                    .map(|p| (page.num_page, p.bbox.y1, Element::Paragraph(p))),
            );
        }
        // Stable sort: on equal keys tables stay ahead of paragraphs.
        elements.sort_by_key(|(page, top, element)| (*page, *top, element.rank()));

        let mut tables = Vec::new();
        let mut current: Option<Accumulator> = None;

        for (page_num, _, element) in elements {
            match element {
                Element::Paragraph(p) => {
                    if p.is_body() {
                        flush(&mut current, &mut tables);
                    }
                }
                Element::Table(fragment) => {
                    let continues = current.as_ref().is_some_and(|acc| {
                        page_num > acc.last_page && fragment.column_count() == acc.columns
                    });

                    if continues {
                        if let Some(acc) = current.as_mut() {
                            acc.append(fragment, page_num);
                        }
                    } else {
                        flush(&mut current, &mut tables);
                        current = Some(Accumulator::start(fragment, page_num));
                    }
                }
            }
        }
        flush(&mut current, &mut tables);

        log::debug!(
            "Merged {} table fragments into {} logical tables",
            self.pages.iter().map(|p| p.tables.len()).sum::<usize>(),
            tables.len()
        );

        tables
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Analysis metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Source description (file names, or "memory")
    pub source: Option<String>,

    /// Recognition backend bound during analysis
    pub backend: Option<String>,

    /// When the analysis ran
    pub analyzed_at: Option<DateTime<Utc>>,

    /// Total number of pages
    pub page_count: u32,
}

enum Element<'a> {
    Table(&'a Table),
    Paragraph(&'a Paragraph),
}

impl Element<'_> {
    fn rank(&self) -> u8 {
        match self {
            Element::Table(_) => 0,
            Element::Paragraph(_) => 1,
        }
    }
}

/// Cells of the logical table being built.
struct Accumulator {
    bbox: BBox,
    start_page: u32,
    last_page: u32,
    columns: usize,
    row_offset: usize,
    cells: Vec<Cell>,
}

impl Accumulator {
    fn start(fragment: &Table, page_num: u32) -> Self {
        let mut acc = Self {
            bbox: fragment.bbox,
            start_page: page_num,
            last_page: page_num,
            columns: fragment.column_count(),
            row_offset: 0,
            cells: Vec::with_capacity(fragment.cells.len()),
        };
        acc.append(fragment, page_num);
        acc
    }

    fn append(&mut self, fragment: &Table, page_num: u32) {
        self.cells.extend(fragment.cells.iter().map(|cell| Cell {
            row: cell.row + self.row_offset,
            original_page_num: page_num,
            ..cell.clone()
        }));
        self.row_offset += fragment.row_count();
        self.last_page = page_num;
    }
}

fn flush(current: &mut Option<Accumulator>, tables: &mut Vec<Table>) {
    if let Some(acc) = current.take() {
        if !acc.cells.is_empty() {
            tables.push(Table::with_cells(acc.bbox, acc.start_page, acc.cells));
        }
    }
}
