//! Integration tests for page analysis on synthetic scans.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{DynamicImage, GrayImage};
use unscan::{
    AnalysisOptions, Analyzer, Error, LocalBox, ParagraphType, Recognition, Recognizer, Table,
};

use common::{report_page, Grid};

/// Counts calls and answers every crop with the same word.
struct Echo {
    calls: AtomicUsize,
}

impl Echo {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl Recognizer for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn recognize(&self, _image: &GrayImage) -> unscan::Result<Recognition> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Recognition::new("  word\n\n").with_box(LocalBox::new(1, 2, 3, 4)))
    }
}

/// Fails on crops wider than `limit`.
struct Narrow {
    limit: u32,
}

impl Recognizer for Narrow {
    fn name(&self) -> &str {
        "narrow"
    }

    fn recognize(&self, image: &GrayImage) -> unscan::Result<Recognition> {
        if image.width() > self.limit {
            return Err(Error::Recognition(format!("{} px is too wide", image.width())));
        }
        Ok(Recognition::new("ok"))
    }
}

/// 3 columns x 3 rows; the middle rule is missing from the first row.
fn merged_header_grid() -> Grid {
    Grid::new(&[100, 300, 500, 700], &[200, 260, 330, 400]).without_vertical(1, 0)
}

fn analyze(recognizer: Arc<dyn Recognizer>, page: GrayImage) -> unscan::Document {
    let analyzer = Analyzer::with_recognizer(AnalysisOptions::new(), recognizer).unwrap();
    analyzer
        .analyze_images(vec![DynamicImage::ImageLuma8(page)])
        .unwrap()
}

fn near(actual: i32, expected: i32) -> bool {
    (actual - expected).abs() <= 4
}

fn assert_tiles(table: &Table) {
    for row in 0..table.row_count() {
        for col in 0..table.column_count() {
            let covering = table.cells.iter().filter(|c| c.covers(row, col)).count();
            assert_eq!(covering, 1, "slot ({}, {}) covered {} times", row, col, covering);
        }
    }
}

#[test]
fn test_table_with_merged_header() {
    let doc = analyze(Arc::new(Echo::new()), report_page(&merged_header_grid()));
    let page = &doc.pages[0];

    assert_eq!(page.tables.len(), 1);
    let table = &page.tables[0];
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_count(), 3);
    assert_eq!(table.cells.len(), 8);
    assert_tiles(table);

    let header = table.cell_at(0, 0).unwrap();
    assert_eq!((header.row, header.col), (0, 0));
    assert_eq!(header.colspan, 2);
    assert_eq!(header.rowspan, 1);
    assert!(table.cell_at(0, 1).unwrap().is_merged());
    assert!(!table.cell_at(0, 2).unwrap().is_merged());

    assert!(near(table.bbox.x1, 101));
    assert!(near(table.bbox.y1, 201));
    assert!(near(table.bbox.x2, 701));
    assert!(near(table.bbox.y2, 401));
    assert_eq!(table.start_page_num, 1);
}

#[test]
fn test_cells_are_row_major() {
    let doc = analyze(Arc::new(Echo::new()), report_page(&merged_header_grid()));
    let slots: Vec<(usize, usize)> = doc.pages[0].tables[0]
        .cells
        .iter()
        .map(|c| (c.row, c.col))
        .collect();

    assert_eq!(
        slots,
        vec![(0, 0), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0), (2, 1), (2, 2)]
    );
}

#[test]
fn test_header_and_footer_around_table() {
    let doc = analyze(Arc::new(Echo::new()), report_page(&merged_header_grid()));
    let page = &doc.pages[0];

    let types: Vec<ParagraphType> = page.paragraphs.iter().map(|p| p.paragraph_type).collect();
    assert_eq!(types, vec![ParagraphType::Header, ParagraphType::Footer]);

    let table = &page.tables[0].bbox;
    for paragraph in &page.paragraphs {
        assert!(!paragraph.bbox.intersects(table));
    }
}

#[test]
fn test_every_region_recognized() {
    let echo = Arc::new(Echo::new());
    let doc = analyze(echo.clone(), report_page(&merged_header_grid()));
    let page = &doc.pages[0];

    assert_eq!(echo.calls.load(Ordering::SeqCst), 8 + 2);
    assert!(page.tables[0].cells.iter().all(|c| c.text == "word"));
    assert!(page.paragraphs.iter().all(|p| p.text == "word"));
}

#[test]
fn test_blobs_in_page_coordinates() {
    let doc = analyze(Arc::new(Echo::new()), report_page(&merged_header_grid()));
    let page = &doc.pages[0];

    for cell in &page.tables[0].cells {
        assert_eq!(cell.blobs.len(), 1);
        let blob = cell.blobs[0];
        // Cells are cropped with 2 px of padding.
        assert_eq!(blob.x1, cell.bbox.x1 - 2 + 1);
        assert_eq!(blob.y1, cell.bbox.y1 - 2 + 2);
        assert_eq!((blob.width(), blob.height()), (3, 4));
    }
    for paragraph in &page.paragraphs {
        let blob = paragraph.blobs[0];
        assert_eq!(blob.x1, paragraph.bbox.x1 + 1);
        assert_eq!(blob.y1, paragraph.bbox.y1 + 2);
    }
}

#[test]
fn test_recognition_failure_is_isolated() {
    // Only the merged header cell is wider than 300 px.
    let doc = analyze(Arc::new(Narrow { limit: 300 }), report_page(&merged_header_grid()));
    let page = &doc.pages[0];
    let table = &page.tables[0];

    assert!(table.cell_at(0, 0).unwrap().text.is_empty());
    assert!(table.cell_at(0, 0).unwrap().blobs.is_empty());
    let others: Vec<&str> = table
        .cells
        .iter()
        .filter(|c| !c.is_merged())
        .map(|c| c.text.as_str())
        .collect();
    assert_eq!(others.len(), 7);
    assert!(others.iter().all(|t| *t == "ok"));
    assert!(page.paragraphs.iter().all(|p| p.text == "ok"));
}

#[test]
fn test_layout_is_deterministic() {
    let page = report_page(&merged_header_grid());
    let first = analyze(Arc::new(Echo::new()), page.clone());
    let second = analyze(Arc::new(Echo::new()), page);

    assert_eq!(first.pages, second.pages);
}

#[test]
fn test_page_without_rules_has_only_body_text() {
    let mut page = common::blank_page();
    common::text_block(&mut page, 100, 100, 4);

    let doc = analyze(Arc::new(Echo::new()), page);
    let page = &doc.pages[0];
    assert!(page.tables.is_empty());
    assert_eq!(page.paragraphs.len(), 1);
    assert_eq!(page.paragraphs[0].paragraph_type, ParagraphType::Body);
}
