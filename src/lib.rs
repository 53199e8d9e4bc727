//! # unscan
//!
//! Table and paragraph layout recovery for scanned document pages.
//!
//! This library takes page rasters (scans rendered to PNG, JPEG, TIFF or
//! BMP) and recovers their layout: ruled tables with merged cells, and the
//! text blocks around them classified as header, footer or body. Every
//! region is then handed to a pluggable OCR backend.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unscan::{analyze_files, render};
//!
//! fn main() -> unscan::Result<()> {
//!     let doc = analyze_files(&["scan-1.png", "scan-2.png"])?;
//!
//!     // Tables continued across pages are merged into one
//!     for table in doc.logical_tables() {
//!         println!("{}", render::table_to_html(&table));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ruled tables**: grid reconstruction with colspan/rowspan inference
//! - **Paragraphs**: text blocks classified against the page's tables
//! - **Pluggable OCR**: `tesseract` CLI backend, or your own [`Recognizer`]
//! - **Failure isolation**: one bad region or page never aborts a document
//! - **Parallel processing**: Uses Rayon for pages and recognition calls

pub mod analysis;
pub mod detect;
pub mod error;
pub mod model;
pub mod recognize;
pub mod render;

// Re-export commonly used types
pub use analysis::{AnalysisOptions, Analyzer, PageSelection};
pub use detect::{detect_format_from_bytes, detect_format_from_path, RasterFormat};
pub use error::{Error, Result};
pub use model::{BBox, Cell, Document, Metadata, Page, Paragraph, ParagraphType, Table};
pub use recognize::{LocalBox, Recognition, Recognizer, RecognizerRegistry};
pub use render::JsonFormat;

use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;

/// Analyze a single page image file with default options.
///
/// Layout only: the default backend recognizes no text.
///
/// # Example
///
/// ```no_run
/// use unscan::analyze_file;
///
/// let doc = analyze_file("scan.png").unwrap();
/// println!("Tables: {}", doc.pages[0].tables.len());
/// ```
pub fn analyze_file<P: AsRef<Path> + Sync>(path: P) -> Result<Document> {
    analyze_files(&[path])
}

/// Analyze page image files with default options, one page per file.
pub fn analyze_files<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<Document> {
    Analyzer::new(AnalysisOptions::default())?.analyze_files(paths)
}

/// Analyze page images held in memory with default options.
///
/// # Example
///
/// ```no_run
/// use unscan::analyze_bytes;
///
/// let data = std::fs::read("scan.png").unwrap();
/// let doc = analyze_bytes(&[data.as_slice()]).unwrap();
/// ```
pub fn analyze_bytes(inputs: &[&[u8]]) -> Result<Document> {
    Analyzer::new(AnalysisOptions::default())?.analyze_bytes(inputs)
}

/// Analyze one decoded image as page 1 with the given options.
pub fn analyze_image(image: DynamicImage, options: AnalysisOptions) -> Result<Document> {
    Analyzer::new(options)?.analyze_images(vec![image])
}

/// Extract plain text from page image files using the `tesseract` backend.
pub fn extract_text<P: AsRef<Path> + Sync>(paths: &[P]) -> Result<String> {
    let analyzer = Analyzer::new(AnalysisOptions::new().with_backend("tesseract"))?;
    render::to_text(&analyzer.analyze_files(paths)?)
}

/// Builder for analysing scanned pages.
///
/// # Example
///
/// ```no_run
/// use unscan::Unscan;
///
/// let html = Unscan::new()
///     .with_backend("tesseract")
///     .with_workers(8)
///     .analyze(&["scan-1.png", "scan-2.png"])?
///     .to_html();
/// # Ok::<(), unscan::Error>(())
/// ```
pub struct Unscan {
    options: AnalysisOptions,
    recognizer: Option<Arc<dyn Recognizer>>,
}

impl Unscan {
    /// Create a new Unscan builder.
    pub fn new() -> Self {
        Self {
            options: AnalysisOptions::default(),
            recognizer: None,
        }
    }

    /// Replace all analysis options.
    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    /// Select a registered backend by name.
    pub fn with_backend(mut self, name: impl Into<String>) -> Self {
        self.options = self.options.with_backend(name);
        self
    }

    /// Bind a custom recognizer instead of a registered backend.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Set the number of concurrent recognition workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.options = self.options.with_workers(workers);
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Build the configured analyzer.
    pub fn build(self) -> Result<Analyzer> {
        match self.recognizer {
            Some(recognizer) => Analyzer::with_recognizer(self.options, recognizer),
            None => Analyzer::new(self.options),
        }
    }

    /// Analyze page image files, one page per file.
    pub fn analyze<P: AsRef<Path> + Sync>(self, paths: &[P]) -> Result<UnscanResult> {
        let document = self.build()?.analyze_files(paths)?;
        Ok(UnscanResult { document })
    }

    /// Analyze page images held in memory.
    pub fn analyze_bytes(self, inputs: &[&[u8]]) -> Result<UnscanResult> {
        let document = self.build()?.analyze_bytes(inputs)?;
        Ok(UnscanResult { document })
    }

    /// Analyze decoded images.
    pub fn analyze_images(self, images: Vec<DynamicImage>) -> Result<UnscanResult> {
        let document = self.build()?.analyze_images(images)?;
        Ok(UnscanResult { document })
    }
}

impl Default for Unscan {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of analysing a set of pages.
pub struct UnscanResult {
    /// The analysed document
    pub document: Document,
}

impl UnscanResult {
    /// Tables merged across pages.
    pub fn logical_tables(&self) -> Vec<Table> {
        self.document.logical_tables()
    }

    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Render the logical tables as HTML.
    pub fn to_html(&self) -> String {
        render::tables_to_html(&self.logical_tables())
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
