//! Page and document driver.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use image::{DynamicImage, GrayImage};
use rayon::prelude::*;

use super::options::AnalysisOptions;
use super::{grid, line_mask, paragraph, region};
use crate::detect;
use crate::error::{Error, Result};
use crate::model::{BBox, Document, Page};
use crate::recognize::{Dispatcher, Recognizer, RecognizerRegistry};

/// Runs layout detection and recognition over page rasters.
///
/// # Example
///
/// ```no_run
/// use unscan::analysis::{AnalysisOptions, Analyzer};
///
/// fn main() -> unscan::Result<()> {
///     let analyzer = Analyzer::new(AnalysisOptions::new().with_backend("tesseract"))?;
///     let doc = analyzer.analyze_files(&["page-1.png", "page-2.png"])?;
///     println!("{} logical tables", doc.logical_tables().len());
///     Ok(())
/// }
/// ```
pub struct Analyzer {
    options: AnalysisOptions,
    dispatcher: Dispatcher,
}

impl Analyzer {
    /// Create an analyzer bound to the backend named in the options.
    pub fn new(options: AnalysisOptions) -> Result<Self> {
        let registry = RecognizerRegistry::with_config(&options.recognition);
        Self::with_registry(options, &registry)
    }

    /// Create an analyzer resolving its backend from `registry`.
    pub fn with_registry(options: AnalysisOptions, registry: &RecognizerRegistry) -> Result<Self> {
        let recognizer = registry.resolve(&options.recognition.backend)?;
        Self::with_recognizer(options, recognizer)
    }

    /// Create an analyzer bound to a specific backend.
    pub fn with_recognizer(options: AnalysisOptions, recognizer: Arc<dyn Recognizer>) -> Result<Self> {
        options.validate()?;
        let dispatcher = Dispatcher::new(recognizer, &options.recognition)?;
        Ok(Self {
            options,
            dispatcher,
        })
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Name of the bound recognition backend.
    pub fn backend(&self) -> &str {
        self.dispatcher.backend()
    }

    /// Detect tables and paragraphs on a page without recognizing text.
    pub fn detect_layout(&self, gray: &GrayImage, num_page: u32) -> Result<Page> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage(num_page));
        }
        let options = &self.options;

        let masks = line_mask::build(gray, &options.line_mask);
        let candidates = region::locate(&masks.combined(), &options.region);
        let lines = line_mask::filter_regions(&masks, &candidates, &options.line_mask);
        let regions = region::locate(&lines.combined(), &options.region);

        let mut page = Page::new(num_page, width, height);
        for bbox in &regions {
            let local = lines.crop(bbox);
            if let Some(table) =
                grid::reconstruct(bbox, &local.vertical, &local.horizontal, &options.grid, num_page)
            {
                page.add_table(table);
            }
        }

        let exclusions: Vec<BBox> = page.tables.iter().map(|t| t.bbox).collect();
        page.paragraphs =
            paragraph::detect_masked(gray, &exclusions, &regions, &options.paragraph);

        log::debug!(
            "Page {}: {} candidate regions, {} tables, {} paragraphs",
            num_page,
            candidates.len(),
            page.tables.len(),
            page.paragraphs.len()
        );

        Ok(page)
    }

    /// Analyze one page: detect its layout, then recognize every region.
    ///
    /// Detection failures are logged and yield an empty page.
    pub fn analyze_page(&self, gray: &GrayImage, num_page: u32) -> Page {
        let (width, height) = gray.dimensions();

        let detected = panic::catch_unwind(AssertUnwindSafe(|| self.detect_layout(gray, num_page)));
        let mut page = match detected {
            Ok(Ok(page)) => page,
            Ok(Err(e)) => {
                log::error!("Page {}: layout detection failed: {}", num_page, e);
                return Page::new(num_page, width, height);
            }
            Err(_) => {
                log::error!("Page {}: layout detection panicked", num_page);
                return Page::new(num_page, width, height);
            }
        };

        self.dispatcher.recognize_page(&mut page, gray);
        page
    }

    /// Analyze decoded page images. The first image is page 1.
    pub fn analyze_images(&self, images: Vec<DynamicImage>) -> Result<Document> {
        let pages = images
            .into_iter()
            .enumerate()
            .map(|(i, img)| (i as u32 + 1, img))
            .filter(|(n, _)| self.options.pages.includes(*n))
            .map(|(n, img)| (n, img.to_luma8()))
            .collect();

        Ok(self.assemble(pages, Some("memory".to_string())))
    }

    /// Decode and analyze image files, one page per file.
    pub fn analyze_files<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Result<Document> {
        let selected: Vec<(u32, &P)> = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u32 + 1, p))
            .filter(|(n, _)| self.options.pages.includes(*n))
            .collect();

        let pages = self.decode_all(&selected, |path| detect::decode_file(path))?;
        let source = paths
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(self.assemble(pages, Some(source)))
    }

    /// Decode and analyze in-memory images, one page per buffer.
    pub fn analyze_bytes(&self, inputs: &[&[u8]]) -> Result<Document> {
        let selected: Vec<(u32, &&[u8])> = inputs
            .iter()
            .enumerate()
            .map(|(i, data)| (i as u32 + 1, data))
            .filter(|(n, _)| self.options.pages.includes(*n))
            .collect();

        let pages = self.decode_all(&selected, |data| detect::decode_bytes(data))?;
        Ok(self.assemble(pages, Some("memory".to_string())))
    }

    fn decode_all<T, F>(&self, inputs: &[(u32, T)], decode: F) -> Result<Vec<(u32, GrayImage)>>
    where
        T: Sync,
        F: Fn(&T) -> Result<DynamicImage> + Sync,
    {
        let decode_one = |(n, input): &(u32, T)| -> Result<(u32, GrayImage)> {
            let img = decode(input)?;
            Ok((*n, img.to_luma8()))
        };

        if self.options.parallel {
            inputs.par_iter().map(decode_one).collect()
        } else {
            inputs.iter().map(decode_one).collect()
        }
    }

    fn assemble(&self, pages: Vec<(u32, GrayImage)>, source: Option<String>) -> Document {
        let analyzed: Vec<Page> = if self.options.parallel {
            pages
                .par_iter()
                .map(|(n, gray)| self.analyze_page(gray, *n))
                .collect()
        } else {
            pages
                .iter()
                .map(|(n, gray)| self.analyze_page(gray, *n))
                .collect()
        };

        let mut doc = Document::new();
        doc.metadata.source = source;
        doc.metadata.backend = Some(self.backend().to_string());
        doc.metadata.analyzed_at = Some(Utc::now());
        for page in analyzed {
            doc.add_page(page);
        }

        log::debug!(
            "Analyzed {} pages: {} tables, {} paragraphs",
            doc.page_count(),
            doc.pages.iter().map(|p| p.tables.len()).sum::<usize>(),
            doc.pages.iter().map(|p| p.paragraphs.len()).sum::<usize>()
        );

        doc
    }
}
