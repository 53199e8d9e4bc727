//! Analysis options and configuration.
//!
//! Every threshold here was tuned on scans rendered around 200 DPI. Rasters
//! at other resolutions usually need the pixel-valued fields scaled.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Highest page segmentation mode tesseract accepts.
const MAX_PSM: u8 = 13;

/// Options for analysing page rasters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Ruling-line extraction
    pub line_mask: LineMaskConfig,

    /// Table region filtering
    pub region: RegionConfig,

    /// Grid and span inference
    pub grid: GridConfig,

    /// Paragraph block detection
    pub paragraph: ParagraphConfig,

    /// Text recognition
    pub recognition: RecognitionConfig,

    /// Analyse pages concurrently
    pub parallel: bool,

    /// Which pages to analyse
    #[serde(skip)]
    pub pages: PageSelection,
}

impl AnalysisOptions {
    /// Create new analysis options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Load options from a JSON string. Missing fields keep their defaults.
    pub fn from_json_str(data: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(data)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values that would make a stage meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.line_mask.horizontal_divisor == 0 || self.line_mask.vertical_divisor == 0 {
            return Err(Error::Config("line divisors must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.grid.run_ratio) {
            return Err(Error::Config(format!(
                "grid.run_ratio must be within 0..=1, got {}",
                self.grid.run_ratio
            )));
        }
        if self.recognition.workers == 0 {
            return Err(Error::Config("recognition.workers must be at least 1".into()));
        }
        if self.recognition.psm > MAX_PSM {
            return Err(Error::Config(format!(
                "recognition.psm must be within 0..={}, got {}",
                MAX_PSM, self.recognition.psm
            )));
        }
        Ok(())
    }

    /// Set line mask configuration.
    pub fn with_line_mask(mut self, config: LineMaskConfig) -> Self {
        self.line_mask = config;
        self
    }

    /// Set region configuration.
    pub fn with_region(mut self, config: RegionConfig) -> Self {
        self.region = config;
        self
    }

    /// Set grid configuration.
    pub fn with_grid(mut self, config: GridConfig) -> Self {
        self.grid = config;
        self
    }

    /// Set paragraph configuration.
    pub fn with_paragraph(mut self, config: ParagraphConfig) -> Self {
        self.paragraph = config;
        self
    }

    /// Set recognition configuration.
    pub fn with_recognition(mut self, config: RecognitionConfig) -> Self {
        self.recognition = config;
        self
    }

    /// Select the recognition backend by name.
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.recognition.backend = backend.into();
        self
    }

    /// Set the number of concurrent recognition workers.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.recognition.workers = workers.max(1);
        self
    }

    /// Set the tesseract language pack(s).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.recognition.language = language.into();
        self
    }

    /// Set the tesseract page segmentation mode.
    pub fn with_psm(mut self, psm: u8) -> Self {
        self.recognition.psm = psm;
        self
    }

    /// Enable or disable parallel page processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            line_mask: LineMaskConfig::default(),
            region: RegionConfig::default(),
            grid: GridConfig::default(),
            paragraph: ParagraphConfig::default(),
            recognition: RecognitionConfig::default(),
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Ruling-line mask extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LineMaskConfig {
    /// Gaussian blur sigma applied before binarization (0 = no blur)
    pub blur_sigma: f32,
    /// Horizontal opening kernel length is `image width / horizontal_divisor`
    pub horizontal_divisor: u32,
    /// Vertical opening kernel length is `image height / vertical_divisor`
    pub vertical_divisor: u32,
    /// Square kernel side used to close small gaps in each mask
    pub close_size: u32,
    /// Square kernel side of the final reconnecting dilation
    pub dilate_size: u32,
    /// Minimum stroke length in pixels
    pub min_line_length: u32,
    /// Minimum stroke length as a fraction of its table region's extent
    pub min_line_fraction: f32,
    /// Minimum distinct crossings with the orthogonal mask
    pub min_crossings: usize,
}

impl Default for LineMaskConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            horizontal_divisor: 30,
            vertical_divisor: 30,
            close_size: 3,
            dilate_size: 3,
            min_line_length: 30,
            min_line_fraction: 0.1,
            min_crossings: 2,
        }
    }
}

/// Table region filtering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Minimum table width in pixels
    pub min_width: u32,
    /// Minimum table height in pixels
    pub min_height: u32,
    /// Maximum number of tables kept per page (largest first)
    pub max_tables: usize,
    /// Polygon approximation tolerance as a fraction of contour perimeter
    pub approx_epsilon: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 40,
            max_tables: 5,
            approx_epsilon: 0.02,
        }
    }
}

/// Grid boundary and span inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// A gap taller than this below the last row rule adds an implicit bottom edge
    pub min_row_height: u32,
    /// Half width of the band sampled around a boundary
    pub band_half_width: u32,
    /// Inset from cell corners when sampling a band
    pub band_margin: u32,
    /// Fraction of the band length a run must cover to count as a separator
    pub run_ratio: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_row_height: 10,
            band_half_width: 3,
            band_margin: 5,
            run_ratio: 0.2,
        }
    }
}

/// Paragraph block detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphConfig {
    /// Kernel (width, height) merging characters into lines
    pub line_kernel: (u32, u32),
    /// Kernel (width, height) merging lines into blocks
    pub block_kernel: (u32, u32),
    /// Minimum block width in pixels
    pub min_width: u32,
    /// Minimum block height in pixels
    pub min_height: u32,
    /// Padding added around blocks, also the header/footer margin
    pub margin: u32,
    /// Extra padding around tables when blanking them out
    pub table_padding: u32,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            line_kernel: (40, 3),
            block_kernel: (10, 25),
            min_width: 30,
            min_height: 10,
            margin: 10,
            table_padding: 4,
        }
    }
}

/// Text recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Registered backend name
    pub backend: String,
    /// Concurrent recognition calls per page
    pub workers: usize,
    /// Padding added around cells before cropping
    pub cell_padding: u32,
    /// Normalize recognized text (NFC, whitespace)
    pub normalize_text: bool,
    /// Tesseract language pack(s), e.g. `"eng+deu"`
    pub language: String,
    /// Tesseract page segmentation mode
    pub psm: u8,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            backend: "blank".to_string(),
            workers: 4,
            cell_padding: 2,
            normalize_text: true,
            language: "eng".to_string(),
            psm: 6,
        }
    }
}

/// Page selection.
#[derive(Debug, Clone, Default)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                if start > end {
                    return Err(Error::InvalidPageRange(part.to_string()));
                }
                pages.extend(start..=end);
            } else {
                pages.push(parse_page_number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page_number(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(format!("invalid page number '{}'", s.trim())))
}
