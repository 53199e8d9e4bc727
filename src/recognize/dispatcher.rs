//! Concurrent recognition of every region on a page.
//!
//! Each region is cropped and recognized on a bounded worker pool. Tasks
//! only read the page raster and report `(RegionId, outcome)` over a
//! channel; the page itself is updated afterwards in a single pass. A
//! failing or panicking backend call empties the text of its own region
//! and nothing else.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use image::GrayImage;

use super::{Recognition, Recognizer, TextNormalizer};
use crate::analysis::morphology;
use crate::analysis::RecognitionConfig;
use crate::error::{Error, Result};
use crate::model::{BBox, Page};

/// Identifies a region of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
    /// Index into `Page::paragraphs`
    Paragraph(usize),
    /// Indices into `Page::tables` and that table's `cells`
    Cell { table: usize, cell: usize },
}

/// Drives a recognizer over all regions of a page.
pub struct Dispatcher {
    recognizer: Arc<dyn Recognizer>,
    pool: rayon::ThreadPool,
    cell_padding: u32,
    normalizer: Option<TextNormalizer>,
}

impl Dispatcher {
    /// Create a dispatcher with `config.workers` worker threads.
    pub fn new(recognizer: Arc<dyn Recognizer>, config: &RecognitionConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("unscan-ocr-{}", i))
            .build()
            .map_err(|e| Error::Other(format!("cannot start recognition workers: {}", e)))?;

        let normalizer = if config.normalize_text {
            Some(TextNormalizer::new()?)
        } else {
            None
        };

        Ok(Self {
            recognizer,
            pool,
            cell_padding: config.cell_padding,
            normalizer,
        })
    }

    /// Name of the bound backend.
    pub fn backend(&self) -> &str {
        self.recognizer.name()
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Crop boxes of every region on `page`, clamped to the raster.
    ///
    /// Cells are padded by the configured cell padding first. Regions whose
    /// crop has no area are left out.
    pub fn regions(&self, page: &Page) -> Vec<(RegionId, BBox)> {
        let (width, height) = page.dimensions();

        let paragraphs = page
            .paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| (RegionId::Paragraph(i), p.bbox.clamp(width, height)));

        let cells = page.tables.iter().enumerate().flat_map(|(t, table)| {
            table.cells.iter().enumerate().map(move |(c, cell)| {
                let crop = cell.bbox.pad(self.cell_padding as i32).clamp(width, height);
                (RegionId::Cell { table: t, cell: c }, crop)
            })
        });

        paragraphs
            .chain(cells)
            .filter(|(_, crop)| !crop.is_empty())
            .collect()
    }

    /// Recognize every region of `page` from `gray` and store text and blobs.
    pub fn recognize_page(&self, page: &mut Page, gray: &GrayImage) {
        let jobs = self.regions(page);
        if jobs.is_empty() {
            return;
        }

        let (tx, rx) = crossbeam_channel::unbounded();
        self.pool.scope(|scope| {
            for &(id, crop_box) in &jobs {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let crop = morphology::crop(gray, &crop_box);
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| self.recognizer.recognize(&crop)))
                            .unwrap_or_else(|_| {
                                Err(Error::Recognition("backend panicked".to_string()))
                            });
                    // The receiver outlives the scope.
                    let _ = tx.send((id, outcome));
                });
            }
        });
        drop(tx);

        let mut results: HashMap<RegionId, Result<Recognition>> = rx.iter().collect();

        let total = jobs.len();
        let mut failed = 0;
        for (id, crop_box) in jobs {
            let recognition = match results.remove(&id) {
                Some(Ok(recognition)) => recognition,
                Some(Err(e)) => {
                    log::warn!(
                        "Recognition failed for {:?} on page {}: {}",
                        id,
                        page.num_page,
                        e
                    );
                    failed += 1;
                    continue;
                }
                None => continue,
            };
            self.apply(page, id, &crop_box, recognition);
        }

        log::debug!(
            "Page {}: recognized {} regions with {} ({} failed)",
            page.num_page,
            total,
            self.backend(),
            failed
        );
    }

    fn apply(&self, page: &mut Page, id: RegionId, crop: &BBox, recognition: Recognition) {
        let text = match &self.normalizer {
            Some(normalizer) => normalizer.normalize(&recognition.text),
            None => recognition.text,
        };
        let blobs: Vec<BBox> = recognition
            .boxes
            .iter()
            .map(|b| b.to_page(crop.x1, crop.y1))
            .collect();

        match id {
            RegionId::Paragraph(i) => {
                if let Some(paragraph) = page.paragraphs.get_mut(i) {
                    paragraph.text = text;
                    paragraph.blobs = blobs;
                }
            }
            RegionId::Cell { table, cell } => {
                if let Some(cell) = page
                    .tables
                    .get_mut(table)
                    .and_then(|t| t.cells.get_mut(cell))
                {
                    cell.text = text;
                    cell.blobs = blobs;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Paragraph, ParagraphType, Table};
    use crate::recognize::{BlankRecognizer, LocalBox};
    use image::Luma;

    /// Reports the crop size, fails on crops exactly `fail_width` wide.
    struct Measure {
        fail_width: u32,
        panic_width: u32,
    }

    impl Recognizer for Measure {
        fn name(&self) -> &str {
            "measure"
        }

        fn recognize(&self, image: &GrayImage) -> Result<Recognition> {
            if image.width() == self.fail_width {
                return Err(Error::Recognition("unreadable".into()));
            }
            if image.width() == self.panic_width {
                panic!("backend crashed");
            }
            Ok(Recognition::new(format!("{}x{}", image.width(), image.height()))
                .with_box(LocalBox::new(1, 1, 2, 2)))
        }
    }

    fn page() -> Page {
        let mut page = Page::new(1, 400, 300);
        let cells = vec![
            Cell::new(BBox::new(10, 100, 60, 130), 0, 0, 1),
            Cell::new(BBox::new(60, 100, 130, 130), 0, 1, 1),
            Cell::new(BBox::new(130, 100, 220, 130), 0, 2, 1),
            Cell::new(BBox::new(220, 100, 320, 130), 0, 3, 1),
        ];
        page.add_table(Table::with_cells(BBox::new(10, 100, 320, 130), 1, cells));
        page.add_paragraph(Paragraph::new(BBox::new(10, 10, 210, 40), ParagraphType::Header));
        page
    }

    fn config(workers: usize) -> RecognitionConfig {
        RecognitionConfig {
            workers,
            cell_padding: 2,
            normalize_text: false,
            ..RecognitionConfig::default()
        }
    }

    #[test]
    fn test_failure_isolated_to_region() {
        let recognizer = Arc::new(Measure {
            fail_width: 74,
            panic_width: 0,
        });
        let dispatcher = Dispatcher::new(recognizer, &config(3)).unwrap();
        let gray = GrayImage::from_pixel(400, 300, Luma([255]));

        let mut page = page();
        dispatcher.recognize_page(&mut page, &gray);

        let texts: Vec<&str> = page.tables[0].cells.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["54x34", "", "94x34", "104x34"]);
        assert!(page.tables[0].cells[1].blobs.is_empty());
        assert_eq!(page.paragraphs[0].text, "200x30");
    }

    #[test]
    fn test_panic_isolated_to_region() {
        let recognizer = Arc::new(Measure {
            fail_width: 0,
            panic_width: 94,
        });
        let dispatcher = Dispatcher::new(recognizer, &config(2)).unwrap();
        let gray = GrayImage::from_pixel(400, 300, Luma([255]));

        let mut page = page();
        dispatcher.recognize_page(&mut page, &gray);

        assert_eq!(page.tables[0].cells[2].text, "");
        assert_eq!(page.tables[0].cells[3].text, "104x34");
        assert_eq!(page.paragraphs[0].text, "200x30");
    }

    #[test]
    fn test_blobs_translated_to_page() {
        let recognizer = Arc::new(Measure {
            fail_width: 0,
            panic_width: 0,
        });
        let dispatcher = Dispatcher::new(recognizer, &config(1)).unwrap();
        let gray = GrayImage::from_pixel(400, 300, Luma([255]));

        let mut page = page();
        dispatcher.recognize_page(&mut page, &gray);

        // Cell (10,100)-(60,130) padded by 2 crops from (8, 98).
        assert_eq!(page.tables[0].cells[0].blobs, vec![BBox::new(9, 99, 11, 101)]);
        assert_eq!(page.paragraphs[0].blobs, vec![BBox::new(11, 11, 13, 13)]);
    }

    #[test]
    fn test_pool_size_follows_config() {
        let dispatcher = Dispatcher::new(Arc::new(BlankRecognizer), &config(3)).unwrap();
        assert_eq!(dispatcher.workers(), 3);
        assert_eq!(dispatcher.backend(), "blank");
    }

    #[test]
    fn test_regions_clamped_and_skip_empty() {
        let dispatcher = Dispatcher::new(Arc::new(BlankRecognizer), &config(1)).unwrap();
        let mut page = Page::new(1, 100, 100);
        let cells = vec![
            Cell::new(BBox::new(0, 0, 50, 50), 0, 0, 1),
            Cell::new(BBox::new(150, 150, 160, 160), 0, 1, 1),
        ];
        page.add_table(Table::with_cells(BBox::new(0, 0, 160, 160), 1, cells));

        let regions = dispatcher.regions(&page);
        assert_eq!(regions, vec![(RegionId::Cell { table: 0, cell: 0 }, BBox::new(0, 0, 52, 52))]);
    }
}
