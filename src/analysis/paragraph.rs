//! Paragraph block detection and header/footer classification.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use super::morphology;
use super::options::ParagraphConfig;
use super::region::bounding_box;
use crate::model::{BBox, Paragraph, ParagraphType};

/// Background value used to blank out tables.
const PAPER: u8 = 255;

/// Find text blocks on a page outside of `tables`.
///
/// Paragraphs come back sorted top to bottom, with their type assigned
/// relative to the topmost and bottommost table.
pub fn detect(gray: &GrayImage, tables: &[BBox], config: &ParagraphConfig) -> Vec<Paragraph> {
    detect_masked(gray, tables, &[], config)
}

/// Like [`detect`], also blanking `masked` boxes (e.g. table regions that
/// produced no grid). Only `tables` take part in classification.
pub fn detect_masked(
    gray: &GrayImage,
    tables: &[BBox],
    masked: &[BBox],
    config: &ParagraphConfig,
) -> Vec<Paragraph> {
    let (width, height) = gray.dimensions();

    let mut working = gray.clone();
    for table in tables.iter().chain(masked) {
        morphology::fill(&mut working, &table.pad(config.table_padding as i32), PAPER);
    }

    let binary = morphology::binarize_inv(&working);
    let (lw, lh) = config.line_kernel;
    let (bw, bh) = config.block_kernel;
    let blocks = morphology::close(&morphology::close(&binary, lw, lh), bw, bh);

    let candidates = find_contours::<i32>(&blocks)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| bounding_box(&c.points))
        .filter(|b| b.width() >= config.min_width as i32 && b.height() >= config.min_height as i32)
        .map(|b| b.pad(config.margin as i32).clamp(width, height));

    let mut paragraphs: Vec<Paragraph> = keep_maximal(candidates)
        .into_iter()
        .map(|bbox| Paragraph::new(bbox, classify(&bbox, tables, config.margin as i32)))
        .collect();
    paragraphs.sort_by_key(|p| (p.bbox.y1, p.bbox.x1));

    log::debug!(
        "Detected {} paragraphs ({} header, {} footer)",
        paragraphs.len(),
        paragraphs.iter().filter(|p| p.is_header()).count(),
        paragraphs.iter().filter(|p| p.is_footer()).count()
    );

    paragraphs
}

/// Drop boxes contained in another box, keeping the larger one.
pub fn keep_maximal<I: IntoIterator<Item = BBox>>(boxes: I) -> Vec<BBox> {
    let mut accepted: Vec<BBox> = Vec::new();
    for bbox in boxes {
        if bbox.is_empty() || accepted.iter().any(|a| a.contains(&bbox)) {
            continue;
        }
        accepted.retain(|a| !bbox.contains(a));
        accepted.push(bbox);
    }
    accepted
}

/// Classify a block against the vertical extent of the page's tables.
pub fn classify(bbox: &BBox, tables: &[BBox], margin: i32) -> ParagraphType {
    let top = tables.iter().map(|t| t.y1).min();
    let bottom = tables.iter().map(|t| t.y2).max();

    match (top, bottom) {
        (Some(top), _) if bbox.y2 <= top - margin => ParagraphType::Header,
        (_, Some(bottom)) if bbox.y1 >= bottom + margin => ParagraphType::Footer,
        _ => ParagraphType::Body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    /// Draws a block of `lines` fake text lines.
    fn text_block(page: &mut GrayImage, x: i32, y: i32, lines: u32) {
        for i in 0..lines {
            for word in 0..6 {
                let rect = Rect::at(x + word * 45, y + i as i32 * 16).of_size(38, 9);
                draw_filled_rect_mut(page, rect, Luma([0]));
            }
        }
    }

    #[test]
    fn test_classify_against_table_extent() {
        let tables = [BBox::new(50, 200, 550, 400), BBox::new(50, 500, 550, 600)];

        assert_eq!(classify(&BBox::new(0, 20, 100, 180), &tables, 10), ParagraphType::Header);
        assert_eq!(classify(&BBox::new(0, 20, 100, 195), &tables, 10), ParagraphType::Body);
        assert_eq!(classify(&BBox::new(0, 620, 100, 700), &tables, 10), ParagraphType::Footer);
        assert_eq!(classify(&BBox::new(0, 420, 100, 480), &tables, 10), ParagraphType::Body);
        assert_eq!(classify(&BBox::new(0, 350, 100, 450), &tables, 10), ParagraphType::Body);
    }

    #[test]
    fn test_classify_without_tables_is_body() {
        assert_eq!(classify(&BBox::new(0, 0, 10, 10), &[], 10), ParagraphType::Body);
    }

    #[test]
    fn test_keep_maximal() {
        let boxes = [
            BBox::new(10, 10, 50, 50),
            BBox::new(0, 0, 100, 100),
            BBox::new(20, 20, 30, 30),
            BBox::new(200, 0, 300, 50),
        ];
        assert_eq!(
            keep_maximal(boxes),
            vec![BBox::new(0, 0, 100, 100), BBox::new(200, 0, 300, 50)]
        );
    }

    #[test]
    fn test_detect_blocks_around_table() {
        let mut page = GrayImage::from_pixel(600, 800, Luma([255]));
        text_block(&mut page, 40, 40, 3);
        text_block(&mut page, 40, 650, 2);

        let table = BBox::new(30, 200, 570, 500);
        // Ink inside the table must not turn into a paragraph.
        draw_filled_rect_mut(&mut page, Rect::at(30, 200).of_size(540, 300), Luma([0]));

        let paragraphs = detect(&page, &[table], &ParagraphConfig::default());
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].paragraph_type, ParagraphType::Header);
        assert_eq!(paragraphs[1].paragraph_type, ParagraphType::Footer);
        assert!(paragraphs[0].bbox.y1 < paragraphs[1].bbox.y1);
        assert!(paragraphs.iter().all(|p| !p.bbox.intersects(&table)));
    }

    #[test]
    fn test_detect_without_tables() {
        let mut page = GrayImage::from_pixel(400, 300, Luma([255]));
        text_block(&mut page, 20, 20, 2);

        let paragraphs = detect(&page, &[], &ParagraphConfig::default());
        assert_eq!(paragraphs.len(), 1);
        assert!(paragraphs[0].is_body());
        assert!(paragraphs[0].bbox.contains(&BBox::new(20, 20, 283, 45)));
    }

    #[test]
    fn test_masked_boxes_hide_ink_but_do_not_classify() {
        let mut page = GrayImage::from_pixel(600, 600, Luma([255]));
        text_block(&mut page, 40, 40, 2);
        // An empty frame that yielded no table.
        let frame = BBox::new(30, 200, 570, 400);
        draw_filled_rect_mut(&mut page, Rect::at(30, 200).of_size(540, 200), Luma([0]));
        text_block(&mut page, 40, 500, 2);

        let paragraphs = detect_masked(&page, &[], &[frame], &ParagraphConfig::default());
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs.iter().all(|p| p.is_body()));
        assert!(paragraphs.iter().all(|p| !p.bbox.intersects(&frame)));

        let unmasked = detect(&page, &[], &ParagraphConfig::default());
        assert!(unmasked.iter().any(|p| p.bbox.intersects(&frame)));
    }

    #[test]
    fn test_detect_blank_page() {
        let page = GrayImage::from_pixel(200, 200, Luma([255]));
        assert!(detect(&page, &[], &ParagraphConfig::default()).is_empty());
    }
}
