//! Table region location.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;

use super::options::RegionConfig;
use crate::model::BBox;

/// Find probable table regions in a combined stroke mask.
///
/// Regions come back sorted by their top edge. At most
/// `config.max_tables` regions are kept, largest by area first.
pub fn locate(mask: &GrayImage, config: &RegionConfig) -> Vec<BBox> {
    let mut regions: Vec<BBox> = outer_boxes(mask, config.approx_epsilon)
        .into_iter()
        .filter(|b| b.width() >= config.min_width as i32 && b.height() >= config.min_height as i32)
        .collect();

    regions.sort_by_key(|b| std::cmp::Reverse(b.area()));
    regions.truncate(config.max_tables);
    regions.sort_by_key(|b| (b.y1, b.x1));

    log::debug!("Located {} table regions", regions.len());
    regions
}

/// Bounding boxes of external contours that approximate to a polygon with
/// at least four vertices.
fn outer_boxes(mask: &GrayImage, epsilon: f64) -> Vec<BBox> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter(|c| {
            let tolerance = epsilon * arc_length(&c.points, true);
            approximate_polygon_dp(&c.points, tolerance, true).len() >= 4
        })
        .filter_map(|c| bounding_box(&c.points))
        .collect()
}

/// Axis-aligned box around a point set (exclusive right/bottom edges).
pub(crate) fn bounding_box(points: &[Point<i32>]) -> Option<BBox> {
    let first = points.first()?;
    let (mut x1, mut y1, mut x2, mut y2) = (first.x, first.y, first.x, first.y);
    for p in points {
        x1 = x1.min(p.x);
        y1 = y1.min(p.y);
        x2 = x2.max(p.x);
        y2 = y2.max(p.y);
    }
    Some(BBox::new(x1, y1, x2 + 1, y2 + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
    use imageproc::rect::Rect;

    fn frame(mask: &mut GrayImage, x: i32, y: i32, w: u32, h: u32) {
        for inset in 0..3 {
            let rect = Rect::at(x + inset, y + inset).of_size(w - 2 * inset as u32, h - 2 * inset as u32);
            draw_hollow_rect_mut(mask, rect, Luma([255]));
        }
    }

    #[test]
    fn test_locate_sorts_by_top() {
        let mut mask = GrayImage::new(600, 600);
        frame(&mut mask, 20, 350, 400, 100);
        frame(&mut mask, 50, 40, 300, 120);

        let regions = locate(&mask, &RegionConfig::default());
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0], BBox::new(50, 40, 350, 160));
        assert_eq!(regions[1], BBox::new(20, 350, 420, 450));
    }

    #[test]
    fn test_locate_drops_small_and_linear_shapes() {
        let mut mask = GrayImage::new(600, 400);
        frame(&mut mask, 10, 10, 60, 30);
        // A lone rule is a thin sliver, not a polygon.
        draw_filled_rect_mut(&mut mask, Rect::at(10, 200).of_size(500, 3), Luma([255]));

        assert!(locate(&mask, &RegionConfig::default()).is_empty());
    }

    #[test]
    fn test_locate_keeps_largest() {
        let mut mask = GrayImage::new(800, 800);
        frame(&mut mask, 10, 10, 150, 60);
        frame(&mut mask, 10, 200, 500, 300);
        frame(&mut mask, 10, 600, 200, 100);

        let config = RegionConfig {
            max_tables: 2,
            ..RegionConfig::default()
        };
        let regions = locate(&mask, &config);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].y1, 200);
        assert_eq!(regions[1].y1, 600);
    }

    #[test]
    fn test_bounding_box() {
        let points = [Point::new(3, 9), Point::new(7, 2), Point::new(5, 5)];
        assert_eq!(bounding_box(&points), Some(BBox::new(3, 2, 8, 10)));
        assert_eq!(bounding_box(&[]), None);
    }
}
