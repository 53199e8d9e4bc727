//! Ruling-line extraction.
//!
//! Builds masks of long horizontal and vertical strokes from a grayscale
//! page, then prunes strokes that do not take part in a grid. Pruning runs
//! per table region so a small table next to a large one is judged against
//! its own extent.

use image::{GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};

use super::morphology::{self, INK};
use super::options::LineMaskConfig;
use crate::model::BBox;

/// Horizontal and vertical stroke masks of the same size.
#[derive(Debug, Clone)]
pub struct LineMasks {
    /// Long horizontal strokes
    pub horizontal: GrayImage,
    /// Long vertical strokes
    pub vertical: GrayImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

impl LineMasks {
    /// Both masks empty, sized `width` x `height`.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            horizontal: GrayImage::new(width, height),
            vertical: GrayImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.horizontal.dimensions()
    }

    /// `horizontal | vertical`.
    pub fn combined(&self) -> GrayImage {
        morphology::union(&self.horizontal, &self.vertical)
    }

    /// Sub-masks under `region`, in the region's local frame.
    pub fn crop(&self, region: &BBox) -> Self {
        Self {
            horizontal: morphology::crop(&self.horizontal, region),
            vertical: morphology::crop(&self.vertical, region),
        }
    }

    /// Check if neither mask has any stroke.
    pub fn is_blank(&self) -> bool {
        morphology::is_blank(&self.horizontal) && morphology::is_blank(&self.vertical)
    }
}

/// Extract raw stroke masks from a grayscale page.
pub fn build(gray: &GrayImage, config: &LineMaskConfig) -> LineMasks {
    let (width, height) = gray.dimensions();
    let binary = morphology::binarize_inv(&morphology::blur(gray, config.blur_sigma));

    let h_len = (width / config.horizontal_divisor.max(1)).max(1);
    let v_len = (height / config.vertical_divisor.max(1)).max(1);

    let horizontal = refine(morphology::open(&binary, h_len, 1), config);
    let vertical = refine(morphology::open(&binary, 1, v_len), config);

    log::debug!(
        "Line masks built ({}x{}, kernels {}x1 / 1x{})",
        width,
        height,
        h_len,
        v_len
    );

    LineMasks {
        horizontal,
        vertical,
    }
}

fn refine(mask: GrayImage, config: &LineMaskConfig) -> GrayImage {
    let closed = morphology::close(&mask, config.close_size, config.close_size);
    morphology::dilate(&closed, config.dilate_size, config.dilate_size)
}

/// Prune strokes inside one region. Returns masks in the region's local frame.
///
/// A stroke survives when it is at least as long as both `min_line_length`
/// and `min_line_fraction` of the region's extent along the stroke, and it
/// meets the orthogonal mask at `min_crossings` distinct places or more.
pub fn filter_region(masks: &LineMasks, region: &BBox, config: &LineMaskConfig) -> LineMasks {
    let local = masks.crop(region);
    let (width, height) = local.dimensions();

    let min_h = min_length(width, config);
    let min_v = min_length(height, config);

    LineMasks {
        horizontal: keep_grid_strokes(
            &local.horizontal,
            &local.vertical,
            Axis::Horizontal,
            min_h,
            config.min_crossings,
        ),
        vertical: keep_grid_strokes(
            &local.vertical,
            &local.horizontal,
            Axis::Vertical,
            min_v,
            config.min_crossings,
        ),
    }
}

/// Prune every region independently and paste the results into page-sized masks.
pub fn filter_regions(masks: &LineMasks, regions: &[BBox], config: &LineMaskConfig) -> LineMasks {
    let (width, height) = masks.dimensions();
    let mut out = LineMasks::empty(width, height);

    for region in regions {
        let clamped = region.clamp(width, height);
        if clamped.is_empty() {
            continue;
        }
        let local = filter_region(masks, &clamped, config);
        let (x, y) = (clamped.x1 as u32, clamped.y1 as u32);
        morphology::paste_union(&mut out.horizontal, &local.horizontal, x, y);
        morphology::paste_union(&mut out.vertical, &local.vertical, x, y);
    }

    out
}

fn min_length(extent: u32, config: &LineMaskConfig) -> u32 {
    let relative = (extent as f32 * config.min_line_fraction).round() as u32;
    config.min_line_length.max(relative)
}

fn keep_grid_strokes(
    mask: &GrayImage,
    orthogonal: &GrayImage,
    axis: Axis,
    min_length: u32,
    min_crossings: usize,
) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let count = labels.iter().copied().max().unwrap_or(0) as usize;
    if count == 0 {
        return out;
    }

    let mut components: Vec<Vec<(u32, u32)>> = vec![Vec::new(); count + 1];
    for (x, y, label) in labels.enumerate_pixels() {
        if label[0] != 0 {
            components[label[0] as usize].push((x, y));
        }
    }

    let position = |x: u32, y: u32| match axis {
        Axis::Horizontal => x,
        Axis::Vertical => y,
    };

    let mut kept = 0;
    for pixels in components.iter().filter(|p| !p.is_empty()) {
        let lo = pixels.iter().map(|&(x, y)| position(x, y)).min().unwrap_or(0);
        let hi = pixels.iter().map(|&(x, y)| position(x, y)).max().unwrap_or(0);
        let length = hi - lo + 1;
        if length < min_length {
            continue;
        }

        let mut touched = vec![false; length as usize];
        for &(x, y) in pixels {
            if orthogonal.get_pixel(x, y)[0] > 0 {
                touched[(position(x, y) - lo) as usize] = true;
            }
        }
        if morphology::runs(touched).len() < min_crossings {
            continue;
        }

        for &(x, y) in pixels {
            out.put_pixel(x, y, Luma([INK]));
        }
        kept += 1;
    }

    log::debug!(
        "{:?} strokes kept: {} of {} (min length {})",
        axis,
        kept,
        count,
        min_length
    );

    out
}
