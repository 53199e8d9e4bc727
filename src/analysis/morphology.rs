//! Binary image primitives shared by the analysis stages.
//!
//! Masks are `GrayImage`s where 255 marks foreground (ink) and 0 background.
//! Rectangular erosion and dilation are separable, so each runs as a
//! horizontal then a vertical sliding-window pass. Pixels outside the image
//! never take part in a window, which keeps strokes touching the border
//! alive through an opening.

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;

use crate::model::BBox;

/// Foreground value in masks.
pub const INK: u8 = 255;

/// Pages whose darkest and lightest pixels are this close carry no ink.
const MIN_CONTRAST: u8 = 16;

#[derive(Clone, Copy)]
enum Op {
    Erode,
    Dilate,
}

/// Blur with a Gaussian of the given sigma. Non-positive sigma copies.
pub fn blur(gray: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        gaussian_blur_f32(gray, sigma)
    } else {
        gray.clone()
    }
}

/// Inverse global binarization: pixels at or below the Otsu level become ink.
///
/// Flat images produce an empty mask.
pub fn binarize_inv(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    let mut mask = GrayImage::new(width, height);

    let (min, max) = gray
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &p| (lo.min(p), hi.max(p)));
    if max.saturating_sub(min) < MIN_CONTRAST {
        return mask;
    }

    let level = otsu_level(gray);
    for (dst, &src) in mask.iter_mut().zip(gray.iter()) {
        *dst = if src <= level { INK } else { 0 };
    }
    mask
}

/// Erode with a `kw` x `kh` rectangle.
pub fn erode(mask: &GrayImage, kw: u32, kh: u32) -> GrayImage {
    rect_filter(mask, kw, kh, Op::Erode)
}

/// Dilate with a `kw` x `kh` rectangle.
pub fn dilate(mask: &GrayImage, kw: u32, kh: u32) -> GrayImage {
    rect_filter(mask, kw, kh, Op::Dilate)
}

/// Opening (erode then dilate): removes features smaller than the kernel.
pub fn open(mask: &GrayImage, kw: u32, kh: u32) -> GrayImage {
    dilate(&erode(mask, kw, kh), kw, kh)
}

/// Closing (dilate then erode): bridges gaps smaller than the kernel.
pub fn close(mask: &GrayImage, kw: u32, kh: u32) -> GrayImage {
    erode(&dilate(mask, kw, kh), kw, kh)
}

/// Pixelwise union of two masks of the same size.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    let mut out = a.clone();
    for (dst, &src) in out.iter_mut().zip(b.iter()) {
        *dst = (*dst).max(src);
    }
    out
}

/// Copy of the part of `mask` under `bbox` (clamped to the image).
pub fn crop(mask: &GrayImage, bbox: &BBox) -> GrayImage {
    let b = bbox.clamp(mask.width(), mask.height());
    image::imageops::crop_imm(
        mask,
        b.x1 as u32,
        b.y1 as u32,
        b.width() as u32,
        b.height() as u32,
    )
    .to_image()
}

/// OR a sub-mask into `mask` with its top-left corner at `(x, y)`.
pub fn paste_union(mask: &mut GrayImage, part: &GrayImage, x: u32, y: u32) {
    for (px, py, pixel) in part.enumerate_pixels() {
        let (tx, ty) = (x + px, y + py);
        if pixel[0] > 0 && tx < mask.width() && ty < mask.height() {
            mask.put_pixel(tx, ty, Luma([INK]));
        }
    }
}

/// Set every pixel under `bbox` (clamped) to `value`.
pub fn fill(image: &mut GrayImage, bbox: &BBox, value: u8) {
    let b = bbox.clamp(image.width(), image.height());
    for y in b.y1..b.y2 {
        for x in b.x1..b.x2 {
            image.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }
}

/// Check if a mask has no foreground.
pub fn is_blank(mask: &GrayImage) -> bool {
    mask.iter().all(|&p| p == 0)
}

/// Maximal runs of `true` as `(start, end)` pairs, `end` exclusive.
pub fn runs<I: IntoIterator<Item = bool>>(signal: I) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    let mut len = 0;
    for (i, on) in signal.into_iter().enumerate() {
        match (on, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                out.push((s, i));
                start = None;
            }
            _ => {}
        }
        len = i + 1;
    }
    if let Some(s) = start {
        out.push((s, len));
    }
    out
}

/// Length of the longest run of `true`.
pub fn longest_run<I: IntoIterator<Item = bool>>(signal: I) -> usize {
    runs(signal).iter().map(|(s, e)| e - s).max().unwrap_or(0)
}

fn rect_filter(mask: &GrayImage, kw: u32, kh: u32, op: Op) -> GrayImage {
    let (width, height) = mask.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return mask.clone();
    }

    let mut horizontal = GrayImage::new(width, height);
    for y in 0..h {
        filter_line(mask, &mut horizontal, w, kw as usize, op, |x| y * w + x);
    }

    let mut out = GrayImage::new(width, height);
    for x in 0..w {
        filter_line(&horizontal, &mut out, h, kh as usize, op, |y| y * w + x);
    }
    out
}

/// One sliding-window min/max pass over `n` pixels addressed by `at`.
fn filter_line<F: Fn(usize) -> usize>(
    src: &[u8],
    dst: &mut [u8],
    n: usize,
    kernel: usize,
    op: Op,
    at: F,
) {
    if kernel <= 1 {
        for i in 0..n {
            dst[at(i)] = src[at(i)];
        }
        return;
    }

    let before = (kernel - 1) / 2;
    let after = kernel / 2;

    let mut count = (0..=after.min(n - 1)).filter(|&j| src[at(j)] > 0).count();

    for i in 0..n {
        let lo = i.saturating_sub(before);
        let hi = (i + after).min(n - 1);
        let on = match op {
            Op::Dilate => count > 0,
            Op::Erode => count == hi - lo + 1,
        };
        dst[at(i)] = if on { INK } else { 0 };

        let enter = i + after + 1;
        if enter < n && src[at(enter)] > 0 {
            count += 1;
        }
        if i >= before && src[at(i - before)] > 0 {
            count -= 1;
        }
    }
}
