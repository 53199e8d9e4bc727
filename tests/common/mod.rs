//! Synthetic page rasters shared by the integration tests.

#![allow(dead_code)]

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

pub const PAGE_WIDTH: u32 = 800;
pub const PAGE_HEIGHT: u32 = 600;

const INK: Luma<u8> = Luma([0]);
const RULE: u32 = 3;

/// A blank white page.
pub fn blank_page() -> GrayImage {
    GrayImage::from_pixel(PAGE_WIDTH, PAGE_HEIGHT, Luma([255]))
}

/// Ruled grid description: column and row rule positions plus rules to leave out.
pub struct Grid {
    pub xs: Vec<i32>,
    pub ys: Vec<i32>,
    /// Vertical rules `(column rule index, row band index)` not drawn
    pub missing_v: Vec<(usize, usize)>,
}

impl Grid {
    pub fn new(xs: &[i32], ys: &[i32]) -> Self {
        Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            missing_v: Vec::new(),
        }
    }

    pub fn without_vertical(mut self, rule: usize, band: usize) -> Self {
        self.missing_v.push((rule, band));
        self
    }

    pub fn draw(&self, page: &mut GrayImage) {
        let (left, right) = (self.xs[0], self.xs[self.xs.len() - 1]);
        for &y in &self.ys {
            let rect = Rect::at(left, y).of_size((right - left) as u32 + RULE, RULE);
            draw_filled_rect_mut(page, rect, INK);
        }
        for (i, &x) in self.xs.iter().enumerate() {
            for band in 0..self.ys.len() - 1 {
                if self.missing_v.contains(&(i, band)) {
                    continue;
                }
                let (top, bottom) = (self.ys[band], self.ys[band + 1]);
                let rect = Rect::at(x, top).of_size(RULE, (bottom - top) as u32 + RULE);
                draw_filled_rect_mut(page, rect, INK);
            }
        }
    }
}

/// Draw `lines` lines of short word-like bars starting at `(x, y)`.
pub fn text_block(page: &mut GrayImage, x: i32, y: i32, lines: u32) {
    for line in 0..lines {
        for word in 0..8 {
            let rect = Rect::at(x + word * 26, y + line as i32 * 16).of_size(20, 9);
            draw_filled_rect_mut(page, rect, INK);
        }
    }
}

/// Page with a header block, one table and a footer block.
pub fn report_page(grid: &Grid) -> GrayImage {
    let mut page = blank_page();
    text_block(&mut page, 100, 60, 3);
    grid.draw(&mut page);
    text_block(&mut page, 100, 500, 2);
    page
}
