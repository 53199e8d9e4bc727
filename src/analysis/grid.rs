//! Grid reconstruction with merged-cell inference.
//!
//! Boundaries come from projecting each stroke mask onto the orthogonal
//! axis. Unit cells are then visited in row-major order and grown right
//! and down for as long as the separator that should close them is
//! missing from the masks. Every unit slot ends up in exactly one cell, so
//! the cells tile the grid.

use image::GrayImage;

use super::morphology;
use super::options::GridConfig;
use crate::model::{BBox, Cell, Table};

/// Rebuild the table inside `region` from its local stroke sub-masks.
///
/// Returns `None` when fewer than two boundaries are found on either axis.
/// The table bbox is the grid extent in page coordinates.
pub fn reconstruct(
    region: &BBox,
    v_lines: &GrayImage,
    h_lines: &GrayImage,
    config: &GridConfig,
    page: u32,
) -> Option<Table> {
    let xs = column_boundaries(v_lines);
    let mut ys = row_boundaries(h_lines);
    patch_bottom(&mut ys, h_lines.height() as i32, config.min_row_height as i32);

    if xs.len() < 2 || ys.len() < 2 {
        log::debug!(
            "Region {} has {} column and {} row boundaries, skipped",
            region,
            xs.len(),
            ys.len()
        );
        return None;
    }

    let cells: Vec<Cell> = build_cells(&xs, &ys, v_lines, h_lines, config, page)
        .into_iter()
        .map(|cell| Cell {
            bbox: cell.bbox.translate(region.x1, region.y1),
            ..cell
        })
        .collect();

    if cells.is_empty() {
        return None;
    }

    let extent = BBox::new(xs[0], ys[0], xs[xs.len() - 1], ys[ys.len() - 1])
        .translate(region.x1, region.y1);

    log::debug!(
        "Region {}: {}x{} grid, {} cells",
        region,
        ys.len() - 1,
        xs.len() - 1,
        cells.len()
    );

    Some(Table::with_cells(extent, page, cells))
}

/// Midpoints of the vertical strokes, left to right.
pub fn column_boundaries(v_lines: &GrayImage) -> Vec<i32> {
    let (width, height) = v_lines.dimensions();
    let occupied = (0..width).map(|x| (0..height).any(|y| v_lines.get_pixel(x, y)[0] > 0));
    midpoints(occupied)
}

/// Midpoints of the horizontal strokes, top to bottom.
pub fn row_boundaries(h_lines: &GrayImage) -> Vec<i32> {
    let (width, height) = h_lines.dimensions();
    let occupied = (0..height).map(|y| (0..width).any(|x| h_lines.get_pixel(x, y)[0] > 0));
    midpoints(occupied)
}

fn midpoints<I: IntoIterator<Item = bool>>(occupied: I) -> Vec<i32> {
    morphology::runs(occupied)
        .into_iter()
        .map(|(start, end)| (start + (end - start) / 2) as i32)
        .collect()
}

/// Append `height` as the bottom boundary when the last rule leaves a
/// taller gap than `min_row_height`.
pub fn patch_bottom(ys: &mut Vec<i32>, height: i32, min_row_height: i32) {
    if let Some(&last) = ys.last() {
        if height - last > min_row_height {
            ys.push(height);
        }
    }
}

/// Build the cells of a grid given its boundaries, in the masks' frame.
///
/// Cells are emitted in row-major order of their top-left unit slot.
pub fn build_cells(
    xs: &[i32],
    ys: &[i32],
    v_lines: &GrayImage,
    h_lines: &GrayImage,
    config: &GridConfig,
    page: u32,
) -> Vec<Cell> {
    if xs.len() < 2 || ys.len() < 2 {
        return Vec::new();
    }
    let rows = ys.len() - 1;
    let cols = xs.len() - 1;
    let probe = Probe {
        v_lines,
        h_lines,
        config,
    };

    let mut used = vec![vec![false; cols]; rows];
    let mut cells = Vec::with_capacity(rows * cols);

    for r in 0..rows {
        for c in 0..cols {
            if used[r][c] {
                continue;
            }

            let mut colspan = 1;
            while c + colspan < cols
                && !used[r][c + colspan]
                && !probe.has_column_separator(xs[c + colspan], ys[r], ys[r + 1])
            {
                colspan += 1;
            }

            let mut rowspan = 1;
            while r + rowspan < rows
                && !used[r + rowspan][c..c + colspan].iter().any(|&u| u)
                && !probe.has_row_separator(ys[r + rowspan], xs[c], xs[c + colspan])
            {
                rowspan += 1;
            }

            for row in used.iter_mut().skip(r).take(rowspan) {
                for slot in row.iter_mut().skip(c).take(colspan) {
                    *slot = true;
                }
            }

            let bbox = BBox::new(xs[c], ys[r], xs[c + colspan], ys[r + rowspan]);
            cells.push(
                Cell::new(bbox, r, c, page)
                    .colspan(colspan)
                    .rowspan(rowspan),
            );
        }
    }

    cells
}

/// Samples thin bands of the stroke masks around grid boundaries.
struct Probe<'a> {
    v_lines: &'a GrayImage,
    h_lines: &'a GrayImage,
    config: &'a GridConfig,
}

impl Probe<'_> {
    /// Check for a vertical stroke at `x` between rows `y1` and `y2`.
    fn has_column_separator(&self, x: i32, y1: i32, y2: i32) -> bool {
        let (width, height) = self.v_lines.dimensions();
        let (lo, hi) = self.inset(y1, y2, height);
        let (bx1, bx2) = self.band(x, width);

        let signal = (lo..hi).map(|y| (bx1..bx2).any(|bx| self.v_lines.get_pixel(bx, y)[0] > 0));
        self.is_separator(signal, hi.saturating_sub(lo))
    }

    /// Check for a horizontal stroke at `y` between columns `x1` and `x2`.
    fn has_row_separator(&self, y: i32, x1: i32, x2: i32) -> bool {
        let (width, height) = self.h_lines.dimensions();
        let (lo, hi) = self.inset(x1, x2, width);
        let (by1, by2) = self.band(y, height);

        let signal = (lo..hi).map(|x| (by1..by2).any(|by| self.h_lines.get_pixel(x, by)[0] > 0));
        self.is_separator(signal, hi.saturating_sub(lo))
    }

    fn is_separator<I: IntoIterator<Item = bool>>(&self, signal: I, length: u32) -> bool {
        if length == 0 {
            return true;
        }
        let run = morphology::longest_run(signal) as f32;
        run >= self.config.run_ratio * length as f32
    }

    /// Span `[start, end)` shrunk by the band margin, clamped to `limit`.
    /// Falls back to the whole span when the margin would empty it.
    fn inset(&self, start: i32, end: i32, limit: u32) -> (u32, u32) {
        let margin = self.config.band_margin as i32;
        let (mut lo, mut hi) = (start + margin, end - margin);
        if hi <= lo {
            (lo, hi) = (start, end);
        }
        let limit = limit as i32;
        (lo.clamp(0, limit) as u32, hi.clamp(0, limit) as u32)
    }

    /// Band of `band_half_width` either side of `center`, clamped to `limit`.
    fn band(&self, center: i32, limit: u32) -> (u32, u32) {
        let half = self.config.band_half_width as i32;
        let limit = limit as i32;
        let lo = (center - half).clamp(0, limit);
        let hi = (center + half + 1).clamp(0, limit);
        (lo as u32, hi as u32)
    }
}
