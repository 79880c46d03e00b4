//! PNG rendering of visualization grids.

use std::path::Path;

use image::{GrayImage, Luma};
use log::info;

use crate::error::Result;

use super::viz_grid::VizGrid;

const BORDER_PX: u32 = 2;

// Values scale linearly onto 32..=255 so a zero cell is still distinguishable from the border
fn shade(value: i64, min: i64, max: i64) -> u8 {
    if max <= min {
        return 255;
    }
    let t = (value - min) as f64 / (max - min) as f64;
    (32.0 + t * 223.0).round() as u8
}

/// Draws `grid` with each cell as a `cell_px` square. Cells in `highlights` get an inverted border.
pub fn render_grid_png(grid: &VizGrid, highlights: &[(usize, usize)], cell_px: u32) -> GrayImage {
    let cell_px = cell_px.max(1);
    let width = grid.cols() as u32 * cell_px;
    let height = grid.rows() as u32 * cell_px;
    let mut img = GrayImage::new(width, height);

    let min = grid.as_slice().iter().copied().min().unwrap_or(0);
    let max = grid.max_value().unwrap_or(0);
    let border = BORDER_PX.min(cell_px / 2);

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let value = grid.get(row, col).unwrap_or(0);
            let fill = shade(value, min, max);
            let marked = highlights.contains(&(row, col));

            for dy in 0..cell_px {
                for dx in 0..cell_px {
                    let edge = dx < border
                        || dy < border
                        || dx >= cell_px - border
                        || dy >= cell_px - border;
                    let px = match (marked, edge) {
                        (true, true) => 255 - fill,
                        _ => fill,
                    };
                    img.put_pixel(col as u32 * cell_px + dx, row as u32 * cell_px + dy, Luma([px]));
                }
            }
        }
    }
    img
}

pub fn save_grid_png<P: AsRef<Path>>(
    path: P,
    grid: &VizGrid,
    highlights: &[(usize, usize)],
    cell_px: u32,
) -> Result<()> {
    let path = path.as_ref();
    render_grid_png(grid, highlights, cell_px).save(path)?;
    info!("wrote {}x{} grid to {}", grid.rows(), grid.cols(), path.display());
    Ok(())
}
