//! ASCII rendering of generated masks
//!
//! Quick terminal preview of a land/water raster, downsampled to fit a
//! console width.

use crate::bitgrid::BitGrid;

const LAND_CHAR: char = '#';
const WATER_CHAR: char = '.';

/// Render the mask as text, one character per sampled block. Grids wider
/// than `max_width` are downsampled by an integer step; a block renders as
/// land when any of its cells is land.
pub fn render_mask(grid: &BitGrid, max_width: usize) -> String {
    let step = if max_width == 0 {
        1
    } else {
        ((grid.width() + max_width - 1) / max_width).max(1)
    };

    let mut out = String::new();
    let mut y = 0;
    while y < grid.height() {
        let mut x = 0;
        while x < grid.width() {
            let mut land = false;
            'block: for by in y..(y + step).min(grid.height()) {
                for bx in x..(x + step).min(grid.width()) {
                    if grid.get(bx as i32, by as i32) {
                        land = true;
                        break 'block;
                    }
                }
            }
            out.push(if land { LAND_CHAR } else { WATER_CHAR });
            x += step;
        }
        out.push('\n');
        y += step;
    }
    out
}
