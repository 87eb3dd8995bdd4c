//! PNG export of generated masks
//!
//! Debug/export surface for inspecting a finished generation session.
//! The authoring tool itself consumes the raw grid; these files are for
//! humans.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::bitgrid::BitGrid;
use crate::island::Island;

const WATER_COLOR: [u8; 3] = [24, 52, 98];
const LAND_COLOR: [u8; 3] = [92, 128, 56];
const UNOWNED_LAND_COLOR: [u8; 3] = [110, 110, 110];

/// Export the mask as a two-color land/water PNG.
pub fn export_mask(grid: &BitGrid, path: &str) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(grid.width() as u32, grid.height() as u32);

    for (x, y, set) in grid.iter() {
        let color = if set { LAND_COLOR } else { WATER_COLOR };
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }

    img.save(path)
}

/// Export the mask with one color per island, attributed by bounding
/// rectangle in island order. Land outside every island's bounds renders
/// gray.
pub fn export_island_map(
    grid: &BitGrid,
    islands: &[Island],
    path: &str,
) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(grid.width() as u32, grid.height() as u32);

    for (x, y, set) in grid.iter() {
        let color = if set {
            islands
                .iter()
                .find(|island| island.bounds().contains(x, y))
                .map(|island| island_color(island.id().0))
                .unwrap_or(UNOWNED_LAND_COLOR)
        } else {
            WATER_COLOR
        };
        img.put_pixel(x as u32, y as u32, Rgb(color));
    }

    img.save(path)
}

/// Stable distinct-ish color per island id: hue walks the golden angle.
fn island_color(id: u32) -> [u8; 3] {
    let hue = (id as f32 * 137.508) % 360.0;
    let c = 0.55f32;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let (r, g, b) = match (hue / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = 0.30f32;
    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}
