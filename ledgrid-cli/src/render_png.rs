//! PNG preview of a grid, drawn the way the browser page draws it.

use std::path::Path;

use anyhow::{Context, Result};
use ledgrid::geometry::{CellRef, GridGeometry};
use ledgrid::grid::GridState;

const BACKGROUND: [u8; 3] = [40, 40, 40];
const LED_OFF: [u8; 3] = [50, 50, 50];
const LED_ON: [u8; 3] = [255, 0, 0];

struct RgbImage {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
}

/// Write the grid as round LEDs on a dark background.
pub fn write_grid_png(grid: &GridState, geometry: &GridGeometry, path: &Path) -> Result<()> {
    let img = grid_to_image(grid, geometry);
    write_rgb_png(path, &img.pixels, img.width, img.height)
}

fn grid_to_image(grid: &GridState, geometry: &GridGeometry) -> RgbImage {
    let width = geometry.width().ceil() as usize;
    let height = geometry.height().ceil() as usize;
    let mut pixels = BACKGROUND.repeat(width * height);

    let radius = geometry.cell_size * 0.5;
    for row in 0..grid.rows() {
        for (col, &on) in grid.row(row).iter().enumerate() {
            let colour = if on { LED_ON } else { LED_OFF };
            let (cx, cy) = geometry.cell_center(CellRef::new(row, col));
            let (ox, oy) = geometry.cell_origin(CellRef::new(row, col));

            let x0 = ox.floor() as usize;
            let y0 = oy.floor() as usize;
            let x1 = ((ox + geometry.cell_size).ceil() as usize).min(width);
            let y1 = ((oy + geometry.cell_size).ceil() as usize).min(height);
            for y in y0..y1 {
                for x in x0..x1 {
                    // Sample at pixel centers
                    let dx = x as f64 + 0.5 - cx;
                    let dy = y as f64 + 0.5 - cy;
                    if dx * dx + dy * dy <= radius * radius {
                        let i = (y * width + x) * 3;
                        pixels[i..i + 3].copy_from_slice(&colour);
                    }
                }
            }
        }
    }

    RgbImage {
        pixels,
        width,
        height,
    }
}

fn write_rgb_png(path: &Path, pixels: &[u8], width: usize, height: usize) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let w = std::io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("writing PNG header for {}", path.display()))?;
    writer
        .write_image_data(pixels)
        .with_context(|| format!("writing PNG data for {}", path.display()))?;

    Ok(())
}
