//! Loading grid states from text grids, array literals and images.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;

use ledgrid::geometry::GridGeometry;
use ledgrid::grid::GridState;
use ledgrid::text::parse_c_array;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Load a grid sized to `geometry` from a file.
///
/// Images are scaled to one pixel per LED and thresholded on luminance.
/// Text files are read as an array literal if they contain one, otherwise as
/// a `#`/`.` grid.
pub fn load_grid(path: &Path, geometry: &GridGeometry, threshold: u8) -> Result<GridState> {
    let is_image = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if is_image {
        return load_image(path, geometry, threshold);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    grid_from_text(&text, geometry).with_context(|| format!("parsing {}", path.display()))
}

pub fn grid_from_text(text: &str, geometry: &GridGeometry) -> Result<GridState> {
    if text.contains('=') && text.contains('{') {
        let bytes = parse_c_array(text)?;
        anyhow::ensure!(
            bytes.rows() == geometry.rows,
            "array has {} rows, grid has {}",
            bytes.rows(),
            geometry.rows
        );
        Ok(bytes.unpack(geometry.cols)?)
    } else {
        Ok(GridState::from_ascii(text, geometry.rows, geometry.cols)?)
    }
}

fn load_image(path: &Path, geometry: &GridGeometry, threshold: u8) -> Result<GridState> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?
        .into_luma8();

    log::debug!(
        "scaling {} from {}x{} to {}x{}",
        path.display(),
        img.width(),
        img.height(),
        geometry.cols,
        geometry.rows
    );
    let scaled = image::imageops::resize(
        &img,
        geometry.cols as u32,
        geometry.rows as u32,
        FilterType::Nearest,
    );

    let mut grid = GridState::new(geometry.rows, geometry.cols);
    for (x, y, pixel) in scaled.enumerate_pixels() {
        if pixel.0[0] >= threshold {
            grid.set(y as usize, x as usize, true)?;
        }
    }
    Ok(grid)
}
