//! Surface grid generation from a depth map
//!
//! Reads the depth map PNG back from disk, downsamples it to a vertex grid
//! and produces per-vertex X/Y/Z coordinates: columns and rows map to X and Y
//! in an aspect-correct range centered on the origin, depth becomes Z. The
//! source photo is sampled per vertex for the luminance used to shade the
//! rendered surface.

use std::path::{Path, PathBuf};
use tokio::task;

use crate::depth::map::DepthMap;
use crate::error::{Error, Result};

/// Maximum vertices along the longer grid side. Keeps the viewport
/// responsive for full-size photos.
const MAX_GRID_SIDE: u32 = 96;

/// A downsampled surface grid ready for rendering.
///
/// All four per-vertex arrays are row-major with `rows * cols` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub cols: usize,
    pub rows: usize,
    /// X coordinate per vertex, aspect-correct, centered on 0.
    pub xs: Vec<f32>,
    /// Y coordinate per vertex, positive up, centered on 0.
    pub ys: Vec<f32>,
    /// Depth per vertex in [0,1] (1.0 = closest).
    pub zs: Vec<f32>,
    /// Photo luminance per vertex in [0,1], used for shading.
    pub luma: Vec<f32>,
}

impl SurfaceGrid {
    /// Vertex index for grid cell (col, row).
    pub fn index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }
}

/// Generate a surface grid from the saved depth map and the source photo.
///
/// Runs on the blocking pool; both inputs are decoded from disk.
pub async fn generate_surface(
    depth_map_path: PathBuf,
    image_path: PathBuf,
) -> Result<SurfaceGrid> {
    task::spawn_blocking(move || generate_surface_blocking(&depth_map_path, &image_path))
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// Blocking implementation of surface generation.
fn generate_surface_blocking(depth_map_path: &Path, image_path: &Path) -> Result<SurfaceGrid> {
    // Missing depth map is its own error; the UI reports it distinctly
    let depth = DepthMap::load_png(depth_map_path)?;

    if !image_path.exists() {
        return Err(Error::FileMissing(image_path.to_path_buf()));
    }
    let photo = image::open(image_path)?.into_luma8();

    let (width, height) = (depth.width(), depth.height());
    let stride = (width.max(height)).div_ceil(MAX_GRID_SIDE).max(1);
    let cols = width.div_ceil(stride) as usize;
    let rows = height.div_ceil(stride) as usize;

    // The longer image side spans [-1, 1]; the shorter side scales by aspect
    let scale = 2.0 / (width.max(height) as f32 - 1.0).max(1.0);
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;

    let (photo_w, photo_h) = photo.dimensions();

    let mut xs = Vec::with_capacity(rows * cols);
    let mut ys = Vec::with_capacity(rows * cols);
    let mut zs = Vec::with_capacity(rows * cols);
    let mut luma = Vec::with_capacity(rows * cols);

    for row in 0..rows {
        let py = (row as u32 * stride).min(height - 1);
        for col in 0..cols {
            let px = (col as u32 * stride).min(width - 1);

            xs.push((px as f32 - cx) * scale);
            // Image rows grow downward; flip so the surface's Y points up
            ys.push(-(py as f32 - cy) * scale);
            zs.push(depth.get(px, py));

            // The photo normally has the depth map's dimensions, but sample
            // proportionally in case it was replaced since estimation
            let sx = (px as u64 * photo_w as u64 / width as u64) as u32;
            let sy = (py as u64 * photo_h as u64 / height as u64) as u32;
            let pixel = photo.get_pixel(sx.min(photo_w - 1), sy.min(photo_h - 1));
            luma.push(pixel.0[0] as f32 / 255.0);
        }
    }

    Ok(SurfaceGrid {
        cols,
        rows,
        xs,
        ys,
        zs,
        luma,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn test_dir() -> PathBuf {
        let dir = std::env::temp_dir().join("depth-studio-surface-test");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_fixtures(width: u32, height: u32) -> (PathBuf, PathBuf) {
        let dir = test_dir();
        let depth_path = dir.join(format!("depth_{}x{}.png", width, height));
        let photo_path = dir.join(format!("photo_{}x{}.png", width, height));

        // Depth ramps left to right
        let depth = GrayImage::from_fn(width, height, |x, _| {
            image::Luma([(x * 255 / width.max(1)) as u8])
        });
        depth.save(&depth_path).unwrap();

        let photo = GrayImage::from_pixel(width, height, image::Luma([128u8]));
        photo.save(&photo_path).unwrap();

        (depth_path, photo_path)
    }

    #[test]
    fn test_missing_depth_map_is_distinct() {
        let (_, photo_path) = write_fixtures(8, 8);
        let missing = test_dir().join("no_depth.png");
        let result = generate_surface_blocking(&missing, &photo_path);
        assert!(matches!(result, Err(Error::DepthMapMissing(_))));
    }

    #[test]
    fn test_missing_photo_is_reported() {
        let (depth_path, _) = write_fixtures(8, 8);
        let result = generate_surface_blocking(&depth_path, Path::new("/nonexistent/photo.png"));
        assert!(matches!(result, Err(Error::FileMissing(_))));
    }

    #[test]
    fn test_small_input_keeps_full_resolution() {
        let (depth_path, photo_path) = write_fixtures(16, 12);
        let grid = generate_surface_blocking(&depth_path, &photo_path).unwrap();

        assert_eq!(grid.cols, 16);
        assert_eq!(grid.rows, 12);
        assert_eq!(grid.xs.len(), 16 * 12);
        assert_eq!(grid.ys.len(), 16 * 12);
        assert_eq!(grid.zs.len(), 16 * 12);
        assert_eq!(grid.luma.len(), 16 * 12);
    }

    #[test]
    fn test_large_input_is_downsampled() {
        let (depth_path, photo_path) = write_fixtures(400, 200);
        let grid = generate_surface_blocking(&depth_path, &photo_path).unwrap();

        assert!(grid.cols <= MAX_GRID_SIDE as usize + 1);
        assert!(grid.rows <= MAX_GRID_SIDE as usize + 1);
        assert_eq!(grid.zs.len(), grid.cols * grid.rows);
    }

    #[test]
    fn test_coordinates_are_centered_and_depth_bounded() {
        let (depth_path, photo_path) = write_fixtures(16, 12);
        let grid = generate_surface_blocking(&depth_path, &photo_path).unwrap();

        // X grows left to right, Y points up
        assert!(grid.xs[grid.index(0, 0)] < grid.xs[grid.index(15, 0)]);
        assert!(grid.ys[grid.index(0, 0)] > grid.ys[grid.index(0, 11)]);

        // Centered: opposite corners mirror each other
        let first_x = grid.xs[grid.index(0, 0)];
        let last_x = grid.xs[grid.index(15, 0)];
        assert!((first_x + last_x).abs() < 1e-5);

        assert!(grid.zs.iter().all(|&z| (0.0..=1.0).contains(&z)));

        // Depth ramp survives the trip to the grid
        assert!(grid.zs[grid.index(0, 0)] < grid.zs[grid.index(15, 0)]);
    }

    #[tokio::test]
    async fn test_async_wrapper() {
        let (depth_path, photo_path) = write_fixtures(8, 8);
        let grid = generate_surface(depth_path, photo_path).await.unwrap();
        assert_eq!(grid.cols * grid.rows, grid.zs.len());
    }
}
