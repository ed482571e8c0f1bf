//! Monocular depth estimator
//!
//! Produces a normalized depth map from a single photo. The estimator is a
//! classical prior: a weighted blend of three image cues (blurred luminance,
//! vertical position in the frame, proximity to the frame center), with the
//! blend weights loaded from a JSON model file. Portraits light the subject
//! and center it, so the blend puts the face nearer than the background.
//!
//! The model file is required; a missing file is reported as its own error
//! so the UI can tell it apart from a bad input photo.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::task;

use crate::depth::map::DepthMap;
use crate::error::{Error, Result};

/// Weights for the depth prior, loaded from the model file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DepthPriorModel {
    /// Radius of the box blur applied to the luminance cue, in pixels.
    pub blur_radius: u32,
    /// Weight of the blurred luminance cue (brighter = closer).
    pub luma_weight: f32,
    /// Weight of the vertical cue (lower in frame = closer).
    pub vertical_weight: f32,
    /// Weight of the center proximity cue (centered = closer).
    pub center_weight: f32,
    /// Flip near and far after blending.
    pub invert: bool,
}

impl Default for DepthPriorModel {
    fn default() -> Self {
        Self {
            blur_radius: 4,
            luma_weight: 0.55,
            vertical_weight: 0.25,
            center_weight: 0.2,
            invert: false,
        }
    }
}

impl DepthPriorModel {
    /// Load the weights from a JSON model file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ModelFileMissing(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Estimate a depth map for the photo at `image_path`.
    ///
    /// The result is always a well-formed 2D map with the photo's dimensions
    /// and values normalized to [0,1].
    pub fn estimate(&self, image_path: &Path) -> Result<DepthMap> {
        if !image_path.exists() {
            return Err(Error::FileMissing(image_path.to_path_buf()));
        }

        let luma = image::open(image_path)?.into_luma8();
        let (width, height) = luma.dimensions();

        let brightness: Vec<f32> = luma.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        let blurred = box_blur(&brightness, width, height, self.blur_radius);

        let cx = (width as f32 - 1.0) / 2.0;
        let cy = (height as f32 - 1.0) / 2.0;
        // Farthest corner distance, for normalizing the center cue
        let max_radius = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
        let max_y = (height as f32 - 1.0).max(1.0);

        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                let luma_cue = blurred[(y * width + x) as usize];
                let vertical_cue = y as f32 / max_y;
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                let center_cue = 1.0 - (dx * dx + dy * dy).sqrt() / max_radius;

                let mut v = self.luma_weight * luma_cue
                    + self.vertical_weight * vertical_cue
                    + self.center_weight * center_cue;
                if self.invert {
                    v = -v;
                }
                data.push(v);
            }
        }

        Ok(DepthMap::new(width, height, data)?.normalized())
    }
}

/// Estimate depth for a photo and persist the map as an 8-bit grayscale PNG.
///
/// Returns the path of the written depth map. Runs on the blocking pool
/// because decoding and blurring a full-size photo is CPU-bound.
pub async fn estimate_to_png(
    image_path: PathBuf,
    model_path: PathBuf,
    depth_map_path: PathBuf,
) -> Result<PathBuf> {
    task::spawn_blocking(move || estimate_to_png_blocking(&image_path, &model_path, &depth_map_path))
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// Blocking implementation of estimate-and-save.
fn estimate_to_png_blocking(
    image_path: &Path,
    model_path: &Path,
    depth_map_path: &Path,
) -> Result<PathBuf> {
    let model = DepthPriorModel::load(model_path)?;
    let depth_map = model.estimate(image_path)?;
    depth_map.save_png(depth_map_path)?;
    Ok(depth_map_path.to_path_buf())
}

/// Separable box blur with clamped borders.
fn box_blur(values: &[f32], width: u32, height: u32, radius: u32) -> Vec<f32> {
    if radius == 0 {
        return values.to_vec();
    }
    let r = radius as i64;
    let w = width as i64;
    let h = height as i64;

    // Horizontal pass
    let mut horizontal = vec![0.0f32; values.len()];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for k in -r..=r {
                let sx = (x + k).clamp(0, w - 1);
                sum += values[(y * w + sx) as usize];
            }
            horizontal[(y * w + x) as usize] = sum / (2 * r + 1) as f32;
        }
    }

    // Vertical pass
    let mut blurred = vec![0.0f32; values.len()];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0.0;
            for k in -r..=r {
                let sy = (y + k).clamp(0, h - 1);
                sum += horizontal[(sy * w + x) as usize];
            }
            blurred[(y * w + x) as usize] = sum / (2 * r + 1) as f32;
        }
    }

    blurred
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn test_dir() -> PathBuf {
        let dir = std::env::temp_dir().join("depth-studio-estimator-test");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// A photo-like fixture: bright blob in the center, dark background.
    fn write_test_photo(path: &Path, width: u32, height: u32) {
        let cx = width as f32 / 2.0;
        let cy = height as f32 / 2.0;
        let img = GrayImage::from_fn(width, height, |x, y| {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let d = (dx * dx + dy * dy).sqrt();
            if d < width.min(height) as f32 / 4.0 {
                image::Luma([220u8])
            } else {
                image::Luma([30u8])
            }
        });
        img.save(path).unwrap();
    }

    #[test]
    fn test_missing_model_file_is_distinct() {
        let result = DepthPriorModel::load(Path::new("/nonexistent/depth_prior.json"));
        assert!(matches!(result, Err(Error::ModelFileMissing(_))));
    }

    #[test]
    fn test_model_json_round_trip() {
        let model = DepthPriorModel::default();
        let json = serde_json::to_string(&model).unwrap();
        let restored: DepthPriorModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model, restored);
    }

    #[test]
    fn test_estimate_matches_photo_dimensions() {
        let photo = test_dir().join("blob.png");
        write_test_photo(&photo, 32, 24);

        let map = DepthPriorModel::default().estimate(&photo).unwrap();
        assert_eq!(map.width(), 32);
        assert_eq!(map.height(), 24);
        assert_eq!(map.values().len(), 32 * 24);
        assert!(map.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_bright_centered_subject_is_nearer() {
        let photo = test_dir().join("blob.png");
        write_test_photo(&photo, 32, 24);

        let map = DepthPriorModel::default().estimate(&photo).unwrap();
        // Center of the bright blob vs. top-left background corner
        assert!(map.get(16, 12) > map.get(1, 1));
    }

    #[test]
    fn test_missing_photo_is_reported() {
        let result = DepthPriorModel::default().estimate(Path::new("/nonexistent/photo.jpg"));
        assert!(matches!(result, Err(Error::FileMissing(_))));
    }

    #[test]
    fn test_blur_preserves_constant_field() {
        let values = vec![0.5f32; 6 * 4];
        let blurred = box_blur(&values, 6, 4, 2);
        assert!(blurred.iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[tokio::test]
    async fn test_estimate_to_png_writes_depth_map() {
        let dir = test_dir();
        let photo = dir.join("blob.png");
        write_test_photo(&photo, 16, 16);

        let model_path = dir.join("depth_prior.json");
        std::fs::write(
            &model_path,
            serde_json::to_string(&DepthPriorModel::default()).unwrap(),
        )
        .unwrap();

        let out = dir.join("out/depth_map.png");
        let written = estimate_to_png(photo, model_path, out.clone()).await.unwrap();
        assert_eq!(written, out);
        assert!(out.exists());

        let reloaded = DepthMap::load_png(&out).unwrap();
        assert_eq!(reloaded.width(), 16);
        assert_eq!(reloaded.height(), 16);
    }
}
