//! The depth map type
//!
//! A depth map is a row-major 2D array of per-pixel depth values normalized
//! to [0,1] (1.0 = closest to camera). It is persisted as an 8-bit grayscale
//! PNG at a fixed path in the output directory and reloaded from there by the
//! 3D generator.

use image::GrayImage;
use std::path::Path;

use crate::error::{Error, Result};

/// A normalized floating point depth map.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap {
    data: Vec<f32>,
    width: u32,
    height: u32,
}

impl DepthMap {
    /// Build a depth map from row-major values.
    ///
    /// Rejects empty dimensions and any mismatch between the value count and
    /// `width * height`, so a successfully constructed map is always a
    /// well-formed 2D array.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) {
            return Err(Error::BadDepthShape {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth value at pixel (x, y).
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn values(&self) -> &[f32] {
        &self.data
    }

    /// Rescale values to span the full [0,1] range.
    ///
    /// A flat map (max == min) normalizes to all zeros rather than dividing
    /// by zero.
    pub fn normalized(mut self) -> Self {
        let min = self.data.iter().copied().fold(f32::INFINITY, f32::min);
        let max = self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = max - min;

        if range > f32::EPSILON {
            for v in &mut self.data {
                *v = (*v - min) / range;
            }
        } else {
            for v in &mut self.data {
                *v = 0.0;
            }
        }
        self
    }

    /// Quantize to an 8-bit grayscale image (value * 255, clamped).
    pub fn to_luma8(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = (self.get(x, y) * 255.0).clamp(0.0, 255.0);
                *img.get_pixel_mut(x, y) = image::Luma([v as u8]);
            }
        }
        img
    }

    /// Write the map as an 8-bit grayscale PNG, creating the parent
    /// directory if needed. Overwrites any previous map at that path.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_luma8().save(path)?;
        Ok(())
    }

    /// Reload a depth map from its grayscale PNG.
    ///
    /// A missing file is the distinct [`Error::DepthMapMissing`] case, which
    /// the UI reports separately from decode failures.
    pub fn load_png(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DepthMapMissing(path.to_path_buf()));
        }

        let img = image::open(path)?.into_luma8();
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|p| p.0[0] as f32 / 255.0).collect();

        Self::new(width, height, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_validated() {
        assert!(DepthMap::new(4, 3, vec![0.0; 12]).is_ok());

        let short = DepthMap::new(4, 3, vec![0.0; 7]);
        assert!(matches!(short, Err(Error::BadDepthShape { len: 7, .. })));

        let empty = DepthMap::new(0, 3, vec![]);
        assert!(matches!(empty, Err(Error::BadDepthShape { .. })));
    }

    #[test]
    fn test_normalization_spans_unit_range() {
        let map = DepthMap::new(2, 2, vec![2.0, 4.0, 6.0, 10.0])
            .unwrap()
            .normalized();

        assert_eq!(map.get(0, 0), 0.0);
        assert_eq!(map.get(1, 1), 1.0);
        assert!(map.values().iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_flat_map_normalizes_to_zero() {
        let map = DepthMap::new(2, 1, vec![5.0, 5.0]).unwrap().normalized();
        assert_eq!(map.values(), &[0.0, 0.0]);
    }

    #[test]
    fn test_quantization() {
        let map = DepthMap::new(3, 1, vec![0.0, 0.5, 1.0]).unwrap();
        let img = map.to_luma8();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 127);
        assert_eq!(img.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn test_png_round_trip() {
        let path = std::env::temp_dir().join("depth-studio-map-test/depth_map.png");
        let map = DepthMap::new(2, 2, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        map.save_png(&path).unwrap();

        let loaded = DepthMap::load_png(&path).unwrap();
        assert_eq!(loaded.width(), 2);
        assert_eq!(loaded.height(), 2);
        // 8-bit quantization: values survive to within one step
        for (a, b) in map.values().iter().zip(loaded.values()) {
            assert!((a - b).abs() < 1.0 / 255.0 + f32::EPSILON);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_png_is_distinct() {
        let path = std::env::temp_dir().join("depth-studio-map-test/none.png");
        let result = DepthMap::load_png(&path);
        assert!(matches!(result, Err(Error::DepthMapMissing(_))));
    }
}
