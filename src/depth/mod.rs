//! Depth estimation module
//!
//! This module handles:
//! - The depth map type and its 8-bit grayscale PNG persistence (map.rs)
//! - The monocular depth estimator and its weights file (estimator.rs)

pub mod estimator;
pub mod map;
