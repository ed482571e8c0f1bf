//! UI widgets
//!
//! This module provides the custom canvas widgets:
//! - Interactive 3D surface viewport with orbit/zoom (viewport.rs)

pub mod viewport;
