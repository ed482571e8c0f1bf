//! 3D model generation module
//!
//! Turns a saved depth map plus the source photo into a renderable surface
//! grid (surface.rs).

pub mod surface;
