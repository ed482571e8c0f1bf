//! Error types shared across the application.
//!
//! Every background task reports failures through [`Error`]; the UI layer
//! converts them to status-line text via `Display`. The first three variants
//! get their own wording so the user can tell a missing model file, a bad
//! depth map shape and a missing depth map apart.

use std::path::PathBuf;

/// Standard result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The depth estimation model (weights) file is not on disk.
    #[error("depth estimation model file missing: {0}")]
    ModelFileMissing(PathBuf),

    /// The depth map is not a well-formed 2D array.
    #[error("depth map has incorrect dimensions: {width}x{height} with {len} values")]
    BadDepthShape {
        width: u32,
        height: u32,
        len: usize,
    },

    /// 3D generation was asked for before a depth map PNG exists on disk.
    #[error("depth map file not found: {0}")]
    DepthMapMissing(PathBuf),

    /// The input file vanished or was never there.
    #[error("file not found: {0}")]
    FileMissing(PathBuf),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A background task failed to join (panicked or was cancelled).
    #[error("task join error: {0}")]
    TaskJoin(String),
}
