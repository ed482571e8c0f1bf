//! Session-scoped state
//!
//! Tracks the artifacts produced since the app started: the saved upload and
//! the last generated depth map. Both are overwritten by each new action and
//! never persisted beyond their files on disk. The depth map path doubles as
//! the gate for 3D generation: no path, no surface.

use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Artifacts of the current session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Saved copy of the uploaded photo, if one was picked.
    image_path: Option<PathBuf>,
    /// Last generated depth map PNG, if any.
    depth_map_path: Option<PathBuf>,
    /// When the depth map was generated, for the status line.
    depth_generated_at: Option<DateTime<Local>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly saved upload.
    ///
    /// Any previous depth map belonged to the previous photo, so it is
    /// forgotten; the user generates a new one on demand.
    pub fn set_image(&mut self, path: PathBuf) {
        self.image_path = Some(path);
        self.depth_map_path = None;
        self.depth_generated_at = None;
    }

    /// Record a freshly written depth map.
    pub fn set_depth_map(&mut self, path: PathBuf) {
        self.depth_map_path = Some(path);
        self.depth_generated_at = Some(Local::now());
    }

    pub fn image_path(&self) -> Option<&PathBuf> {
        self.image_path.as_ref()
    }

    pub fn depth_map_path(&self) -> Option<&PathBuf> {
        self.depth_map_path.as_ref()
    }

    pub fn depth_generated_at(&self) -> Option<&DateTime<Local>> {
        self.depth_generated_at.as_ref()
    }

    /// Depth estimation needs an uploaded photo.
    pub fn can_estimate_depth(&self) -> bool {
        self.image_path.is_some()
    }

    /// 3D generation needs a depth map from this session.
    pub fn can_generate_model(&self) -> bool {
        self.image_path.is_some() && self.depth_map_path.is_some()
    }
}
