//! Application configuration
//!
//! Paths for the two fixed artifact directories and the depth model file.
//! The config is plain JSON next to the executable's working directory so a
//! user can point the app at a different model without recompiling. Missing
//! config falls back to the defaults the app has always used.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the optional config file, looked up in the working directory.
const CONFIG_FILE: &str = "depth-studio.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Where uploaded photos are persisted (keyed by original filename).
    pub assets_dir: PathBuf,
    /// Where the generated depth map PNG is written.
    pub output_dir: PathBuf,
    /// Weights file for the depth estimator.
    pub model_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            output_dir: PathBuf::from("output"),
            model_path: PathBuf::from("models/depth_prior.json"),
        }
    }
}

impl AppConfig {
    /// Load the config file from the working directory, or fall back to
    /// defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Ensure both artifact directories exist. Called once at startup.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.assets_dir)?;
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Fixed location of the depth map PNG inside the output directory.
    pub fn depth_map_path(&self) -> PathBuf {
        self.output_dir.join("depth_map.png")
    }

    /// Resolve the model file: the configured path wins, otherwise look in
    /// the per-user data directory (~/.local/share/depth-studio on Linux).
    pub fn resolve_model_path(&self) -> PathBuf {
        if self.model_path.exists() {
            return self.model_path.clone();
        }

        if let Some(mut fallback) = dirs::data_dir().or_else(dirs::home_dir) {
            fallback.push("depth-studio");
            fallback.push("depth_prior.json");
            if fallback.exists() {
                return fallback;
            }
        }

        // Neither exists; return the configured path so the estimator can
        // report it in the missing-model error.
        self.model_path.clone()
    }
}
