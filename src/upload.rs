//! Persisting picked photos into the assets directory
//!
//! The picked file is copied byte-for-byte under its original filename.
//! Re-picking a file with the same name overwrites the previous copy.

use std::path::{Path, PathBuf};
use tokio::task;

use crate::error::{Error, Result};

/// Copy a picked photo into the assets directory.
///
/// Returns the path of the saved copy. Runs on the blocking pool because the
/// source may be a large photo on slow storage.
pub async fn save_upload(source: PathBuf, assets_dir: PathBuf) -> Result<PathBuf> {
    task::spawn_blocking(move || save_upload_blocking(&source, &assets_dir))
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// Blocking implementation of the upload copy.
fn save_upload_blocking(source: &Path, assets_dir: &Path) -> Result<PathBuf> {
    if !source.exists() {
        return Err(Error::FileMissing(source.to_path_buf()));
    }

    let filename = source
        .file_name()
        .ok_or_else(|| Error::FileMissing(source.to_path_buf()))?;

    std::fs::create_dir_all(assets_dir)?;
    let dest = assets_dir.join(filename);

    let bytes = std::fs::read(source)?;
    std::fs::write(&dest, &bytes)?;

    Ok(dest)
}
