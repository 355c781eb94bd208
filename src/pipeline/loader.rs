/// Photo loader
///
/// Reads the picked file and decodes it on tokio's blocking pool so the UI
/// thread never waits on disk or codec work.

use std::path::{Path, PathBuf};
use tokio::task;

use super::{decode, PipelineError, SourceImage};

/// File extensions offered in the photo picker
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff", "ico", "tga", "pnm",
];

/// Load and decode a photo from disk
///
/// # Arguments
/// * `path` - The picked file
/// * `max_dimension` - Longest side allowed after decode (0 = keep full size)
pub async fn load_photo(path: PathBuf, max_dimension: u32) -> Result<SourceImage, PipelineError> {
    task::spawn_blocking(move || load_photo_blocking(&path, max_dimension))
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
}

/// Blocking implementation of photo loading
fn load_photo_blocking(path: &Path, max_dimension: u32) -> Result<SourceImage, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let source = decode(&bytes, max_dimension)?;

    let (width, height) = source.pixels().dimensions();
    let (original_width, original_height) = source.original_size();
    log::info!(
        "📷 Loaded {}: {}x{} (working copy {}x{})",
        path.file_name().unwrap_or_default().to_string_lossy(),
        original_width,
        original_height,
        width,
        height
    );

    Ok(source)
}
