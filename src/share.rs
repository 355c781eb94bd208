/// Share the filtered photo by exporting it to a file
use image::{DynamicImage, ImageFormat};
use std::path::{Path, PathBuf};

use crate::pipeline::{PipelineError, RenderedImage};

/// Label shown in the save dialog and used as the suggested file name
pub const SHARE_PREVIEW_LABEL: &str = "Instafilter Image";

/// Suggested file name for the save dialog
pub fn suggested_file_name() -> String {
    format!("{SHARE_PREVIEW_LABEL}.png")
}

/// Encode `output` to `path` on the blocking pool.
/// The format follows the file extension; unknown extensions get PNG.
pub async fn export(output: RenderedImage, path: PathBuf) -> Result<PathBuf, PipelineError> {
    tokio::task::spawn_blocking(move || {
        export_blocking(&output, &path)?;
        Ok(path)
    })
    .await
    .map_err(|e| PipelineError::Task(e.to_string()))?
}

fn export_blocking(output: &RenderedImage, path: &Path) -> Result<(), PipelineError> {
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    let image = DynamicImage::ImageRgba8(output.pixels().clone());

    // JPEG has no alpha channel
    let image = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
        _ => image,
    };

    image
        .save_with_format(path, format)
        .map_err(|e| PipelineError::Export {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let (width, height) = output.dimensions();
    log::info!(
        "📤 Shared {}x{} {} image ({:?}) to {}",
        width,
        height,
        output.filter(),
        output.params(),
        path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::effects::test_support::gradient;
    use crate::filter::{FilterKind, Intensity};
    use crate::pipeline::{Pipeline, SourceImage};

    fn rendered() -> RenderedImage {
        let mut pipeline = Pipeline::new(FilterKind::Vignette, Intensity::new(0.1).unwrap());
        let ticket = pipeline.begin_load();
        pipeline
            .finish_load(ticket, Ok(SourceImage::new(gradient(24, 12))))
            .unwrap();
        pipeline.render_now().unwrap().unwrap();
        pipeline.output().unwrap().clone()
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(suggested_file_name(), "Instafilter Image.png");
    }

    #[tokio::test]
    async fn test_export_png_and_jpeg() {
        let dir = tempfile::tempdir().unwrap();

        for name in ["out.png", "out.jpg"] {
            let path = export(rendered(), dir.path().join(name)).await.unwrap();
            let reopened = image::open(&path).unwrap();
            assert_eq!((reopened.width(), reopened.height()), (24, 12));
        }
    }

    #[tokio::test]
    async fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");

        let result = export(rendered(), path).await;

        assert!(matches!(result, Err(PipelineError::Export { .. })));
    }
}
