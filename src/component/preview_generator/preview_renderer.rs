use crate::component::media_decoder::{
    DecoderBackend, PreviewError, fit_within, proportional_size, save_as_jpeg, scale_to_rgb,
};
use crate::config::{MediaKind, PreviewSettings};
use crate::tools::{CancelToken, MediaReference};
use image::imageops::FilterType;
use log::debug;
use rust_i18n::t;
use std::path::Path;

/// 依媒體類型產生單張預覽圖並寫入 `output`
pub fn render_preview(
    backend: &dyn DecoderBackend,
    reference: &MediaReference,
    output: &Path,
    settings: &PreviewSettings,
    cancel: &CancelToken,
) -> Result<(), PreviewError> {
    match reference.kind() {
        MediaKind::Image => render_image_preview(reference.path(), output, settings),
        MediaKind::Video => render_video_preview(backend, reference.path(), output, settings, cancel),
        MediaKind::Unsupported => Err(PreviewError::UnsupportedMedia(
            reference.path().display().to_string(),
        )),
    }
}

/// 圖片：縮小到方框內（Lanczos3）
pub fn render_image_preview(
    source: &Path,
    output: &Path,
    settings: &PreviewSettings,
) -> Result<(), PreviewError> {
    let image = image::open(source)
        .map_err(|e| PreviewError::CannotLoadImage(format!("{}: {e}", source.display())))?;

    let (width, height) = fit_within(image.width(), image.height(), settings.max_edge);
    let thumbnail = image.resize(width, height, FilterType::Lanczos3).to_rgb8();

    if save_as_jpeg(&thumbnail, output, settings.quality) {
        Ok(())
    } else {
        Err(save_error(output))
    }
}

/// 影片：取約三分之一長度處的一張畫面
///
/// 長度未知時從頭開始；seek 失敗只記錄，沿用目前位置繼續解碼。
pub fn render_video_preview(
    backend: &dyn DecoderBackend,
    source: &Path,
    output: &Path,
    settings: &PreviewSettings,
    cancel: &CancelToken,
) -> Result<(), PreviewError> {
    let mut session = backend.open_session(source, cancel)?;

    let target = session.stream().duration.map_or(0, |d| d / 3);
    if let Err(e) = session.seek(target) {
        debug!("預覽 seek 失敗，從目前位置解碼: {e}");
    }

    if cancel.is_cancelled() {
        session.close();
        return Err(PreviewError::Cancelled);
    }

    let frame = session.decode_next_frame();
    session.close();
    let frame = frame?
        .ok_or_else(|| PreviewError::DecodeFailed(t!("errors.no_frame_in_stream").to_string()))?;

    let (src_width, src_height) = frame.dimensions();
    let (width, height) = proportional_size(src_width, src_height, settings.max_edge);
    let rgb = scale_to_rgb(&frame, width, height)?;

    if cancel.is_cancelled() {
        return Err(PreviewError::Cancelled);
    }

    if save_as_jpeg(&rgb, output, settings.quality) {
        Ok(())
    } else {
        Err(save_error(output))
    }
}

/// 輸出目錄不存在時視為快取目錄無法使用
pub(crate) fn save_error(output: &Path) -> PreviewError {
    match output.parent() {
        Some(parent) if !parent.is_dir() => {
            PreviewError::CacheDirUnavailable(parent.display().to_string())
        }
        _ => PreviewError::SaveFailed(output.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::TempDir;

    #[test]
    fn test_render_image_preview_fits_box() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("photo.png");
        RgbImage::from_pixel(960, 480, Rgb([30, 60, 90]))
            .save(&source)
            .unwrap();
        let output = dir.path().join("preview.jpg");

        render_image_preview(&source, &output, &PreviewSettings::default()).unwrap();

        let preview = image::open(&output).unwrap();
        assert_eq!((preview.width(), preview.height()), (240, 120));
    }

    #[test]
    fn test_render_image_preview_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("broken.png");
        std::fs::write(&source, b"not an image").unwrap();

        let result = render_image_preview(
            &source,
            &dir.path().join("preview.jpg"),
            &PreviewSettings::default(),
        );
        assert!(matches!(result, Err(PreviewError::CannotLoadImage(_))));
    }

    #[test]
    fn test_save_error_detects_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone").join("a.jpg");
        assert!(matches!(
            save_error(&missing),
            PreviewError::CacheDirUnavailable(_)
        ));
        assert!(matches!(
            save_error(&dir.path().join("a.jpg")),
            PreviewError::SaveFailed(_)
        ));
    }
}
