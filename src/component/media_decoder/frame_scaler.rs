use super::error::PreviewError;
use super::session::{Frame, Picture};
use anyhow::{Context, Result};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use log::{debug, warn};
use rust_i18n::t;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::Builder;

/// 將畫面轉換為指定尺寸的 RGB24 緩衝區
pub fn scale_to_rgb(frame: &Frame, width: u32, height: u32) -> Result<RgbImage, PreviewError> {
    if width == 0 || height == 0 {
        return Err(PreviewError::ScaleFailed(
            t!("errors.invalid_size", width = width, height = height).to_string(),
        ));
    }

    match &frame.picture {
        #[cfg(feature = "ffmpeg")]
        Picture::Native(video) => scale_native(video, width, height),
        Picture::Rgb(image) => {
            if image.dimensions() == (width, height) {
                Ok(image.clone())
            } else {
                Ok(imageops::resize(image, width, height, FilterType::Triangle))
            }
        }
    }
}

#[cfg(feature = "ffmpeg")]
fn scale_native(
    video: &ffmpeg_next::frame::Video,
    width: u32,
    height: u32,
) -> Result<RgbImage, PreviewError> {
    use ffmpeg_next::format::Pixel;
    use ffmpeg_next::software::scaling;

    // 縮放內容只在這次轉換中使用，離開函式即釋放
    let mut scaler = scaling::Context::get(
        video.format(),
        video.width(),
        video.height(),
        Pixel::RGB24,
        width,
        height,
        scaling::Flags::BILINEAR,
    )
    .map_err(|e| {
        PreviewError::ScaleFailed(t!("errors.scaler_create", error = e.to_string()).to_string())
    })?;

    let mut rgb = ffmpeg_next::frame::Video::empty();
    scaler
        .run(video, &mut rgb)
        .map_err(|e| PreviewError::ScaleFailed(e.to_string()))?;

    pack_rows(rgb.data(0), rgb.stride(0), width, height)
}

/// 去除每列結尾的對齊填充，得到緊密排列的 RGB 緩衝區
fn pack_rows(data: &[u8], stride: usize, width: u32, height: u32) -> Result<RgbImage, PreviewError> {
    let row_bytes = width as usize * 3;
    if row_bytes == 0 || stride < row_bytes {
        return Err(PreviewError::ScaleFailed(
            t!("errors.stride_mismatch", stride = stride, required = row_bytes).to_string(),
        ));
    }

    let mut buffer = Vec::with_capacity(row_bytes * height as usize);
    for row in data.chunks(stride).take(height as usize) {
        let pixels = row
            .get(..row_bytes)
            .ok_or_else(|| PreviewError::ScaleFailed(t!("errors.frame_data_short").to_string()))?;
        buffer.extend_from_slice(pixels);
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| PreviewError::ScaleFailed(t!("errors.buffer_mismatch").to_string()))
}

/// 儲存為 JPEG，任何失敗都只記錄並回傳 `false`
///
/// 先寫入同目錄下名稱唯一的暫存檔再改名，半寫入的檔案不會被當成快取命中，
/// 同時寫入同一路徑的任務也不會互相覆蓋暫存內容。
#[must_use]
pub fn save_as_jpeg(image: &RgbImage, path: &Path, quality: u8) -> bool {
    match write_jpeg(image, path, quality) {
        Ok(()) => {
            debug!("縮圖已儲存: {} (q={quality})", path.display());
            true
        }
        Err(e) => {
            warn!(
                "{}",
                t!("log.save_failed", path = path.display(), error = format!("{e:#}"))
            );
            false
        }
    }
}

fn write_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    // 未改名前離開時暫存檔會自動刪除
    let mut staged = Builder::new()
        .prefix(".thumb-")
        .suffix(".part")
        .tempfile_in(dir)
        .with_context(|| t!("errors.create_temp", path = dir.display()))?;

    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100))
            .encode_image(image)
            .context(t!("errors.encode_jpeg"))?;
        writer.flush().context(t!("errors.write_file"))?;
    }

    staged
        .persist(path)
        .with_context(|| t!("errors.persist", path = path.display()))?;
    Ok(())
}

/// 固定寬度、等比例高度（影片預覽使用）
#[must_use]
pub fn proportional_size(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (target_width, target_width);
    }
    let scaled = u64::from(height) * u64::from(target_width) / u64::from(width);
    (target_width, u32::try_from(scaled).unwrap_or(u32::MAX).max(1))
}

/// 等比例縮小到 `max_edge` 方框內，不放大
#[must_use]
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width.max(1), height.max(1));
    }

    let shrink = |long: u32, short: u32| {
        let scaled = u64::from(short) * u64::from(max_edge) / u64::from(long);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    };

    if width >= height {
        (max_edge, shrink(width, height))
    } else {
        (shrink(height, width), max_edge)
    }
}
