use rust_i18n::t;
use std::fmt;
use thiserror::Error;

/// 預覽與時間軸縮圖產生過程中的錯誤
///
/// 所有錯誤都在各自的任務內處理：單張預覽轉為空路徑，時間軸縮圖則略過該索引。
/// 訊息依目前語系輸出。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    CannotOpenContainer(String),
    NoVideoStream,
    NoDecoder,
    CannotOpenDecoder(String),
    SeekFailed(i64),
    DecodeFailed(String),
    ScaleFailed(String),
    SaveFailed(String),
    CacheDirUnavailable(String),
    DurationUnknown,
    CannotLoadImage(String),
    UnsupportedMedia(String),
    Cancelled,
    SessionClosed,
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::CannotOpenContainer(detail) => {
                t!("errors.cannot_open_container", detail = detail)
            }
            Self::NoVideoStream => t!("errors.no_video_stream"),
            Self::NoDecoder => t!("errors.no_decoder"),
            Self::CannotOpenDecoder(detail) => t!("errors.cannot_open_decoder", detail = detail),
            Self::SeekFailed(target) => t!("errors.seek_failed", target = target),
            Self::DecodeFailed(detail) => t!("errors.decode_failed", detail = detail),
            Self::ScaleFailed(detail) => t!("errors.scale_failed", detail = detail),
            Self::SaveFailed(path) => t!("errors.save_failed", path = path),
            Self::CacheDirUnavailable(path) => t!("errors.cache_dir_unavailable", path = path),
            Self::DurationUnknown => t!("errors.duration_unknown"),
            Self::CannotLoadImage(detail) => t!("errors.cannot_load_image", detail = detail),
            Self::UnsupportedMedia(path) => t!("errors.unsupported_media", path = path),
            Self::Cancelled => t!("errors.cancelled"),
            Self::SessionClosed => t!("errors.session_closed"),
        };
        write!(f, "{message}")
    }
}
