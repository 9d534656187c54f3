//! 媒體解碼元件
//!
//! - 解碼工作階段：開啟容器 → 定位視訊串流 → 開啟解碼器 → seek / 解碼
//! - 畫面轉換：原生像素格式 → RGB → JPEG

mod error;
#[cfg(feature = "ffmpeg")]
mod ffmpeg_session;
mod frame_scaler;
mod session;

pub use error::PreviewError;
#[cfg(feature = "ffmpeg")]
pub use ffmpeg_session::{FfmpegBackend, FfmpegDecodeSession, MAX_PACKET_READS, init_ffmpeg};
pub use frame_scaler::{fit_within, proportional_size, save_as_jpeg, scale_to_rgb};
pub use session::{
    CONTAINER_TIME_BASE, DecodeSession, DecoderBackend, Frame, SeekStrategy, SessionState,
    StreamInfo, TimeBase, resolve_duration,
};
