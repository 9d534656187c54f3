use super::error::PreviewError;
use crate::tools::CancelToken;
use image::RgbImage;
use log::debug;
use std::fmt;
use std::path::Path;

/// 串流時間基準：每個 tick 代表 `numerator / denominator` 秒
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    pub numerator: i32,
    pub denominator: i32,
}

impl TimeBase {
    #[must_use]
    pub const fn new(numerator: i32, denominator: i32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    #[must_use]
    pub fn to_seconds(self, ticks: i64) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        ticks as f64 * f64::from(self.numerator) / f64::from(self.denominator)
    }

    #[must_use]
    pub fn ticks_from_seconds(self, seconds: f64) -> i64 {
        if self.numerator == 0 {
            return 0;
        }
        (seconds * f64::from(self.denominator) / f64::from(self.numerator)).round() as i64
    }

    /// 將 `ticks` 從此時間基準換算到 `to`，四捨五入
    #[must_use]
    pub fn rescale(self, ticks: i64, to: Self) -> i64 {
        let numerator =
            i128::from(ticks) * i128::from(self.numerator) * i128::from(to.denominator);
        let denominator = i128::from(self.denominator) * i128::from(to.numerator);
        if denominator == 0 {
            return 0;
        }

        let (numerator, denominator) = if denominator < 0 {
            (-numerator, -denominator)
        } else {
            (numerator, denominator)
        };
        let half = denominator / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };
        i64::try_from(rounded).unwrap_or(if rounded > 0 { i64::MAX } else { i64::MIN })
    }
}

/// 容器層級的全域時間基準（微秒）
pub const CONTAINER_TIME_BASE: TimeBase = TimeBase::new(1, 1_000_000);

/// 優先使用串流長度，其次把容器長度換算成串流時間基準
#[must_use]
pub fn resolve_duration(
    stream_duration: i64,
    container_duration: i64,
    time_base: TimeBase,
) -> Option<i64> {
    if stream_duration > 0 {
        return Some(stream_duration);
    }
    if container_duration > 0 {
        let rescaled = CONTAINER_TIME_BASE.rescale(container_duration, time_base);
        if rescaled > 0 {
            return Some(rescaled);
        }
    }
    None
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// 已定位的視訊串流資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub index: usize,
    pub time_base: TimeBase,
    /// 以串流 tick 為單位，`None` 表示無法取得
    pub duration: Option<i64>,
    pub width: u32,
    pub height: u32,
}

/// 解碼後的畫面內容
pub enum Picture {
    #[cfg(feature = "ffmpeg")]
    Native(ffmpeg_next::frame::Video),
    Rgb(RgbImage),
}

/// 一張解碼後的畫面
pub struct Frame {
    /// 顯示時間（串流 tick）
    pub timestamp: Option<i64>,
    pub(crate) picture: Picture,
}

impl Frame {
    /// 由已轉成 RGB 的畫面建立（非 FFmpeg 後端使用）
    #[must_use]
    pub const fn from_rgb(timestamp: Option<i64>, image: RgbImage) -> Self {
        Self {
            timestamp,
            picture: Picture::Rgb(image),
        }
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        match &self.picture {
            #[cfg(feature = "ffmpeg")]
            Picture::Native(video) => (video.width(), video.height()),
            Picture::Rgb(image) => image.dimensions(),
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("Frame")
            .field("timestamp", &self.timestamp)
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

/// Seek 重試階梯，依序嘗試，越後面越寬鬆
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekStrategy {
    /// 往前找最近的關鍵幀
    Keyframe,
    /// 往前找任意畫面（不限關鍵幀）
    AnyFrame,
    /// 換算成容器的全域時間基準後再 seek（部分容器的串流與容器時間基準不一致）
    ContainerTimeBase,
}

impl SeekStrategy {
    pub const LADDER: [Self; 3] = [Self::Keyframe, Self::AnyFrame, Self::ContainerTimeBase];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Opened,
    StreamLocated,
    DecoderOpened,
    Seeking,
    Decoding,
}

/// 一個媒體容器加上一個解碼器的獨佔工作階段
///
/// 不可跨執行緒共用；平行任務各自開啟自己的工作階段。
pub trait DecodeSession {
    fn stream(&self) -> &StreamInfo;

    fn state(&self) -> SessionState;

    /// 以單一策略 seek 到 `target`（串流 tick），成功時需清空解碼器緩衝
    fn seek_with(&mut self, strategy: SeekStrategy, target: i64) -> Result<(), PreviewError>;

    /// 讀取下一張畫面；`Ok(None)` 表示串流結束
    fn decode_next_frame(&mut self) -> Result<Option<Frame>, PreviewError>;

    /// 釋放所有原生資源，可重複呼叫
    fn close(&mut self);

    /// 依序嘗試 [`SeekStrategy::LADDER`]，回傳第一個成功的策略
    fn seek(&mut self, target: i64) -> Result<SeekStrategy, PreviewError> {
        for strategy in SeekStrategy::LADDER {
            match self.seek_with(strategy, target) {
                Ok(()) => {
                    debug!("seek 成功: target={target}, strategy={strategy:?}");
                    return Ok(strategy);
                }
                Err(e) => debug!("seek 失敗: target={target}, strategy={strategy:?}: {e}"),
            }
        }
        Err(PreviewError::SeekFailed(target))
    }
}

/// 開啟解碼工作階段的後端
pub trait DecoderBackend: Send + Sync {
    fn open_session(
        &self,
        path: &Path,
        cancel: &CancelToken,
    ) -> Result<Box<dyn DecodeSession>, PreviewError>;
}
