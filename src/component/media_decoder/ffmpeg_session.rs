//! 以 FFmpeg（ffmpeg-next）實作的解碼工作階段

use super::error::PreviewError;
use super::session::{
    CONTAINER_TIME_BASE, DecodeSession, DecoderBackend, Frame, Picture, SeekStrategy,
    SessionState, StreamInfo, TimeBase, resolve_duration,
};
use crate::tools::CancelToken;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{Packet, codec, decoder, format, frame, media};
use log::{debug, warn};
use rust_i18n::t;
use std::os::raw::c_int;
use std::path::Path;
use std::sync::Once;

/// 單次 `decode_next_frame` 最多讀取的封包數
///
/// 部分 seek 會落在離可解碼畫面很遠的位置，不設上限可能卡住。
pub const MAX_PACKET_READS: usize = 200;

static FFMPEG_INIT: Once = Once::new();

/// 初始化 FFmpeg 並把函式庫日誌降到 error
pub fn init_ffmpeg() {
    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg::init() {
            warn!("{}", t!("log.ffmpeg_init_failed", error = e.to_string()));
        }
        ffmpeg::util::log::set_level(ffmpeg::util::log::Level::Error);
    });
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegBackend;

impl DecoderBackend for FfmpegBackend {
    fn open_session(
        &self,
        path: &Path,
        cancel: &CancelToken,
    ) -> Result<Box<dyn DecodeSession>, PreviewError> {
        init_ffmpeg();
        let session = FfmpegDecodeSession::open(path, cancel.clone())?;
        Ok(Box::new(session))
    }
}

pub struct FfmpegDecodeSession {
    // close() 依此順序釋放：解碼器 → 容器
    decoder: Option<decoder::Video>,
    input: Option<format::context::Input>,
    stream: StreamInfo,
    cancel: CancelToken,
    state: SessionState,
    eof_sent: bool,
}

impl FfmpegDecodeSession {
    /// 開啟容器、定位視訊串流並開啟解碼器
    ///
    /// 任一步驟失敗時，已取得的資源隨區域變數一併釋放。
    pub fn open(path: &Path, cancel: CancelToken) -> Result<Self, PreviewError> {
        let input = format::input(&path).map_err(|e| {
            PreviewError::CannotOpenContainer(format!("{}: {e}", path.display()))
        })?;
        debug!("已開啟容器: {}", path.display());

        let mut stream = locate_video_stream(&input)?;
        debug!(
            "視訊串流 #{}: time_base={}, duration={:?}",
            stream.index, stream.time_base, stream.duration
        );

        let decoder = open_decoder(&input, stream.index)?;
        stream.width = decoder.width();
        stream.height = decoder.height();

        Ok(Self {
            decoder: Some(decoder),
            input: Some(input),
            stream,
            cancel,
            state: SessionState::DecoderOpened,
            eof_sent: false,
        })
    }
}

fn locate_video_stream(input: &format::context::Input) -> Result<StreamInfo, PreviewError> {
    let stream = input
        .streams()
        .find(|s| s.parameters().medium() == media::Type::Video)
        .ok_or(PreviewError::NoVideoStream)?;

    let rational = stream.time_base();
    let time_base = TimeBase::new(rational.numerator(), rational.denominator());

    Ok(StreamInfo {
        index: stream.index(),
        time_base,
        duration: resolve_duration(stream.duration(), input.duration(), time_base),
        width: 0,
        height: 0,
    })
}

fn open_decoder(
    input: &format::context::Input,
    stream_index: usize,
) -> Result<decoder::Video, PreviewError> {
    let stream = input
        .stream(stream_index)
        .ok_or(PreviewError::NoVideoStream)?;
    let parameters = stream.parameters();

    if decoder::find(parameters.id()).is_none() {
        return Err(PreviewError::NoDecoder);
    }

    let context = codec::context::Context::from_parameters(parameters)
        .map_err(|e| PreviewError::CannotOpenDecoder(e.to_string()))?;

    context.decoder().video().map_err(|e| match e {
        ffmpeg::Error::DecoderNotFound => PreviewError::NoDecoder,
        other => PreviewError::CannotOpenDecoder(other.to_string()),
    })
}

fn seek_frame(
    input: &mut format::context::Input,
    stream_index: c_int,
    target: i64,
    flags: c_int,
) -> Result<(), ffmpeg::Error> {
    // SAFETY: input 為此工作階段獨佔且仍開啟中的格式內容
    let ret = unsafe { ffmpeg::ffi::av_seek_frame(input.as_mut_ptr(), stream_index, target, flags) };
    if ret < 0 {
        Err(ffmpeg::Error::from(ret))
    } else {
        Ok(())
    }
}

fn wrap_frame(decoded: frame::Video) -> Frame {
    Frame {
        timestamp: decoded.timestamp().or_else(|| decoded.pts()),
        picture: Picture::Native(decoded),
    }
}

impl DecodeSession for FfmpegDecodeSession {
    fn stream(&self) -> &StreamInfo {
        &self.stream
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn seek_with(&mut self, strategy: SeekStrategy, target: i64) -> Result<(), PreviewError> {
        let (Some(input), Some(decoder)) = (self.input.as_mut(), self.decoder.as_mut()) else {
            return Err(PreviewError::SessionClosed);
        };
        self.state = SessionState::Seeking;

        let stream_index = self.stream.index as c_int;
        let backward = ffmpeg::ffi::AVSEEK_FLAG_BACKWARD as c_int;
        let any = ffmpeg::ffi::AVSEEK_FLAG_ANY as c_int;

        let result = match strategy {
            SeekStrategy::Keyframe => seek_frame(input, stream_index, target, backward),
            SeekStrategy::AnyFrame => seek_frame(input, stream_index, target, backward | any),
            SeekStrategy::ContainerTimeBase => {
                let global = self.stream.time_base.rescale(target, CONTAINER_TIME_BASE);
                input.seek(global, ..global)
            }
        };

        result.map_err(|e| {
            debug!("{strategy:?} seek 失敗: {e}");
            PreviewError::SeekFailed(target)
        })?;

        decoder.flush();
        self.eof_sent = false;
        Ok(())
    }

    fn decode_next_frame(&mut self) -> Result<Option<Frame>, PreviewError> {
        let (Some(input), Some(decoder)) = (self.input.as_mut(), self.decoder.as_mut()) else {
            return Err(PreviewError::SessionClosed);
        };
        self.state = SessionState::Decoding;

        let mut decoded = frame::Video::empty();
        if decoder.receive_frame(&mut decoded).is_ok() {
            return Ok(Some(wrap_frame(decoded)));
        }
        if self.eof_sent {
            return Ok(None);
        }

        for _ in 0..MAX_PACKET_READS {
            if self.cancel.is_cancelled() {
                return Err(PreviewError::Cancelled);
            }

            let mut packet = Packet::empty();
            match packet.read(input) {
                Ok(()) => {}
                Err(ffmpeg::Error::Eof) => {
                    // 送出 EOF 後取出解碼器內剩餘的畫面
                    self.eof_sent = true;
                    if let Err(e) = decoder.send_eof() {
                        debug!("送出 EOF 失敗: {e}");
                    }
                    return Ok(decoder
                        .receive_frame(&mut decoded)
                        .ok()
                        .map(|()| wrap_frame(decoded)));
                }
                Err(e) => return Err(PreviewError::DecodeFailed(e.to_string())),
            }

            if packet.stream() != self.stream.index {
                continue;
            }

            if let Err(e) = decoder.send_packet(&packet) {
                debug!("送出封包失敗，略過: {e}");
                continue;
            }

            if decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(wrap_frame(decoded)));
            }
        }

        Err(PreviewError::DecodeFailed(
            t!("errors.packet_budget", count = MAX_PACKET_READS).to_string(),
        ))
    }

    fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        drop(self.decoder.take());
        drop(self.input.take());
        self.state = SessionState::Closed;
        debug!("解碼工作階段已關閉 (stream #{})", self.stream.index);
    }
}

impl Drop for FfmpegDecodeSession {
    fn drop(&mut self) {
        self.close();
    }
}
