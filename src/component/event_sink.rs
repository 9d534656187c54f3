use log::{debug, info, warn};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// 產生流程對外發佈的事件
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    PreviewReady(String),
    PreviewLoadingChanged(bool),
    SpriteProgress { completed: usize, total: usize },
    SpritesGenerated(Vec<PathBuf>),
    GenerationError(String),
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: MediaEvent);
}

/// 丟棄所有事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: MediaEvent) {}
}

/// 將事件寫入日誌
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: MediaEvent) {
        match event {
            MediaEvent::PreviewReady(path) if path.is_empty() => {
                info!("{}", t!("log.preview_unavailable"));
            }
            MediaEvent::PreviewReady(path) => info!("{}", t!("log.preview_ready", path = path)),
            MediaEvent::PreviewLoadingChanged(loading) => debug!("預覽載入中: {loading}"),
            MediaEvent::SpriteProgress { completed, total } => {
                debug!("時間軸縮圖進度: {completed}/{total}");
            }
            MediaEvent::SpritesGenerated(paths) => {
                info!("{}", t!("log.sprites_generated", count = paths.len()));
            }
            MediaEvent::GenerationError(message) => warn!("{message}"),
        }
    }
}

/// 將事件轉送到 channel（接收端不存在時直接丟棄）
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    sender: Sender<MediaEvent>,
}

impl ChannelEventSink {
    #[must_use]
    pub const fn new(sender: Sender<MediaEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: MediaEvent) {
        let _ = self.sender.send(event);
    }
}
