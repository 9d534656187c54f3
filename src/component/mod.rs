//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod event_sink;
pub mod media_decoder;
pub mod preview_engine;
pub mod preview_generator;
pub mod sprite_generator;

pub use event_sink::{ChannelEventSink, EventSink, LogEventSink, MediaEvent, NullEventSink};
pub use preview_engine::MediaPreviewEngine;
pub use preview_generator::{PreviewGenerator, PreviewSnapshot, PreviewState};
pub use sprite_generator::SpriteGenerator;
