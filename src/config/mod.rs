pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, DEFAULT_MAX_FRAME_READS, DEFAULT_PREVIEW_MAX_EDGE, DEFAULT_PREVIEW_QUALITY,
    DEFAULT_PREVIEW_TIMEOUT_SECS, DEFAULT_SPRITE_COUNT, DEFAULT_SPRITE_QUALITY,
    DEFAULT_TOLERANCE_SECONDS, FileTypeLists, FileTypeTable, Language, MediaKind,
    PreviewSettings, SpriteSettings, UserSettings,
};
