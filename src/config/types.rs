use rust_i18n::t;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// 預覽縮圖的最長邊（像素）
pub const DEFAULT_PREVIEW_MAX_EDGE: u32 = 240;
/// 單張預覽圖的 JPEG 品質
pub const DEFAULT_PREVIEW_QUALITY: u8 = 90;
/// 預覽生成的看門狗逾時（秒）
pub const DEFAULT_PREVIEW_TIMEOUT_SECS: u64 = 5;
/// 平行產生時間軸縮圖時的 JPEG 品質
pub const DEFAULT_SPRITE_QUALITY: u8 = 40;
pub const DEFAULT_SPRITE_COUNT: usize = 10;
/// 單一縮圖任務最多讀取的畫面數
pub const DEFAULT_MAX_FRAME_READS: usize = 200;
/// 判定「已找到目標畫面」的容差（秒）
pub const DEFAULT_TOLERANCE_SECONDS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => t!("media_kind.image"),
            Self::Video => t!("media_kind.video"),
            Self::Unsupported => t!("media_kind.unsupported"),
        };
        write!(f, "{name}")
    }
}

/// 介面語系
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    EnUs,
    #[default]
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::EnUs, Self::ZhTw];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnUs => "English",
            Self::ZhTw => "繁體中文",
        };
        write!(f, "{name}")
    }
}

/// `file_type_table.json` 的原始格式
#[derive(Debug, Clone, Deserialize)]
pub struct FileTypeLists {
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

/// 副檔名查詢表，載入時統一轉為小寫
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "FileTypeLists")]
pub struct FileTypeTable {
    image_extensions: HashSet<String>,
    video_extensions: HashSet<String>,
}

impl From<FileTypeLists> for FileTypeTable {
    fn from(lists: FileTypeLists) -> Self {
        let lowercase = |exts: Vec<String>| -> HashSet<String> {
            exts.into_iter().map(|ext| ext.to_lowercase()).collect()
        };
        Self {
            image_extensions: lowercase(lists.image_file),
            video_extensions: lowercase(lists.video_file),
        }
    }
}

impl FileTypeTable {
    /// 依副檔名判斷媒體種類（不區分大小寫）
    #[must_use]
    pub fn classify(&self, path: &Path) -> MediaKind {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            return MediaKind::Unsupported;
        };
        let dotted = format!(".{}", ext.to_lowercase());

        if self.image_extensions.contains(&dotted) {
            MediaKind::Image
        } else if self.video_extensions.contains(&dotted) {
            MediaKind::Video
        } else {
            MediaKind::Unsupported
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    pub max_edge: u32,
    pub quality: u8,
    pub timeout_secs: u64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_PREVIEW_MAX_EDGE,
            quality: DEFAULT_PREVIEW_QUALITY,
            timeout_secs: DEFAULT_PREVIEW_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteSettings {
    pub default_count: usize,
    pub quality: u8,
    pub tolerance_seconds: f64,
    pub max_frame_reads: usize,
    /// 未設定時使用主機的可用平行度
    pub workers: Option<usize>,
}

impl Default for SpriteSettings {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_SPRITE_COUNT,
            quality: DEFAULT_SPRITE_QUALITY,
            tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            max_frame_reads: DEFAULT_MAX_FRAME_READS,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    /// 快取根目錄，未設定時使用系統快取目錄
    pub cache_root: Option<PathBuf>,
    pub preview: PreviewSettings,
    pub sprite: SpriteSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
