use crate::config::UserSettings;
use crate::tools::{MediaReference, ensure_directory_exists};
use log::{debug, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};

const APP_CACHE_DIR: &str = "media_preview";

/// 快取子目錄種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Previews,
    Sprites,
}

impl CacheKind {
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Previews => "previews",
            Self::Sprites => "sprites",
        }
    }
}

/// 媒體參照到快取檔案路徑的對應
///
/// 相同的參照與索引永遠得到相同路徑，檔案存在即代表快取命中，不需要索引。
#[derive(Debug, Clone)]
pub struct CacheLocator {
    root: PathBuf,
}

impl CacheLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 使用設定中的快取根目錄，否則使用系統快取目錄
    #[must_use]
    pub fn from_settings(settings: &UserSettings) -> Self {
        let root = settings.cache_root.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_CACHE_DIR)
        });
        Self::new(root)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn cache_dir(&self, kind: CacheKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// 取得（必要時建立）快取子目錄
    ///
    /// 建立失敗只記錄警告，之後寫入縮圖時才會失敗。
    pub fn resolve_cache_dir(&self, kind: CacheKind) -> PathBuf {
        let dir = self.cache_dir(kind);
        match ensure_directory_exists(&dir) {
            Ok(()) => debug!("使用快取目錄: {}", dir.display()),
            Err(e) => warn!(
                "{}",
                t!("log.cache_dir_failed", path = dir.display(), error = e.to_string())
            ),
        }
        dir
    }

    /// `frame_index` 為 `None` 時回傳單張預覽路徑，否則回傳該索引的時間軸縮圖路徑
    #[must_use]
    pub fn artifact_path(&self, reference: &MediaReference, frame_index: Option<usize>) -> PathBuf {
        let key = reference.content_key();
        match frame_index {
            None => self.cache_dir(CacheKind::Previews).join(format!("{key}.jpg")),
            Some(index) => self
                .cache_dir(CacheKind::Sprites)
                .join(format!("{key}_sprite_{index}.jpg")),
        }
    }

    #[must_use]
    pub fn preview_cache_path(&self) -> PathBuf {
        self.cache_dir(CacheKind::Previews)
    }
}
