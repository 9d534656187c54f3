use crate::component::event_sink::EventSink;
use crate::component::media_decoder::DecoderBackend;
use crate::component::preview_generator::{PreviewGenerator, PreviewState};
use crate::component::sprite_generator::SpriteGenerator;
use crate::config::{Config, FileTypeTable};
use crate::tools::{CacheLocator, MediaReference, TimestampRegistry};
use anyhow::Result;
use log::info;
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// 對外的預覽引擎
///
/// 組合快取位置、單張預覽、時間軸縮圖與時間點登記，
/// 呼叫端只需提供媒體路徑。
pub struct MediaPreviewEngine {
    file_type_table: FileTypeTable,
    locator: Arc<CacheLocator>,
    registry: Arc<TimestampRegistry>,
    previews: PreviewGenerator,
    sprites: SpriteGenerator,
}

impl MediaPreviewEngine {
    pub fn new(
        config: &Config,
        backend: Arc<dyn DecoderBackend>,
        sink: Arc<dyn EventSink>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        let locator = Arc::new(CacheLocator::from_settings(&config.settings));
        let registry = Arc::new(TimestampRegistry::new());

        let previews = PreviewGenerator::new(
            Arc::clone(&locator),
            Arc::clone(&backend),
            Arc::clone(&sink),
            config.settings.preview,
        )?;
        let sprites = SpriteGenerator::new(
            Arc::clone(&locator),
            backend,
            sink,
            Arc::clone(&registry),
            config.settings.sprite,
            shutdown_signal,
        )?;

        info!("{}", t!("log.engine_started", path = locator.root().display()));

        Ok(Self {
            file_type_table: config.file_type_table.clone(),
            locator,
            registry,
            previews,
            sprites,
        })
    }

    /// 使用 FFmpeg 解碼後端
    #[cfg(feature = "ffmpeg")]
    pub fn with_ffmpeg(
        config: &Config,
        sink: Arc<dyn EventSink>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        use crate::component::media_decoder::FfmpegBackend;

        Self::new(config, Arc::new(FfmpegBackend), sink, shutdown_signal)
    }

    #[must_use]
    pub fn with_preview_timeout(mut self, timeout: Duration) -> Self {
        self.previews = self.previews.with_timeout(timeout);
        self
    }

    #[must_use]
    pub fn reference(&self, media_path: &Path) -> MediaReference {
        MediaReference::new(media_path, &self.file_type_table)
    }

    /// 非同步產生預覽，回傳的狀態會在完成後更新
    pub fn generate_preview(&self, media_path: &Path) -> Arc<PreviewState> {
        let state = PreviewState::new();
        self.generate_preview_for(media_path, &state);
        state
    }

    pub fn generate_preview_for(&self, media_path: &Path, state: &Arc<PreviewState>) {
        let reference = self.reference(media_path);
        self.previews.generate_preview(&reference, state);
    }

    /// 同步產生時間軸縮圖，回傳成功的路徑
    pub fn generate_sprites(&self, media_path: &Path, count: usize) -> Vec<PathBuf> {
        let reference = self.reference(media_path);
        self.sprites.generate_sprites(&reference, count)
    }

    /// 查無資料時回傳 `0.0`
    #[must_use]
    pub fn get_sprite_timestamp(&self, sprite_path: &Path) -> f64 {
        self.registry.lookup(sprite_path)
    }

    #[must_use]
    pub fn sprite_timestamp(&self, sprite_path: &Path) -> Option<f64> {
        self.registry.get(sprite_path)
    }

    /// 單張預覽的快取目錄
    #[must_use]
    pub fn get_cache_path(&self) -> String {
        self.locator.preview_cache_path().to_string_lossy().to_string()
    }

    #[must_use]
    pub fn cache_locator(&self) -> &CacheLocator {
        &self.locator
    }
}
