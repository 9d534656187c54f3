use super::sprite_task::{SpriteResult, create_sprite_tasks, extract_sprite};
use crate::component::event_sink::{EventSink, MediaEvent};
use crate::component::media_decoder::{DecoderBackend, PreviewError, TimeBase};
use crate::config::SpriteSettings;
use crate::tools::{CacheKind, CacheLocator, CancelToken, MediaReference, TimestampRegistry};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rust_i18n::t;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// 時間軸縮圖產生器
///
/// 流程：
/// A. 以暫時的工作階段取得影片長度
/// B. 等分出 `count` 個內部時間點
/// C. 在專用執行緒池上平行擷取，每個任務各自開啟工作階段
/// D. 依索引順序回傳成功的縮圖路徑
pub struct SpriteGenerator {
    locator: Arc<CacheLocator>,
    backend: Arc<dyn DecoderBackend>,
    sink: Arc<dyn EventSink>,
    registry: Arc<TimestampRegistry>,
    settings: SpriteSettings,
    shutdown_signal: Arc<AtomicBool>,
    pool: ThreadPool,
}

impl SpriteGenerator {
    pub fn new(
        locator: Arc<CacheLocator>,
        backend: Arc<dyn DecoderBackend>,
        sink: Arc<dyn EventSink>,
        registry: Arc<TimestampRegistry>,
        settings: SpriteSettings,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        let workers = worker_count(settings.workers);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sprite-worker-{i}"))
            .build()
            .context(t!("errors.sprite_pool"))?;
        debug!("時間軸縮圖執行緒池: {workers} 條");

        locator.resolve_cache_dir(CacheKind::Sprites);

        Ok(Self {
            locator,
            backend,
            sink,
            registry,
            settings,
            shutdown_signal,
            pool,
        })
    }

    /// 產生 `count` 張時間軸縮圖，全部任務結束後才回傳
    ///
    /// 回傳成功的路徑（依索引排序）；失敗的索引直接省略。
    pub fn generate_sprites(&self, reference: &MediaReference, count: usize) -> Vec<PathBuf> {
        if count == 0 {
            return Vec::new();
        }

        let cancel = CancelToken::from_signal(Arc::clone(&self.shutdown_signal));
        let (duration, time_base) = match self.read_duration(reference, &cancel) {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    "{}",
                    t!(
                        "log.sprites_unavailable",
                        path = reference.path().display(),
                        error = e.to_string()
                    )
                );
                self.sink.emit(MediaEvent::GenerationError(format!(
                    "{}: {e}",
                    reference.file_name()
                )));
                return Vec::new();
            }
        };

        // 快取目錄可能在建構後被刪除
        self.locator.resolve_cache_dir(CacheKind::Sprites);

        let tasks = create_sprite_tasks(reference, &self.locator, duration, time_base, count);
        let total = tasks.len();
        info!(
            "{}",
            t!(
                "log.sprites_started",
                name = reference.file_name(),
                count = total,
                seconds = format!("{:.2}", time_base.to_seconds(duration))
            )
        );

        let completed = Mutex::new(0usize);
        let results: Vec<SpriteResult> = self.pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    let result = if self.shutdown_signal.load(Ordering::SeqCst) {
                        SpriteResult::cancelled(task)
                    } else {
                        extract_sprite(self.backend.as_ref(), task, &self.settings, &cancel)
                    };
                    self.finish_task(&result, &completed, total);
                    result
                })
                .collect()
        });

        let paths: Vec<PathBuf> = results
            .into_iter()
            .filter(SpriteResult::is_success)
            .map(|result| result.output_path)
            .collect();

        info!(
            "{}",
            t!(
                "log.sprites_finished",
                name = reference.file_name(),
                succeeded = paths.len(),
                total = total
            )
        );
        self.sink.emit(MediaEvent::SpritesGenerated(paths.clone()));
        paths
    }

    /// 開啟後立即關閉，只讀取長度與時間基準
    fn read_duration(
        &self,
        reference: &MediaReference,
        cancel: &CancelToken,
    ) -> Result<(i64, TimeBase), PreviewError> {
        let mut session = self.backend.open_session(reference.path(), cancel)?;
        let stream = session.stream().clone();
        session.close();

        let duration = stream
            .duration
            .filter(|&d| d > 0)
            .ok_or(PreviewError::DurationUnknown)?;
        Ok((duration, stream.time_base))
    }

    /// 單一任務結束：登記時間點、推進進度（同一把鎖內完成，進度保持遞增）
    fn finish_task(&self, result: &SpriteResult, completed: &Mutex<usize>, total: usize) {
        let mut completed = completed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match &result.outcome {
            Ok(()) => self
                .registry
                .record(&result.output_path, result.target_seconds),
            Err(PreviewError::Cancelled) => debug!("時間軸縮圖 {} 已取消", result.index),
            Err(e) => {
                warn!(
                    "{}",
                    t!(
                        "log.sprite_failed",
                        index = result.index,
                        seconds = format!("{:.3}", result.target_seconds),
                        error = e.to_string()
                    )
                );
                self.sink.emit(MediaEvent::GenerationError(
                    t!("events.sprite_failed", index = result.index, error = e.to_string())
                        .to_string(),
                ));
            }
        }

        *completed += 1;
        self.sink.emit(MediaEvent::SpriteProgress {
            completed: *completed,
            total,
        });
    }
}

fn worker_count(configured: Option<usize>) -> usize {
    configured.filter(|&n| n > 0).unwrap_or_else(|| {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count() {
        assert_eq!(worker_count(Some(3)), 3);
        assert!(worker_count(Some(0)) >= 1);
        assert!(worker_count(None) >= 1);
    }
}
