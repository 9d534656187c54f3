use super::preview_renderer::render_preview;
use super::preview_state::PreviewState;
use crate::component::event_sink::{EventSink, MediaEvent};
use crate::component::media_decoder::{DecoderBackend, PreviewError};
use crate::config::{MediaKind, PreviewSettings};
use crate::tools::{CacheKind, CacheLocator, CancelToken, MediaReference};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// 背景工作執行緒與逾時監看共用的資源
struct PreviewContext {
    backend: Arc<dyn DecoderBackend>,
    sink: Arc<dyn EventSink>,
    settings: PreviewSettings,
    /// 逾時時限（毫秒），每個工作開始時讀取
    timeout_millis: AtomicU64,
}

impl PreviewContext {
    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis.load(Ordering::SeqCst))
    }
}

struct PreviewJob {
    reference: MediaReference,
    output: PathBuf,
    state: Weak<PreviewState>,
}

/// 正在執行中的工作，交給逾時監看
struct ActiveJob {
    file_name: String,
    state: Weak<PreviewState>,
    cancel: CancelToken,
    /// 由工作執行緒或逾時監看其中之一取得，取得者負責寫回結果
    settled: Arc<AtomicBool>,
    /// 工作結束時對應的 Sender 隨之釋放
    done: Receiver<()>,
}

/// 單張預覽產生器
///
/// 快取命中時同步綁定；否則排入單一背景執行緒，一次處理一個工作。
/// 工作開始執行時才起算時限，排隊等待的時間不計入；
/// 超過時限由逾時監看取消工作並回報失敗。
pub struct PreviewGenerator {
    context: Arc<PreviewContext>,
    locator: Arc<CacheLocator>,
    jobs: Option<Sender<PreviewJob>>,
    worker: Option<JoinHandle<()>>,
    watchdog: Option<JoinHandle<()>>,
}

impl PreviewGenerator {
    pub fn new(
        locator: Arc<CacheLocator>,
        backend: Arc<dyn DecoderBackend>,
        sink: Arc<dyn EventSink>,
        settings: PreviewSettings,
    ) -> Result<Self> {
        locator.resolve_cache_dir(CacheKind::Previews);

        let context = Arc::new(PreviewContext {
            backend,
            sink,
            settings,
            timeout_millis: AtomicU64::new(settings.timeout_secs.saturating_mul(1000)),
        });

        let (watches, watch_receiver) = mpsc::channel();
        let watchdog_context = Arc::clone(&context);
        let watchdog = thread::Builder::new()
            .name("preview-watchdog".to_string())
            .spawn(move || run_watchdog(&watchdog_context, &watch_receiver))
            .context(t!("errors.watchdog_spawn"))?;

        let (jobs, job_receiver) = mpsc::channel();
        let worker_context = Arc::clone(&context);
        let worker = thread::Builder::new()
            .name("preview-worker".to_string())
            .spawn(move || run_worker(&worker_context, &job_receiver, &watches))
            .context(t!("errors.worker_spawn"))?;

        Ok(Self {
            context,
            locator,
            jobs: Some(jobs),
            worker: Some(worker),
            watchdog: Some(watchdog),
        })
    }

    /// 覆寫逾時時限，之後開始的工作生效
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.context.timeout_millis.store(millis, Ordering::SeqCst);
        self
    }

    /// 產生預覽並寫回 `state`，結果也會以事件發佈
    ///
    /// 失敗不會回傳錯誤：`preview_path` 設為空字串並發出 `GenerationError`。
    pub fn generate_preview(&self, reference: &MediaReference, state: &Arc<PreviewState>) {
        let sink = &self.context.sink;
        let output = self.locator.artifact_path(reference, None);

        if output.is_file() {
            debug!("預覽快取命中: {}", output.display());
            let path = output.to_string_lossy().to_string();
            state.set_preview_path(&path);
            sink.emit(MediaEvent::PreviewReady(path));
            return;
        }

        if reference.kind() == MediaKind::Unsupported {
            let error = PreviewError::UnsupportedMedia(reference.path().display().to_string());
            warn!("{error}");
            state.set_preview_path("");
            sink.emit(MediaEvent::GenerationError(error.to_string()));
            return;
        }

        if state.set_preview_loading(true) {
            sink.emit(MediaEvent::PreviewLoadingChanged(true));
        }

        let job = PreviewJob {
            reference: reference.clone(),
            output,
            state: Arc::downgrade(state),
        };
        let sent = self
            .jobs
            .as_ref()
            .is_some_and(|jobs| jobs.send(job).is_ok());
        if !sent {
            settle(sink.as_ref(), &Arc::downgrade(state), "");
            sink.emit(MediaEvent::GenerationError(
                t!("events.worker_stopped").to_string(),
            ));
        }
    }
}

impl Drop for PreviewGenerator {
    fn drop(&mut self) {
        // 工作佇列關閉後工作執行緒結束，逾時監看隨之結束
        drop(self.jobs.take());
        for handle in [self.worker.take(), self.watchdog.take()].into_iter().flatten() {
            if handle.join().is_err() {
                warn!("{}", t!("log.preview_thread_panicked"));
            }
        }
    }
}

fn run_worker(context: &PreviewContext, jobs: &Receiver<PreviewJob>, watches: &Sender<ActiveJob>) {
    debug!("預覽工作執行緒啟動");
    for job in jobs {
        process_job(context, job, watches);
    }
    debug!("預覽工作執行緒結束");
}

fn process_job(context: &PreviewContext, job: PreviewJob, watches: &Sender<ActiveJob>) {
    let cancel = CancelToken::new();
    let settled = Arc::new(AtomicBool::new(false));
    let (_done, done) = mpsc::channel::<()>();

    let watched = watches.send(ActiveJob {
        file_name: job.reference.file_name(),
        state: job.state.clone(),
        cancel: cancel.clone(),
        settled: Arc::clone(&settled),
        done,
    });
    if watched.is_err() {
        warn!("{}", t!("log.watchdog_stopped"));
    }

    let result = render_preview(
        context.backend.as_ref(),
        &job.reference,
        &job.output,
        &context.settings,
        &cancel,
    );

    if settled.swap(true, Ordering::SeqCst) {
        debug!("逾時後才完成，捨棄結果: {}", job.reference.file_name());
        return;
    }

    let sink = context.sink.as_ref();
    match result {
        Ok(()) => {
            info!("{}", t!("log.preview_created", path = job.output.display()));
            settle(sink, &job.state, &job.output.to_string_lossy());
        }
        Err(e) => {
            warn!(
                "{}",
                t!(
                    "log.preview_failed",
                    path = job.reference.path().display(),
                    error = e.to_string()
                )
            );
            settle(sink, &job.state, "");
            sink.emit(MediaEvent::GenerationError(format!(
                "{}: {e}",
                job.reference.file_name()
            )));
        }
    }
}

/// 依序監看工作執行緒開始的每個工作
///
/// 工作執行緒一次只執行一個工作，所以同一時間只會有一個需要監看。
fn run_watchdog(context: &PreviewContext, watches: &Receiver<ActiveJob>) {
    for job in watches {
        let timeout = context.timeout();
        if !matches!(job.done.recv_timeout(timeout), Err(RecvTimeoutError::Timeout)) {
            continue;
        }
        if job.settled.swap(true, Ordering::SeqCst) {
            continue;
        }

        job.cancel.cancel();
        warn!(
            "{}",
            t!(
                "log.preview_timeout",
                seconds = format!("{:.1}", timeout.as_secs_f64()),
                name = &job.file_name
            )
        );
        let sink = context.sink.as_ref();
        settle(sink, &job.state, "");
        sink.emit(MediaEvent::GenerationError(
            t!("events.preview_timeout", name = &job.file_name).to_string(),
        ));
    }
}

/// 寫回結果；狀態持有者已釋放時只發佈事件
fn settle(sink: &dyn EventSink, state: &Weak<PreviewState>, path: &str) {
    match state.upgrade() {
        Some(state) => {
            state.set_preview_loading(false);
            state.set_preview_path(path);
        }
        None => debug!("預覽狀態已釋放，略過寫回"),
    }
    sink.emit(MediaEvent::PreviewLoadingChanged(false));
    sink.emit(MediaEvent::PreviewReady(path.to_string()));
}
