use crate::component::media_decoder::DecoderBackend;
use crate::component::{ChannelEventSink, MediaEvent, MediaPreviewEngine};
use crate::config::Config;
use anyhow::Result;
use log::debug;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};

/// 選單執行期間共用的狀態
///
/// 引擎在整個程式期間存活，時間點登記才能跨選單操作查詢；
/// 設定變更後重建引擎。
pub struct MenuContext {
    pub config: Config,
    engine: MediaPreviewEngine,
    events: Receiver<MediaEvent>,
    backend: Arc<dyn DecoderBackend>,
    shutdown_signal: Arc<AtomicBool>,
}

impl MenuContext {
    pub fn new(
        config: Config,
        backend: Arc<dyn DecoderBackend>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        let (engine, events) = build_engine(&config, &backend, &shutdown_signal)?;
        Ok(Self {
            config,
            engine,
            events,
            backend,
            shutdown_signal,
        })
    }

    #[must_use]
    pub const fn engine(&self) -> &MediaPreviewEngine {
        &self.engine
    }

    #[must_use]
    pub const fn events(&self) -> &Receiver<MediaEvent> {
        &self.events
    }

    #[must_use]
    pub fn shutdown_signal(&self) -> &Arc<AtomicBool> {
        &self.shutdown_signal
    }

    /// 丟棄先前操作殘留的事件
    pub fn drain_events(&self) {
        let stale = self.events.try_iter().count();
        if stale > 0 {
            debug!("丟棄 {stale} 個殘留事件");
        }
    }

    /// 以目前設定重建引擎（已登記的時間點會一併清除）
    pub fn rebuild_engine(&mut self) -> Result<()> {
        let (engine, events) = build_engine(&self.config, &self.backend, &self.shutdown_signal)?;
        self.engine = engine;
        self.events = events;
        Ok(())
    }
}

fn build_engine(
    config: &Config,
    backend: &Arc<dyn DecoderBackend>,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<(MediaPreviewEngine, Receiver<MediaEvent>)> {
    let (sender, events) = mpsc::channel();
    let engine = MediaPreviewEngine::new(
        config,
        Arc::clone(backend),
        Arc::new(ChannelEventSink::new(sender)),
        Arc::clone(shutdown_signal),
    )?;
    Ok((engine, events))
}
