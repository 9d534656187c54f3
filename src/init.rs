use env_logger::Env;

/// 初始化日誌（預設 info，可用 `RUST_LOG` 覆寫）與解碼函式庫
pub fn init() {
    // 測試中可能重複呼叫，忽略重複初始化
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    #[cfg(feature = "ffmpeg")]
    crate::component::media_decoder::init_ffmpeg();
}
