use anyhow::{Context, Result};
use log::warn;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 第二次中斷時的結束代碼（128 + SIGINT）
const FORCED_EXIT_CODE: i32 = 130;

/// 安裝 Ctrl-C 處理器，回傳共用的中斷旗標
///
/// 第一次中斷只設定旗標：尚未開始的縮圖任務會被略過，解碼迴圈也會停止。
/// 旗標不會重設，再按一次直接結束程式。
pub fn setup_shutdown_signal() -> Result<Arc<AtomicBool>> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let handler_signal = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        if handler_signal.swap(true, Ordering::SeqCst) {
            eprintln!("\n{}", t!("signal.forced_exit"));
            std::process::exit(FORCED_EXIT_CODE);
        }
        warn!("{}", t!("signal.interrupted"));
    })
    .context(t!("signal.handler_failed"))?;

    Ok(shutdown_signal)
}
