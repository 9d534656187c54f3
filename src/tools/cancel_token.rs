use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 可跨執行緒共享的取消旗標
///
/// 解碼迴圈在每次讀取封包時檢查；也可以直接包裝 Ctrl-C 的中斷信號。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 共用既有的中斷信號
    #[must_use]
    pub const fn from_signal(signal: Arc<AtomicBool>) -> Self {
        Self { flag: signal }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
