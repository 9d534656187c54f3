use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// 時間軸縮圖路徑 → 來源影片時間點（秒）
///
/// 項目在程序存活期間不會被移除；鍵是快取路徑，數量受實際產生過的縮圖限制。
#[derive(Debug, Default)]
pub struct TimestampRegistry {
    entries: Mutex<HashMap<PathBuf, f64>>,
}

impl TimestampRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, path: &Path, seconds: f64) {
        self.lock().insert(path.to_path_buf(), seconds);
    }

    /// 查無資料時回傳 `0.0`，與真正的 0 秒無法區分；需要區分時使用 [`Self::get`]
    #[must_use]
    pub fn lookup(&self, path: &Path) -> f64 {
        self.get(path).unwrap_or(0.0)
    }

    #[must_use]
    pub fn get(&self, path: &Path) -> Option<f64> {
        self.lock().get(path).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, f64>> {
        // 寫入者 panic 不影響已寫入的資料
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
