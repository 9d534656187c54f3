use std::sync::{Arc, Mutex, MutexGuard};

/// 預覽狀態快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewSnapshot {
    pub preview_path: String,
    pub preview_loading: bool,
}

/// 由畫面端持有的預覽狀態
///
/// 產生器只保留 `Weak` 參照，持有者釋放後的寫入會被忽略。
#[derive(Debug, Default)]
pub struct PreviewState {
    inner: Mutex<PreviewSnapshot>,
}

impl PreviewState {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[must_use]
    pub fn preview_path(&self) -> String {
        self.lock().preview_path.clone()
    }

    #[must_use]
    pub fn preview_loading(&self) -> bool {
        self.lock().preview_loading
    }

    #[must_use]
    pub fn snapshot(&self) -> PreviewSnapshot {
        self.lock().clone()
    }

    /// 回傳值表示是否有變更
    pub fn set_preview_path(&self, path: &str) -> bool {
        let mut inner = self.lock();
        if inner.preview_path == path {
            return false;
        }
        inner.preview_path = path.to_string();
        true
    }

    pub fn set_preview_loading(&self, loading: bool) -> bool {
        let mut inner = self.lock();
        if inner.preview_loading == loading {
            return false;
        }
        inner.preview_loading = loading;
        true
    }

    fn lock(&self) -> MutexGuard<'_, PreviewSnapshot> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
