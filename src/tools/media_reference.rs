use crate::config::{FileTypeTable, MediaKind};
use std::path::{Path, PathBuf};

/// 一個媒體檔案的不可變參照
///
/// 內容鍵只由路徑字串計算，檔案內容被原地修改時快取不會失效。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaReference {
    path: PathBuf,
    content_key: String,
    kind: MediaKind,
}

impl MediaReference {
    #[must_use]
    pub fn new(path: &Path, file_type_table: &FileTypeTable) -> Self {
        let kind = file_type_table.classify(path);
        Self::with_kind(path, kind)
    }

    /// 由呼叫端直接指定種類（略過副檔名判斷）
    #[must_use]
    pub fn with_kind(path: &Path, kind: MediaKind) -> Self {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let content_key = content_key(&path);
        Self {
            path,
            content_key,
            kind,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn content_key(&self) -> &str {
        &self.content_key
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().to_string())
    }
}

/// 路徑字串的 BLAKE3 雜湊（十六進位）
#[must_use]
pub fn content_key(path: &Path) -> String {
    let path_string = path.to_string_lossy();
    blake3::hash(path_string.as_bytes()).to_hex().to_string()
}
