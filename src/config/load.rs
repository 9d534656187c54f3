use crate::config::types::{Config, FileTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use rust_i18n::t;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的檔案類型設定（不需要外部檔案）
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;
        let settings = Self::load_settings(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            warn!("{}", t!("log.settings_fallback", error = format!("{e:#}")));
            UserSettings::default()
        });

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    /// 使用指定設定建立（測試或嵌入時使用，不讀取 settings.json）
    pub fn with_settings(settings: UserSettings) -> Result<Self> {
        Ok(Self {
            file_type_table: Self::load_embedded_file_type_table()?,
            settings,
        })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| t!("errors.settings_read", path = path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| t!("errors.settings_parse", path = path.display()))
    }

    /// 從編譯時嵌入的 JSON 載入檔案類型表
    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON).context(t!("errors.file_type_table"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_table_classifies_known_extensions() {
        let config = Config::with_settings(UserSettings::default()).unwrap();
        let table = &config.file_type_table;
        assert_eq!(table.classify(Path::new("a.webp")), MediaKind::Image);
        assert_eq!(table.classify(Path::new("a.3gp")), MediaKind::Video);
        assert_eq!(table.classify(Path::new("a.flac")), MediaKind::Unsupported);
    }

    #[test]
    fn test_load_settings_missing_file() {
        let settings = Config::load_settings(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings, UserSettings::default());
    }

    #[test]
    fn test_load_settings_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(Config::load_settings(file.path()).is_err());
    }
}
