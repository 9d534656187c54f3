use crate::config::load::SETTINGS_FILE;
use crate::config::types::UserSettings;
use anyhow::{Context, Result};
use rust_i18n::t;
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    // Save to settings.json in the current working directory
    save_settings_to(settings, Path::new(SETTINGS_FILE))
}

pub fn save_settings_to(settings: &UserSettings, path: &Path) -> Result<()> {
    let content =
        serde_json::to_string_pretty(settings).context(t!("errors.settings_serialize"))?;

    fs::write(path, content)
        .with_context(|| t!("errors.settings_write", path = path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_saved_settings_load_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.sprite.quality = 97;
        settings.sprite.workers = Some(3);
        settings.cache_root = Some(dir.path().join("cache"));

        save_settings_to(&settings, &path).unwrap();
        let loaded = Config::load_settings(&path).unwrap();
        assert_eq!(loaded, settings);
    }
}
