use anyhow::{Result, bail};
use rust_i18n::t;
use std::path::Path;

pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{}", t!("errors.path_missing", path = path.display()));
    }
    if !path.is_file() {
        bail!("{}", t!("errors.path_not_file", path = path.display()));
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directory_exists_creates_nested() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_directory_exists(&nested).unwrap();
        assert!(nested.is_dir());
        // 再呼叫一次不應失敗
        ensure_directory_exists(&nested).unwrap();
    }

    #[test]
    fn test_validate_file_exists() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("clip.mp4");
        std::fs::write(&file, b"x").unwrap();

        assert!(validate_file_exists(&file).is_ok());
        assert!(validate_file_exists(dir.path()).is_err());
        assert!(validate_file_exists(&dir.path().join("missing.mp4")).is_err());
    }
}
