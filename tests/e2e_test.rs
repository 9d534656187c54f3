//! E2E 測試 - 以 FFmpeg 後端處理真實媒體檔案
//!
//! 測試資料位於 /`tmp/media_preview_test/input`，目錄不存在時跳過

#![cfg(feature = "ffmpeg")]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use media_preview::component::{ChannelEventSink, MediaEvent, MediaPreviewEngine};
use media_preview::config::{Config, MediaKind, UserSettings};
use tempfile::TempDir;

const TEST_INPUT_DIR: &str = "/tmp/media_preview_test/input";

fn find_media(kind: MediaKind) -> Option<PathBuf> {
    let input_dir = Path::new(TEST_INPUT_DIR);
    if !input_dir.exists() {
        println!("跳過測試：測試目錄不存在 {TEST_INPUT_DIR}");
        return None;
    }

    let table = Config::with_settings(UserSettings::default())
        .unwrap()
        .file_type_table;
    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| table.classify(path) == kind)
        .collect();
    files.sort();

    if files.is_empty() {
        println!("跳過測試：找不到 {kind} 測試檔案");
    }
    files.into_iter().next()
}

fn ffmpeg_engine(cache_root: &Path) -> (MediaPreviewEngine, Receiver<MediaEvent>) {
    media_preview::init::init();

    let config = Config::with_settings(UserSettings {
        cache_root: Some(cache_root.to_path_buf()),
        ..UserSettings::default()
    })
    .unwrap();
    let (sender, events) = mpsc::channel();
    let engine = MediaPreviewEngine::with_ffmpeg(
        &config,
        Arc::new(ChannelEventSink::new(sender)),
        Arc::new(AtomicBool::new(false)),
    )
    .unwrap();
    (engine, events)
}

fn wait_for_preview(events: &Receiver<MediaEvent>) -> String {
    let deadline = Instant::now() + Duration::from_secs(15);
    while Instant::now() < deadline {
        if let Ok(MediaEvent::PreviewReady(path)) = events.recv_timeout(Duration::from_millis(100))
        {
            return path;
        }
    }
    panic!("等待預覽逾時");
}

/// 測試 1: 真實影片的時間軸縮圖
#[test]
fn test_sprites_from_real_video() {
    let Some(video) = find_media(MediaKind::Video) else {
        return;
    };
    let cache = TempDir::new().unwrap();
    let (engine, _events) = ffmpeg_engine(cache.path());

    let paths = engine.generate_sprites(&video, 5);
    println!("{} 產生 {} 張時間軸縮圖", video.display(), paths.len());
    assert!(!paths.is_empty(), "應至少產生一張縮圖");

    let seconds: Vec<f64> = paths
        .iter()
        .map(|p| engine.sprite_timestamp(p).unwrap())
        .collect();
    assert!(seconds.windows(2).all(|w| w[0] < w[1]));
    assert!(seconds[0] > 0.0);

    for path in &paths {
        let sprite = image::open(path).unwrap();
        assert!(sprite.width() > 0 && sprite.height() > 0);
    }
}

/// 測試 2: 真實影片的單張預覽
#[test]
fn test_preview_from_real_video() {
    let Some(video) = find_media(MediaKind::Video) else {
        return;
    };
    let cache = TempDir::new().unwrap();
    let (engine, events) = ffmpeg_engine(cache.path());

    let state = engine.generate_preview(&video);
    let path = wait_for_preview(&events);
    assert!(!path.is_empty(), "預覽應成功產生");
    assert_eq!(state.preview_path(), path);

    let preview = image::open(&path).unwrap();
    assert_eq!(preview.width(), 240);
}

/// 測試 3: 損毀的影片不會中斷程式
#[test]
fn test_corrupt_video_is_reported() {
    if find_media(MediaKind::Video).is_none() {
        return;
    }
    let dir = TempDir::new().unwrap();
    let corrupt = dir.path().join("corrupt.mp4");
    fs::write(&corrupt, vec![0u8; 4096]).unwrap();

    let (engine, events) = ffmpeg_engine(dir.path());
    assert!(engine.generate_sprites(&corrupt, 3).is_empty());

    let state = engine.generate_preview(&corrupt);
    assert_eq!(wait_for_preview(&events), "");
    assert_eq!(state.preview_path(), "");
}
