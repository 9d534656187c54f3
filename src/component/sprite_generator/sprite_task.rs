use super::interval::sprite_timestamps;
use crate::component::media_decoder::{
    DecodeSession, DecoderBackend, Frame, PreviewError, TimeBase, save_as_jpeg, scale_to_rgb,
};
use crate::component::preview_generator::save_error;
use crate::config::SpriteSettings;
use crate::tools::{CacheLocator, CancelToken, MediaReference};
use log::debug;
use rust_i18n::t;
use std::path::PathBuf;

/// 時間軸縮圖擷取任務
#[derive(Debug, Clone)]
pub struct SpriteTask {
    pub index: usize,
    pub media_path: PathBuf,
    /// 目標時間（串流 tick）
    pub target: i64,
    pub target_seconds: f64,
    pub output_path: PathBuf,
}

/// 時間軸縮圖擷取結果
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteResult {
    pub index: usize,
    pub output_path: PathBuf,
    pub target_seconds: f64,
    pub outcome: Result<(), PreviewError>,
}

impl SpriteResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    #[must_use]
    pub fn cancelled(task: &SpriteTask) -> Self {
        Self::from_task(task, Err(PreviewError::Cancelled))
    }

    fn from_task(task: &SpriteTask, outcome: Result<(), PreviewError>) -> Self {
        Self {
            index: task.index,
            output_path: task.output_path.clone(),
            target_seconds: task.target_seconds,
            outcome,
        }
    }
}

/// 依長度建立 `count` 個擷取任務，索引從 0 開始
#[must_use]
pub fn create_sprite_tasks(
    reference: &MediaReference,
    locator: &CacheLocator,
    duration: i64,
    time_base: TimeBase,
    count: usize,
) -> Vec<SpriteTask> {
    sprite_timestamps(duration, count)
        .into_iter()
        .enumerate()
        .map(|(index, target)| SpriteTask {
            index,
            media_path: reference.path().to_path_buf(),
            target,
            target_seconds: time_base.to_seconds(target),
            output_path: locator.artifact_path(reference, Some(index)),
        })
        .collect()
}

/// 擷取單張時間軸縮圖（各自開啟獨立的解碼工作階段）
#[must_use]
pub fn extract_sprite(
    backend: &dyn DecoderBackend,
    task: &SpriteTask,
    settings: &SpriteSettings,
    cancel: &CancelToken,
) -> SpriteResult {
    SpriteResult::from_task(task, extract_sprite_inner(backend, task, settings, cancel))
}

fn extract_sprite_inner(
    backend: &dyn DecoderBackend,
    task: &SpriteTask,
    settings: &SpriteSettings,
    cancel: &CancelToken,
) -> Result<(), PreviewError> {
    debug!(
        "擷取時間軸縮圖 {}: target={} ({:.3}s)",
        task.index, task.target, task.target_seconds
    );

    let mut session = backend.open_session(&task.media_path, cancel)?;
    let frame = seek_and_select(session.as_mut(), task.target, settings);
    session.close();
    let frame = frame?;

    let (width, height) = frame.dimensions();
    let rgb = scale_to_rgb(&frame, width, height)?;

    if save_as_jpeg(&rgb, &task.output_path, settings.quality) {
        Ok(())
    } else {
        Err(save_error(&task.output_path))
    }
}

fn seek_and_select(
    session: &mut dyn DecodeSession,
    target: i64,
    settings: &SpriteSettings,
) -> Result<Frame, PreviewError> {
    session.seek(target)?;
    let tolerance = session
        .stream()
        .time_base
        .ticks_from_seconds(settings.tolerance_seconds)
        .max(0);
    select_nearest_frame(session, target, tolerance, settings.max_frame_reads)
}

/// 從目前位置往後解碼，挑出時間最接近 `target` 的畫面
///
/// 在以下情況停止：落在容許誤差內、已超過 `target + tolerance`、串流結束、
/// 或已讀取 `max_frames` 張。沒有時間戳的畫面只在沒有其他候選時使用。
pub fn select_nearest_frame(
    session: &mut dyn DecodeSession,
    target: i64,
    tolerance: i64,
    max_frames: usize,
) -> Result<Frame, PreviewError> {
    let mut best: Option<(Frame, Option<u64>)> = None;

    for _ in 0..max_frames {
        let frame = match session.decode_next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(PreviewError::Cancelled) => return Err(PreviewError::Cancelled),
            Err(e) if best.is_some() => {
                debug!("解碼中斷，使用目前最接近的畫面: {e}");
                break;
            }
            Err(e) => return Err(e),
        };

        let Some(pts) = frame.timestamp else {
            if best.is_none() {
                best = Some((frame, None));
            }
            continue;
        };

        let distance = pts.abs_diff(target);
        let closer = match &best {
            Some((_, Some(best_distance))) => distance < *best_distance,
            _ => true,
        };
        if closer {
            best = Some((frame, Some(distance)));
        }

        if distance <= tolerance.unsigned_abs() || pts > target.saturating_add(tolerance) {
            break;
        }
    }

    best.map(|(frame, _)| frame)
        .ok_or_else(|| PreviewError::DecodeFailed(t!("errors.no_frame_near_target").to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::media_decoder::{SeekStrategy, SessionState, StreamInfo};
    use crate::config::MediaKind;
    use image::RgbImage;
    use std::collections::VecDeque;
    use std::path::Path;

    /// 依序吐出預先排好的畫面
    struct ScriptedSession {
        stream: StreamInfo,
        frames: VecDeque<Result<Option<i64>, PreviewError>>,
        decoded: usize,
    }

    impl ScriptedSession {
        fn new(frames: Vec<Result<Option<i64>, PreviewError>>) -> Self {
            Self {
                stream: StreamInfo {
                    index: 0,
                    time_base: TimeBase::new(1, 1000),
                    duration: Some(100_000),
                    width: 4,
                    height: 4,
                },
                frames: frames.into(),
                decoded: 0,
            }
        }
    }

    impl DecodeSession for ScriptedSession {
        fn stream(&self) -> &StreamInfo {
            &self.stream
        }

        fn state(&self) -> SessionState {
            SessionState::Decoding
        }

        fn seek_with(&mut self, _: SeekStrategy, _: i64) -> Result<(), PreviewError> {
            Ok(())
        }

        fn decode_next_frame(&mut self) -> Result<Option<Frame>, PreviewError> {
            match self.frames.pop_front() {
                None => Ok(None),
                Some(Ok(pts)) => {
                    self.decoded += 1;
                    Ok(Some(Frame::from_rgb(pts, RgbImage::new(4, 4))))
                }
                Some(Err(e)) => Err(e),
            }
        }

        fn close(&mut self) {}
    }

    fn pts(values: &[i64]) -> Vec<Result<Option<i64>, PreviewError>> {
        values.iter().map(|&v| Ok(Some(v))).collect()
    }

    #[test]
    fn test_create_sprite_tasks() {
        let reference = MediaReference::with_kind(Path::new("/videos/clip.mp4"), MediaKind::Video);
        let locator = CacheLocator::new("/cache");
        let tasks = create_sprite_tasks(&reference, &locator, 90_000, TimeBase::new(1, 1000), 3);

        let seconds: Vec<f64> = tasks.iter().map(|t| t.target_seconds).collect();
        assert_eq!(seconds, vec![22.5, 45.0, 67.5]);
        assert_eq!(tasks[2].index, 2);
        assert_eq!(
            tasks[2].output_path,
            locator.artifact_path(&reference, Some(2))
        );
        assert!(tasks[0].output_path.ends_with(format!("{}_sprite_0.jpg", reference.content_key())));
    }

    #[test]
    fn test_stops_within_tolerance() {
        let mut session = ScriptedSession::new(pts(&[1000, 4000, 4990, 5100, 6000]));
        let frame = select_nearest_frame(&mut session, 5000, 50, 200).unwrap();
        assert_eq!(frame.timestamp, Some(4990));
        assert_eq!(session.decoded, 3);
    }

    #[test]
    fn test_stops_after_passing_target() {
        let mut session = ScriptedSession::new(pts(&[4000, 4800, 5300, 9000]));
        let frame = select_nearest_frame(&mut session, 5000, 50, 200).unwrap();
        assert_eq!(frame.timestamp, Some(4800));
        assert_eq!(session.decoded, 3);
    }

    #[test]
    fn test_end_of_stream_keeps_best() {
        let mut session = ScriptedSession::new(pts(&[1000, 2000]));
        let frame = select_nearest_frame(&mut session, 5000, 50, 200).unwrap();
        assert_eq!(frame.timestamp, Some(2000));
    }

    #[test]
    fn test_frame_budget_is_respected() {
        let mut session = ScriptedSession::new(pts(&[10, 20, 30, 40, 50]));
        let frame = select_nearest_frame(&mut session, 5000, 50, 2).unwrap();
        assert_eq!(frame.timestamp, Some(20));
        assert_eq!(session.decoded, 2);
    }

    #[test]
    fn test_frames_without_pts_are_last_resort() {
        let mut session = ScriptedSession::new(vec![Ok(None), Ok(Some(3000)), Ok(None)]);
        let frame = select_nearest_frame(&mut session, 5000, 50, 200).unwrap();
        assert_eq!(frame.timestamp, Some(3000));

        let mut session = ScriptedSession::new(vec![Ok(None)]);
        let frame = select_nearest_frame(&mut session, 5000, 50, 200).unwrap();
        assert_eq!(frame.timestamp, None);
    }

    #[test]
    fn test_decode_error_keeps_candidate() {
        let mut session = ScriptedSession::new(vec![
            Ok(Some(4000)),
            Err(PreviewError::DecodeFailed("corrupt".to_string())),
        ]);
        let frame = select_nearest_frame(&mut session, 5000, 50, 200).unwrap();
        assert_eq!(frame.timestamp, Some(4000));
    }

    #[test]
    fn test_errors_without_candidate_propagate() {
        let mut session =
            ScriptedSession::new(vec![Err(PreviewError::DecodeFailed("corrupt".to_string()))]);
        assert!(matches!(
            select_nearest_frame(&mut session, 5000, 50, 200),
            Err(PreviewError::DecodeFailed(_))
        ));

        let mut session = ScriptedSession::new(Vec::new());
        assert!(select_nearest_frame(&mut session, 5000, 50, 200).is_err());

        let mut session = ScriptedSession::new(vec![Ok(Some(4000)), Err(PreviewError::Cancelled)]);
        assert_eq!(
            select_nearest_frame(&mut session, 5000, 50, 200).unwrap_err(),
            PreviewError::Cancelled
        );
    }
}
