//! 單張預覽產生元件
//!
//! 快取命中時直接綁定，否則交給背景執行緒解碼並受逾時監看。

mod main;
mod preview_renderer;
mod preview_state;

pub use main::PreviewGenerator;
pub(crate) use preview_renderer::save_error;
pub use preview_renderer::{render_image_preview, render_preview, render_video_preview};
pub use preview_state::{PreviewSnapshot, PreviewState};
