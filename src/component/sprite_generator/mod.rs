//! 時間軸縮圖產生元件
//!
//! 將影片長度等分，平行擷取每個時間點最接近的畫面並記錄對應秒數。

mod interval;
mod main;
mod sprite_task;

pub use interval::sprite_timestamps;
pub use main::SpriteGenerator;
pub use sprite_task::{
    SpriteResult, SpriteTask, create_sprite_tasks, extract_sprite, select_nearest_frame,
};
