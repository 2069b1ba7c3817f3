pub mod health;
pub mod media_raw;
pub mod thumbnail_upload;
pub mod video_upload;
