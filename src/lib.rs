mod config;
mod decoder;
pub mod error;
pub mod ffmpeg;
mod manager;
mod task;
mod timeline;
mod window;

pub use config::PreviewConfig;
pub use decoder::{FrameDecoder, PLACEHOLDER_COLORS, placeholder_frame};
pub use error::PreviewError;
pub use manager::PreviewCacheManager;
pub use timeline::TimelineThumbnailCache;
pub use window::{ScrubFrame, ScrubbingWindowCache};
