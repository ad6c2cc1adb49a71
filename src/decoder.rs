//! Per-timestamp frame decoding with deterministic placeholder fallback.
//!
//! `decode_frame_at_time` never fails: when the decoder binary or media path
//! is unset, or the subprocess errors in any way, the caller gets a synthetic
//! solid-color frame with the same dimensions a real decode would have had.
//! Blocking; generation loops run it through `tokio::task::spawn_blocking`.

use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::ffmpeg::{build_extract_args, calculate_width, path_to_string, run_extract_blocking};

/// Placeholder fill colors, cycled by `floor(timestamp) mod 5`.
pub const PLACEHOLDER_COLORS: [[u8; 3]; 5] = [
    [0x26, 0x32, 0x38], // blue-grey
    [0x37, 0x2f, 0x45], // plum
    [0x1f, 0x3a, 0x34], // pine
    [0x3e, 0x2c, 0x23], // umber
    [0x2d, 0x33, 0x1f], // olive
];

/// Solid-color stand-in for a frame that could not be decoded. Pure function
/// of the timestamp: the same second always yields the same color.
pub fn placeholder_frame(timestamp_secs: f64, width: u32, height: u32) -> RgbaImage {
    let idx = (timestamp_secs.max(0.0).floor() as u64 % 5) as usize;
    let [r, g, b] = PLACEHOLDER_COLORS[idx];
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
}

/// Decodes single frames from the active media file via the staged binary.
///
/// Binary and media path are session-scoped: the manager sets them at
/// `initialize` and clears them at `cleanup`. Until both are set, every decode
/// degrades to a placeholder without touching the subprocess layer.
pub struct FrameDecoder {
    binary: Mutex<Option<PathBuf>>,
    media_path: Mutex<Option<PathBuf>>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            binary: Mutex::new(None),
            media_path: Mutex::new(None),
        }
    }

    pub(crate) fn set_binary(&self, path: Option<PathBuf>) {
        *self.binary.lock() = path;
    }

    pub(crate) fn set_media_path(&self, path: Option<PathBuf>) {
        *self.media_path.lock() = path;
    }

    pub fn binary(&self) -> Option<PathBuf> {
        self.binary.lock().clone()
    }

    pub fn media_path(&self) -> Option<PathBuf> {
        self.media_path.lock().clone()
    }

    /// Decode one frame at `timestamp_secs`, scaled to `target_height` per the
    /// resolution table. Always returns an image of those dimensions.
    pub fn decode_frame_at_time(&self, timestamp_secs: f64, target_height: u32) -> Arc<RgbaImage> {
        let width = calculate_width(target_height);
        let (binary, media) = (self.binary(), self.media_path());
        let (Some(binary), Some(media)) = (binary, media) else {
            return Arc::new(placeholder_frame(timestamp_secs, width, target_height));
        };

        let timestamp_ms = (timestamp_secs.max(0.0) * 1000.0).round() as u64;
        let args = build_extract_args(&path_to_string(&media), timestamp_ms, width, target_height);
        match run_extract_blocking(&binary, &args) {
            Ok(bytes) => match image::load_from_memory(&bytes) {
                Ok(img) => return Arc::new(img.to_rgba8()),
                Err(err) => {
                    log::warn!(
                        target: "scrub_preview::decoder",
                        "corrupt image data at t={:.3}: {}",
                        timestamp_secs,
                        err
                    );
                }
            },
            Err(err) => {
                log::warn!(
                    target: "scrub_preview::decoder",
                    "decode failed at t={:.3}, substituting placeholder: {}",
                    timestamp_secs,
                    err
                );
            }
        }
        Arc::new(placeholder_frame(timestamp_secs, width, target_height))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}
