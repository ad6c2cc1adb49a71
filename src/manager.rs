//! Session façade owning the decoder, provisioner, and both caches.
//!
//! One manager per UI session, constructed explicitly and shared by handle
//! (typically `Arc`); its lifetime is the session's, not the process's.

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::config::PreviewConfig;
use crate::decoder::FrameDecoder;
use crate::error::PreviewError;
use crate::ffmpeg::{BinaryProvisioner, probe_duration};
use crate::timeline::TimelineThumbnailCache;
use crate::window::ScrubbingWindowCache;

pub struct PreviewCacheManager {
    decoder: Arc<FrameDecoder>,
    provisioner: BinaryProvisioner,
    window: ScrubbingWindowCache,
    timeline: TimelineThumbnailCache,
}

impl PreviewCacheManager {
    pub fn new(config: PreviewConfig, provisioner: BinaryProvisioner) -> Self {
        Self {
            decoder: Arc::new(FrameDecoder::new()),
            provisioner,
            window: ScrubbingWindowCache::new(&config),
            timeline: TimelineThumbnailCache::new(&config),
        }
    }

    /// Provision the decoder binary and record the active media path. Until
    /// this succeeds every decode degrades to a placeholder frame.
    ///
    /// Re-initializing with a different path does not invalidate the caches;
    /// callers are expected to follow with fresh `start_*` calls.
    pub fn initialize(&self, media_path: impl Into<PathBuf>) -> Result<(), PreviewError> {
        let binary = self.provisioner.ensure_available()?;
        let media_path = media_path.into();
        log::info!(
            target: "scrub_preview::manager",
            "initialized: media={}, decoder={}",
            media_path.display(),
            binary.display()
        );
        self.decoder.set_binary(Some(binary));
        self.decoder.set_media_path(Some(media_path));
        Ok(())
    }

    /// (Re)start window generation around `center_secs`. Supersedes a prior
    /// window run; timeline generation is unaffected.
    pub fn start_scrubbing_window_generation(&self, center_secs: f64, duration_secs: f64) {
        self.window
            .start(Arc::clone(&self.decoder), center_secs, duration_secs);
    }

    /// (Re)start timeline generation. Supersedes a prior timeline run; window
    /// generation is unaffected.
    pub fn start_timeline_thumbnail_generation(&self, duration_secs: f64) {
        self.timeline
            .start(Arc::clone(&self.decoder), duration_secs);
    }

    pub fn get_scrubbing_frame(&self, timestamp_secs: f64) -> Option<Arc<RgbaImage>> {
        self.window.get_frame(timestamp_secs)
    }

    pub fn get_timeline_thumbnail(&self, second: u64) -> Option<Arc<RgbaImage>> {
        self.timeline.get_thumbnail(second)
    }

    /// Cancel window generation and empty the window. Timeline is untouched.
    pub fn clear_scrubbing_window(&self) {
        self.window.clear();
    }

    /// Probe the active media's duration with the provisioned decoder. Runs
    /// the subprocess on the blocking pool.
    pub async fn probe_media_duration(&self) -> Result<f64, PreviewError> {
        let (binary, media) = self.probe_inputs()?;
        tokio::task::spawn_blocking(move || probe_duration(&binary, &media))
            .await
            .map_err(|e| PreviewError::from(e.to_string()))?
    }

    /// Blocking variant of [`probe_media_duration`](Self::probe_media_duration)
    /// for callers outside a runtime. Blocks until the decoder exits.
    pub fn probe_media_duration_blocking(&self) -> Result<f64, PreviewError> {
        let (binary, media) = self.probe_inputs()?;
        probe_duration(&binary, &media)
    }

    fn probe_inputs(&self) -> Result<(PathBuf, PathBuf), PreviewError> {
        match (self.decoder.binary(), self.decoder.media_path()) {
            (Some(binary), Some(media)) => Ok((binary, media)),
            _ => Err(PreviewError::binary_unavailable(
                "initialize() has not provisioned a decoder",
            )),
        }
    }

    /// Cancel both generations, drop both caches, and release the staged
    /// binary. Safe to call repeatedly and from teardown paths.
    pub fn cleanup(&self) {
        log::info!(target: "scrub_preview::manager", "cleanup");
        self.window.clear();
        self.timeline.clear();
        self.decoder.set_binary(None);
        self.decoder.set_media_path(None);
        self.provisioner.cleanup();
    }

    pub fn window(&self) -> &ScrubbingWindowCache {
        &self.window
    }

    pub fn timeline(&self) -> &TimelineThumbnailCache {
        &self.timeline
    }

    pub fn decoder(&self) -> &Arc<FrameDecoder> {
        &self.decoder
    }
}
