use serde::Deserialize;

/// Tuning knobs for preview generation. All fields are optional; `effective_*`
/// accessors supply defaults so hosts can deserialize a partial config.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Width of the scrubbing window in seconds. Default 4.
    pub window_seconds: Option<f64>,
    /// Frames decoded per second of window range. Default 10.
    pub window_fps: Option<f64>,
    /// Decode height for scrubbing-window frames. Default 480 (854 wide).
    pub scrub_frame_height: Option<u32>,
    /// Decode height for timeline thumbnails. Default 96 (171 wide).
    pub timeline_thumb_height: Option<u32>,
    /// Delay between timeline decodes so indexing never starves scrubbing or
    /// playback. Default 75ms.
    pub timeline_pacing_ms: Option<u64>,
}

impl PreviewConfig {
    pub fn effective_window_seconds(&self) -> f64 {
        let w = self.window_seconds.unwrap_or(4.0);
        if w > 0.0 { w } else { 4.0 }
    }

    pub fn effective_window_fps(&self) -> f64 {
        let fps = self.window_fps.unwrap_or(10.0);
        if fps > 0.0 { fps } else { 10.0 }
    }

    pub fn effective_scrub_frame_height(&self) -> u32 {
        self.scrub_frame_height.unwrap_or(480).max(2)
    }

    pub fn effective_timeline_thumb_height(&self) -> u32 {
        self.timeline_thumb_height.unwrap_or(96).max(2)
    }

    pub fn effective_timeline_pacing_ms(&self) -> u64 {
        self.timeline_pacing_ms.unwrap_or(75)
    }

    /// Window entry bound: eviction runs whenever the count exceeds this.
    pub fn window_capacity(&self) -> usize {
        let cap = (self.effective_window_seconds() * self.effective_window_fps()).round() as usize;
        cap.max(1)
    }
}
