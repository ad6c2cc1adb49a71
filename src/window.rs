//! Scrubbing window cache: a bounded, time-ordered run of frames centered on
//! the current seek position.
//!
//! Generation and reads share one mutex; reads never wait on a decode, they
//! see whatever has been appended so far. The frame vec is kept sorted by
//! timestamp so nearest-frame lookup is a binary search.

use std::sync::Arc;

use image::RgbaImage;
use parking_lot::Mutex;

use crate::config::PreviewConfig;
use crate::decoder::FrameDecoder;
use crate::task::{CancelFlag, TaskSlot};

/// One decoded frame in the window.
#[derive(Clone)]
pub struct ScrubFrame {
    pub timestamp_secs: f64,
    pub image: Arc<RgbaImage>,
}

struct WindowState {
    center_secs: f64,
    /// Sorted by timestamp.
    frames: Vec<ScrubFrame>,
}

pub struct ScrubbingWindowCache {
    state: Arc<Mutex<WindowState>>,
    tasks: TaskSlot,
    window_seconds: f64,
    fps: f64,
    frame_height: u32,
    capacity: usize,
}

impl ScrubbingWindowCache {
    pub(crate) fn new(config: &PreviewConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                center_secs: 0.0,
                frames: Vec::new(),
            })),
            tasks: TaskSlot::new(),
            window_seconds: config.effective_window_seconds(),
            fps: config.effective_window_fps(),
            frame_height: config.effective_scrub_frame_height(),
            capacity: config.window_capacity(),
        }
    }

    /// (Re)start generation centered on `center_secs`. The prior run is
    /// cancelled first and the window cleared; the range
    /// `[max(0, c - W/2), min(duration, c + W/2)]` is then decoded at `1/fps`
    /// steps. Must be called from within a tokio runtime.
    pub fn start(&self, decoder: Arc<FrameDecoder>, center_secs: f64, duration_secs: f64) {
        self.tasks.cancel();
        {
            let mut state = self.state.lock();
            state.frames.clear();
            state.center_secs = center_secs;
        }

        let half_window = self.window_seconds / 2.0;
        let range_start = (center_secs - half_window).max(0.0);
        let range_end = (center_secs + half_window).min(duration_secs);
        if range_end < range_start {
            return;
        }

        let step = 1.0 / self.fps;
        let state = Arc::clone(&self.state);
        let height = self.frame_height;
        let capacity = self.capacity;
        self.tasks.restart(move |cancel| {
            tokio::spawn(generate_window(
                decoder,
                state,
                cancel,
                range_start,
                range_end,
                step,
                half_window,
                capacity,
                height,
            ))
        });
    }

    /// Nearest cached frame by `|entry.timestamp - timestamp|`, or `None`
    /// while the window is empty. Never waits on generation.
    pub fn get_frame(&self, timestamp_secs: f64) -> Option<Arc<RgbaImage>> {
        let state = self.state.lock();
        if state.frames.is_empty() {
            return None;
        }
        let idx = state
            .frames
            .partition_point(|f| f.timestamp_secs < timestamp_secs);
        let pick = if idx == 0 {
            0
        } else if idx >= state.frames.len() {
            state.frames.len() - 1
        } else {
            let before = &state.frames[idx - 1];
            let after = &state.frames[idx];
            if timestamp_secs - before.timestamp_secs <= after.timestamp_secs - timestamp_secs {
                idx - 1
            } else {
                idx
            }
        };
        Some(Arc::clone(&state.frames[pick].image))
    }

    /// Cancel generation and drop every cached frame immediately.
    pub fn clear(&self) {
        self.tasks.cancel();
        self.state.lock().frames.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_generating(&self) -> bool {
        self.tasks.is_running()
    }

    /// Snapshot of cached timestamps in order. For hosts that render tick marks.
    pub fn cached_timestamps(&self) -> Vec<f64> {
        self.state
            .lock()
            .frames
            .iter()
            .map(|f| f.timestamp_secs)
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
async fn generate_window(
    decoder: Arc<FrameDecoder>,
    state: Arc<Mutex<WindowState>>,
    cancel: CancelFlag,
    range_start: f64,
    range_end: f64,
    step: f64,
    half_window: f64,
    capacity: usize,
    height: u32,
) {
    log::debug!(
        target: "scrub_preview::window",
        "generating window [{:.3}, {:.3}] step {:.3}",
        range_start,
        range_end,
        step
    );

    // Exclusive end: exactly window_seconds * fps steps over a full-width
    // range, so the count bound holds without eviction in the common case.
    let steps = ((range_end - range_start) / step).ceil() as usize;
    for i in 0..steps {
        if cancel.is_cancelled() {
            log::debug!(
                target: "scrub_preview::window",
                "window generation superseded after {} frame(s)",
                i
            );
            return;
        }
        let timestamp = range_start + i as f64 * step;
        let frame_decoder = Arc::clone(&decoder);
        let image = match tokio::task::spawn_blocking(move || {
            frame_decoder.decode_frame_at_time(timestamp, height)
        })
        .await
        {
            Ok(image) => image,
            Err(_) => return, // runtime shutting down
        };

        let mut guard = state.lock();
        let idx = guard
            .frames
            .partition_point(|f| f.timestamp_secs < timestamp);
        guard.frames.insert(
            idx,
            ScrubFrame {
                timestamp_secs: timestamp,
                image,
            },
        );
        if guard.frames.len() > capacity {
            let center = guard.center_secs;
            guard
                .frames
                .retain(|f| (f.timestamp_secs - center).abs() <= half_window);
        }
    }

    log::debug!(
        target: "scrub_preview::window",
        "window generation complete: {} frame(s)",
        state.lock().frames.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // fps 4 keeps step timestamps exactly representable (0.25s).
    fn test_config() -> PreviewConfig {
        PreviewConfig {
            window_seconds: Some(2.0),
            window_fps: Some(4.0),
            scrub_frame_height: Some(18),
            ..PreviewConfig::default()
        }
    }

    async fn wait_for_completion(cache: &ScrubbingWindowCache) {
        for _ in 0..500 {
            if !cache.is_generating() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("window generation did not finish");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn generation_fills_and_bounds_the_window() {
        let cache = ScrubbingWindowCache::new(&test_config());
        cache.start(Arc::new(FrameDecoder::new()), 10.0, 60.0);
        wait_for_completion(&cache).await;

        let capacity = test_config().window_capacity();
        assert!(!cache.is_empty());
        assert!(
            cache.len() <= capacity,
            "window size {} exceeds bound {}",
            cache.len(),
            capacity
        );
        for t in cache.cached_timestamps() {
            assert!(
                (t - 10.0).abs() <= 1.0 + 1e-9,
                "frame at {} is outside the window",
                t
            );
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn window_clamps_to_media_bounds() {
        let cache = ScrubbingWindowCache::new(&test_config());
        cache.start(Arc::new(FrameDecoder::new()), 0.0, 60.0);
        wait_for_completion(&cache).await;

        let timestamps = cache.cached_timestamps();
        assert_eq!(timestamps.first().copied(), Some(0.0));
        assert!(timestamps.iter().all(|&t| t >= 0.0));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn get_frame_returns_nearest_by_timestamp() {
        let cache = ScrubbingWindowCache::new(&test_config());
        assert!(cache.get_frame(1.0).is_none(), "empty window is a miss");

        cache.start(Arc::new(FrameDecoder::new()), 10.0, 60.0);
        wait_for_completion(&cache).await;

        // Frames land on 0.25s steps; 10.1 is nearest to 10.0, whose
        // placeholder color indexes floor(10.0) % 5 == 0.
        let frame = cache.get_frame(10.1).expect("hit");
        let [r, g, b] = crate::decoder::PLACEHOLDER_COLORS[0];
        assert_eq!(frame.get_pixel(0, 0).0, [r, g, b, 255]);

        // Far out-of-range lookups clamp to the window edge rather than miss.
        assert!(cache.get_frame(500.0).is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_supersedes_prior_run() {
        let cache = ScrubbingWindowCache::new(&test_config());
        let decoder = Arc::new(FrameDecoder::new());
        cache.start(Arc::clone(&decoder), 10.0, 600.0);
        cache.start(decoder, 100.0, 600.0);
        wait_for_completion(&cache).await;

        assert!(!cache.is_empty());
        for t in cache.cached_timestamps() {
            assert!(
                (t - 100.0).abs() <= 1.0 + 1e-9,
                "stale frame at {} survived the restart",
                t
            );
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clear_cancels_and_empties() {
        let cache = ScrubbingWindowCache::new(&test_config());
        cache.start(Arc::new(FrameDecoder::new()), 10.0, 60.0);
        cache.clear();
        assert!(cache.is_empty());

        // A stale in-flight decode may still land right after clear; the next
        // start owns the window again.
        cache.start(Arc::new(FrameDecoder::new()), 5.0, 60.0);
        wait_for_completion(&cache).await;
        for t in cache.cached_timestamps() {
            assert!((t - 5.0).abs() <= 1.0 + 1e-9);
        }
    }
}
