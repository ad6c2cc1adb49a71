//! Timeline thumbnail cache: one low-resolution frame per whole second across
//! the full media duration.
//!
//! Entries live for the whole session and are only dropped by manager cleanup.
//! The map allows point reads while generation inserts, with no global lock;
//! generation paces itself so indexing never starves the scrubbing path.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use image::RgbaImage;

use crate::config::PreviewConfig;
use crate::decoder::FrameDecoder;
use crate::task::{CancelFlag, TaskSlot};

pub struct TimelineThumbnailCache {
    thumbs: Arc<DashMap<u64, Arc<RgbaImage>>>,
    tasks: TaskSlot,
    thumb_height: u32,
    pacing: Duration,
}

impl TimelineThumbnailCache {
    pub(crate) fn new(config: &PreviewConfig) -> Self {
        Self {
            thumbs: Arc::new(DashMap::new()),
            tasks: TaskSlot::new(),
            thumb_height: config.effective_timeline_thumb_height(),
            pacing: Duration::from_millis(config.effective_timeline_pacing_ms()),
        }
    }

    /// (Re)start generation over seconds `0..floor(duration)`. Seconds already
    /// cached are skipped, so a restart resumes instead of re-decoding. Must be
    /// called from within a tokio runtime.
    ///
    /// The trailing partial second gets no entry: a 5.9s clip is indexed at
    /// seconds 0 through 4, and `get_thumbnail(5)` misses. Hosts sizing a seek
    /// bar should use `floor(duration)` slots; the scrubbing window covers the
    /// tail when the user seeks into it.
    pub fn start(&self, decoder: Arc<FrameDecoder>, duration_secs: f64) {
        self.tasks.cancel();
        let seconds = duration_secs.max(0.0).floor() as u64;
        let thumbs = Arc::clone(&self.thumbs);
        let height = self.thumb_height;
        let pacing = self.pacing;
        self.tasks.restart(move |cancel| {
            tokio::spawn(generate_timeline(
                decoder, thumbs, cancel, seconds, height, pacing,
            ))
        });
    }

    /// Direct keyed lookup; safe against concurrent generation.
    pub fn get_thumbnail(&self, second: u64) -> Option<Arc<RgbaImage>> {
        self.thumbs.get(&second).map(|entry| Arc::clone(entry.value()))
    }

    /// Cancel generation and drop all entries. Only the manager calls this.
    pub(crate) fn clear(&self) {
        self.tasks.cancel();
        self.thumbs.clear();
    }

    pub fn len(&self) -> usize {
        self.thumbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thumbs.is_empty()
    }

    pub fn is_generating(&self) -> bool {
        self.tasks.is_running()
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&self, second: u64, image: Arc<RgbaImage>) {
        self.thumbs.insert(second, image);
    }
}

async fn generate_timeline(
    decoder: Arc<FrameDecoder>,
    thumbs: Arc<DashMap<u64, Arc<RgbaImage>>>,
    cancel: CancelFlag,
    seconds: u64,
    height: u32,
    pacing: Duration,
) {
    log::debug!(
        target: "scrub_preview::timeline",
        "indexing {} second(s) at height {}",
        seconds,
        height
    );

    for second in 0..seconds {
        if cancel.is_cancelled() {
            log::debug!(
                target: "scrub_preview::timeline",
                "timeline generation superseded at second {}",
                second
            );
            return;
        }
        // Re-insertion is a skip, not an overwrite; restarts resume from here.
        if thumbs.contains_key(&second) {
            continue;
        }
        let frame_decoder = Arc::clone(&decoder);
        let image = match tokio::task::spawn_blocking(move || {
            frame_decoder.decode_frame_at_time(second as f64, height)
        })
        .await
        {
            Ok(image) => image,
            Err(_) => return, // runtime shutting down
        };
        thumbs.insert(second, image);
        tokio::time::sleep(pacing).await;
    }

    log::debug!(
        target: "scrub_preview::timeline",
        "timeline generation complete: {} entries",
        thumbs.len()
    );
}
