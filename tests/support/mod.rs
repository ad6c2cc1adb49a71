#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

use scrub_preview::ffmpeg::BinaryProvisioner;
use scrub_preview::{PreviewCacheManager, PreviewConfig};

static INIT_LOGGING: Once = Once::new();

pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Small, fast config for lifecycle tests. fps 4 keeps step timestamps
/// exactly representable (0.25s).
pub fn test_config() -> PreviewConfig {
    PreviewConfig {
        window_seconds: Some(2.0),
        window_fps: Some(4.0),
        scrub_frame_height: Some(18),
        timeline_thumb_height: Some(9),
        timeline_pacing_ms: Some(1),
    }
}

/// Manager whose provisioner points at a real (fake-content) asset inside `dir`.
/// Decodes will fail and fall back to placeholders, which is what the
/// lifecycle tests exercise.
pub fn manager_with_fake_asset(dir: &Path) -> PreviewCacheManager {
    init_logging();
    let asset = dir.join("bundled-decoder");
    fs::write(&asset, b"#!/bin/sh\nexit 1\n").expect("write asset");
    let provisioner = BinaryProvisioner::new(asset, dir.join("cache"));
    PreviewCacheManager::new(test_config(), provisioner)
}

/// Manager whose provisioner has no asset at all: initialize must fail.
pub fn manager_with_missing_asset(dir: &Path) -> PreviewCacheManager {
    init_logging();
    let provisioner = BinaryProvisioner::new(dir.join("no-such-asset"), dir.join("cache"));
    PreviewCacheManager::new(test_config(), provisioner)
}

pub async fn wait_for_window(manager: &PreviewCacheManager) {
    for _ in 0..500 {
        if !manager.window().is_generating() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("window generation did not finish");
}

pub async fn wait_for_timeline(manager: &PreviewCacheManager) {
    for _ in 0..500 {
        if !manager.timeline().is_generating() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timeline generation did not finish");
}
