//! Media duration probe via the decoder's stderr banner.
//!
//! The decoder prints `Duration: HH:MM:SS.ms` while opening any input; a
//! decode-to-null run surfaces it without producing frames. Lets hosts seed
//! timeline generation without shipping a separate probe tool.

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::LazyLock;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

use regex::Regex;

use super::path_to_string;
use crate::error::PreviewError;

static DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Duration: (\d+):(\d+):([\d.]+)").expect("invalid duration regex"));

/// Parse one stderr line. Returns duration in seconds when the line carries it.
pub fn parse_duration_line(line: &str) -> Option<f64> {
    let caps = DURATION_RE.captures(line)?;
    let hours: f64 = caps[1].parse().unwrap_or(0.0);
    let minutes: f64 = caps[2].parse().unwrap_or(0.0);
    let seconds: f64 = caps[3].parse().unwrap_or(0.0);
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Probe media duration by decoding to null and scanning the stderr banner.
pub fn probe_duration(binary: &Path, media_path: &Path) -> Result<f64, PreviewError> {
    let mut cmd = Command::new(binary);
    cmd.args(["-i", &path_to_string(media_path), "-f", "null", "-"])
        .stdin(Stdio::null());
    #[cfg(windows)]
    cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
    let output = cmd
        .output()
        .map_err(|e| PreviewError::decode_failed(-1, format!("failed to spawn decoder: {}", e)))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr.lines().find_map(parse_duration_line).ok_or_else(|| {
        PreviewError::decode_failed(
            output.status.code().unwrap_or(-1),
            format!("no duration in decoder output for {}", media_path.display()),
        )
    })
}
