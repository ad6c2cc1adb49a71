//! Map decoder exit codes to user-friendly messages.
//!
//! Exit codes are from ffmpeg.c: 1 (general), 123 (hard exit), 255 (signal).
//! -1 is used for spawn failure. Stderr is kept as detail for debugging.

use serde::Serialize;

/// Payload surfaced to hosts when a decode fails. Summary is short; detail is
/// the trimmed stderr.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeErrorPayload {
    pub summary: String,
    pub detail: String,
}

/// Maps a decoder exit code to a short summary. Stderr is passed through as detail.
pub fn parse_decode_error(stderr: &str, exit_code: Option<i32>) -> DecodeErrorPayload {
    let summary = match exit_code {
        Some(code) => match known_exit_code_summary(code) {
            Some(msg) => msg,
            None => format!("Frame decode failed (exit code {}).", code),
        },
        None => fallback_summary(stderr),
    };
    let detail = stderr.trim().to_string();
    DecodeErrorPayload { summary, detail }
}

fn known_exit_code_summary(code: i32) -> Option<String> {
    match code {
        -1 => Some("Decoder not found or failed to start.".into()),
        1 => Some("Frame decode failed.".into()),
        123 | 255 => Some("Frame decode was stopped.".into()),
        _ => None,
    }
}

const ELLIPSIS: &str = "…";
const SUMMARY_MAX_BYTES: usize = 120;

/// First non-empty line of stderr, truncated on a char boundary with "…"
/// appended when cut. Decoder stderr can contain non-ASCII filenames.
fn fallback_summary(stderr: &str) -> String {
    let first = stderr
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(stderr);
    if first.len() <= SUMMARY_MAX_BYTES {
        return first.to_string();
    }
    let budget = SUMMARY_MAX_BYTES - ELLIPSIS.len();
    let cut = first
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= budget)
        .last()
        .unwrap_or(0);
    format!("{}{}", &first[..cut], ELLIPSIS)
}
