//! Decoder process spawning.
//!
//! Spawns the staged binary once per frame request, reads the encoded still
//! image from stdout on the calling thread, and drains stderr on a background
//! thread into a capped buffer. Blocks until the process exits; callers run it
//! on the blocking pool.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

#[cfg(windows)]
use std::os::windows::process::CommandExt;

use crate::error::PreviewError;

/// Keep only the last N bytes of stderr to avoid unbounded memory growth.
const MAX_STDERR_BYTES: usize = 64 * 1024;

fn drain_stderr<R: Read + Send + 'static>(reader: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut reader = reader;
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match reader.read(&mut chunk) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    buf.extend_from_slice(&chunk[..n]);
                    if buf.len() > MAX_STDERR_BYTES {
                        let excess = buf.len() - MAX_STDERR_BYTES;
                        buf.drain(..excess);
                    }
                }
            }
        }
        buf
    })
}

/// Run the decoder and block until it exits. Returns the raw encoded image
/// bytes it wrote to stdout. Non-zero exit or empty output is a `DecodeFailed`.
pub fn run_extract_blocking(binary: &Path, args: &[String]) -> Result<Vec<u8>, PreviewError> {
    log::debug!(
        target: "scrub_preview::ffmpeg::runner",
        "spawning decoder: path={}, args={:?}",
        binary.display(),
        args
    );

    let mut cmd = Command::new(binary);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(windows)]
    cmd.creation_flags(0x08000000); // CREATE_NO_WINDOW
    let mut child = cmd
        .spawn()
        .map_err(|e| PreviewError::decode_failed(-1, format!("failed to spawn decoder: {}", e)))?;

    let mut stdout = match child.stdout.take() {
        Some(s) => s,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PreviewError::from("failed to capture stdout"));
        }
    };
    let stderr = match child.stderr.take() {
        Some(s) => s,
        None => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(PreviewError::from("failed to capture stderr"));
        }
    };

    let stderr_handle = drain_stderr(stderr);

    let mut image_bytes = Vec::new();
    let read_result = stdout.read_to_end(&mut image_bytes);

    let status = child.wait().map_err(|e| e.to_string())?;
    let stderr_bytes = stderr_handle.join().unwrap_or_default();
    let stderr_str = String::from_utf8_lossy(&stderr_bytes).to_string();

    if let Err(err) = read_result {
        return Err(PreviewError::decode_failed(
            status.code().unwrap_or(-1),
            format!("failed to read decoder stdout: {}", err),
        ));
    }

    if !status.success() {
        let code = status.code().unwrap_or(-1);
        let err_preview = stderr_str.lines().rev().take(3).collect::<Vec<_>>().join("; ");
        log::error!(
            target: "scrub_preview::ffmpeg::runner",
            "decoder failed (code={}): {}",
            code,
            err_preview
        );
        return Err(PreviewError::DecodeFailed {
            code,
            stderr: stderr_str,
        });
    }

    if image_bytes.is_empty() {
        log::error!(
            target: "scrub_preview::ffmpeg::runner",
            "decoder exited cleanly but produced no image data"
        );
        return Err(PreviewError::DecodeFailed {
            code: 0,
            stderr: stderr_str,
        });
    }

    log::trace!(
        target: "scrub_preview::ffmpeg::runner",
        "decoder produced {} image bytes",
        image_bytes.len()
    );
    Ok(image_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_binary_is_spawn_failure() {
        let err = run_extract_blocking(&PathBuf::from("/nonexistent/decoder"), &[])
            .expect_err("should fail to spawn");
        match err {
            PreviewError::DecodeFailed { code, stderr } => {
                assert_eq!(code, -1);
                assert!(stderr.contains("failed to spawn"));
            }
            _ => panic!("expected DecodeFailed"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn clean_exit_without_output_is_decode_failure() {
        let err = run_extract_blocking(&PathBuf::from("/bin/true"), &[])
            .expect_err("empty stdout should fail");
        assert!(matches!(err, PreviewError::DecodeFailed { code: 0, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_carries_code_and_stderr() {
        let args = vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()];
        let err = run_extract_blocking(&PathBuf::from("/bin/sh"), &args)
            .expect_err("exit 3 should fail");
        match err {
            PreviewError::DecodeFailed { code, stderr } => {
                assert_eq!(code, 3);
                assert!(stderr.contains("boom"));
            }
            _ => panic!("expected DecodeFailed"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdout_bytes_are_returned_verbatim() {
        let args = vec!["-c".to_string(), "printf 'jpegdata'".to_string()];
        let bytes = run_extract_blocking(&PathBuf::from("/bin/sh"), &args).expect("output");
        assert_eq!(bytes, b"jpegdata");
    }
}
