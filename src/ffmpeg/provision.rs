//! Staging of the bundled frame-decoder binary into private storage.
//!
//! The decoder ships as a single-file sidecar asset. `ensure_available` copies
//! it into the session cache directory once, marks it executable, and hands
//! back the staged path; `cleanup` removes the copy so a later call re-stages.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PreviewError;

/// Env override consulted before staging. Points tests/CI at a system decoder.
pub const DECODER_PATH_ENV: &str = "SCRUB_DECODER_PATH";

#[cfg(windows)]
const STAGED_FILE_NAME: &str = "scrub-decoder.exe";
#[cfg(not(windows))]
const STAGED_FILE_NAME: &str = "scrub-decoder";

pub struct BinaryProvisioner {
    asset_path: PathBuf,
    cache_dir: PathBuf,
}

impl BinaryProvisioner {
    pub fn new(asset_path: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_path: asset_path.into(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Provisioner for the sidecar asset shipped next to the current executable.
    pub fn bundled(cache_dir: impl Into<PathBuf>) -> Self {
        let asset = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(STAGED_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(STAGED_FILE_NAME));
        Self::new(asset, cache_dir)
    }

    /// Deterministic location of the staged copy inside the cache directory.
    pub fn staged_path(&self) -> PathBuf {
        self.cache_dir.join(STAGED_FILE_NAME)
    }

    /// Returns the path to a usable decoder binary, staging the bundled asset
    /// if the cached copy is missing or zero-length. Idempotent: a valid copy
    /// is returned as-is with its executable bit re-asserted.
    pub fn ensure_available(&self) -> Result<PathBuf, PreviewError> {
        if let Ok(env_path) = std::env::var(DECODER_PATH_ENV) {
            let p = PathBuf::from(&env_path);
            if p.exists() {
                log::debug!(
                    target: "scrub_preview::ffmpeg::provision",
                    "decoder from {} env: {}",
                    DECODER_PATH_ENV,
                    p.display()
                );
                return Ok(p);
            }
        }

        let staged = self.staged_path();
        if is_valid_copy(&staged) {
            mark_executable(&staged)?;
            log::trace!(
                target: "scrub_preview::ffmpeg::provision",
                "decoder already staged: {}",
                staged.display()
            );
            return Ok(staged);
        }

        if !self.asset_path.exists() {
            log::error!(
                target: "scrub_preview::ffmpeg::provision",
                "bundled decoder asset missing: {}",
                self.asset_path.display()
            );
            return Err(PreviewError::binary_unavailable(format!(
                "bundled decoder asset missing at {}",
                self.asset_path.display()
            )));
        }

        fs::create_dir_all(&self.cache_dir).map_err(|e| stage_error(&staged, e))?;
        fs::copy(&self.asset_path, &staged).map_err(|e| stage_error(&staged, e))?;
        mark_executable(&staged)?;
        log::info!(
            target: "scrub_preview::ffmpeg::provision",
            "staged decoder binary: {} -> {}",
            self.asset_path.display(),
            staged.display()
        );
        Ok(staged)
    }

    /// Deletes the staged copy. The next `ensure_available` re-stages it.
    pub fn cleanup(&self) {
        let staged = self.staged_path();
        if let Err(err) = fs::remove_file(&staged) {
            if err.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    target: "scrub_preview::ffmpeg::provision",
                    "failed to remove staged decoder {}: {}",
                    staged.display(),
                    err
                );
            }
        }
    }
}

fn is_valid_copy(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

fn stage_error(staged: &Path, err: std::io::Error) -> PreviewError {
    PreviewError::binary_unavailable(format!("failed to stage {}: {}", staged.display(), err))
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> Result<(), PreviewError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .map_err(|e| stage_error(path, e))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> Result<(), PreviewError> {
    Ok(())
}
