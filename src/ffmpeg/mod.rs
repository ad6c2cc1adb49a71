mod builder;
mod error;
mod probe;
pub mod provision;
mod runner;

pub use builder::{build_extract_args, calculate_width};
pub use error::{DecodeErrorPayload, parse_decode_error};
pub use probe::{parse_duration_line, probe_duration};
pub use provision::BinaryProvisioner;
pub use runner::run_extract_blocking;

/// Path to string for subprocess args or logging.
pub fn path_to_string(path: &(impl AsRef<std::path::Path> + ?Sized)) -> String {
    path.as_ref().to_string_lossy().to_string()
}
