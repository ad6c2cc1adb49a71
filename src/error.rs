//! Error type for the preview subsystem. Implements Display and Serialize for host frontends.

use crate::ffmpeg::parse_decode_error;

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("decoder binary unavailable: {0}")]
    BinaryUnavailable(String),

    #[error("decode failed (code {code}): {stderr}")]
    DecodeFailed { code: i32, stderr: String },
}

impl PreviewError {
    pub fn binary_unavailable(reason: impl Into<String>) -> Self {
        Self::BinaryUnavailable(reason.into())
    }

    pub fn decode_failed(code: i32, stderr: impl Into<String>) -> Self {
        Self::DecodeFailed {
            code,
            stderr: stderr.into(),
        }
    }
}

impl serde::Serialize for PreviewError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            PreviewError::DecodeFailed { code, stderr } => {
                let payload = parse_decode_error(stderr, Some(*code));
                let json =
                    serde_json::json!({ "summary": payload.summary, "detail": payload.detail });
                serializer.serialize_str(&json.to_string())
            }
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

impl From<String> for PreviewError {
    fn from(s: String) -> Self {
        PreviewError::DecodeFailed {
            code: -1,
            stderr: s,
        }
    }
}

impl From<&str> for PreviewError {
    fn from(s: &str) -> Self {
        s.to_string().into()
    }
}
