use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// FormatError

/// Errors raised by a format adapter while shaping or parsing elements.
///
/// These never describe a Rust type mismatch; that is the engine's job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error("unrecognized encoding `{0}`")]
    UnknownEncoding(String),

    #[error("invalid escape sequence in `{text}`: {reason}")]
    InvalidEscape { text: String, reason: &'static str },

    #[error("invalid code point `{0}`")]
    InvalidCodepoint(String),

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("malformed XML: {0}")]
    Xml(String),

    #[cfg(feature = "json")]
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected}, found {found}")]
    UnexpectedShape { expected: &'static str, found: String },

    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
}
