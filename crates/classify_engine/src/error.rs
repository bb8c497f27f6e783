use alloc::borrow::Cow;
use alloc::string::String;
use std::path::PathBuf;

use classify_format::FormatError;
use thiserror::Error;

// -----------------------------------------------------------------------------
// ClassifyError

/// Errors raised while classifying or declassifying a value.
///
/// The variants fall in three groups:
///
/// - [`Configuration`](Self::Configuration) and
///   [`UnsupportedCyclicReference`](Self::UnsupportedCyclicReference) point at
///   a programming error and are never recovered from.
/// - [`Data`](Self::Data) is bad input for one field. In
///   [lenient](crate::Strictness::Lenient) mode the reader logs it and keeps
///   the field's default value.
/// - [`Io`](Self::Io), [`Format`](Self::Format) and
///   [`DepthExceeded`](Self::DepthExceeded) abort the whole call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClassifyError {
    #[error("`{type_name}` cannot be classified: {message}")]
    Configuration {
        type_name: Cow<'static, str>,
        message: String,
    },

    #[error("invalid data at `{path}`: {message}")]
    Data { path: String, message: String },

    #[error("cannot access `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("cyclic reference to `{type_name}` at `{path}`, but references are disabled")]
    UnsupportedCyclicReference {
        type_name: Cow<'static, str>,
        path: String,
    },

    #[error("nesting exceeds {limit} levels at `{path}`")]
    DepthExceeded { limit: usize, path: String },
}

impl ClassifyError {
    #[inline]
    pub fn configuration(
        type_name: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` for errors the lenient policy may recover from.
    #[inline]
    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }
}

// -----------------------------------------------------------------------------
// ConvertError

/// Failure of an [`ExactConvert`](crate::ExactConvert) parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("`{text}` is not a valid {target}")]
    Malformed { text: String, target: &'static str },

    #[error("`{text}` is out of range for {target}")]
    OutOfRange { text: String, target: &'static str },
}
