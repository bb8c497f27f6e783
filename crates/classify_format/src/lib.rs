#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod encoding;
mod error;
mod format;

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "xml")]
pub mod xml;

// -----------------------------------------------------------------------------
// Exports

pub use encoding::{Encoding, SimpleValue, escape_c_literal, unescape_c_literal};
pub use error::FormatError;
pub use format::{ClassifyFormat, MarkerRewrite};

#[cfg(feature = "json")]
pub use json::JsonFormat;
#[cfg(feature = "xml")]
pub use xml::{XmlElement, XmlFormat};
