#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code names the engine through `classify_engine`, which must also
// resolve inside this crate's own tests.
extern crate self as classify_engine;

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod classifier;
mod classify;
mod convert;
mod deferred;
mod error;
mod ids;
mod options;
mod path;
mod reader;
mod writer;

pub mod impls;
pub mod introspect;

#[cfg(all(test, feature = "xml", feature = "json"))]
mod tests;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use classifier::Classifier;
pub use classify::{Classify, ClassifyObject, DictionaryKey, ParentSlot};
pub use convert::ExactConvert;
pub use deferred::Deferred;
pub use error::{ClassifyError, ConvertError};
pub use impls::{Bytes, KeyValuePair};
pub use introspect::{FieldDescriptor, FieldKind, FieldModifiers, TypeDescriptor, descriptor_of};
pub use options::{ClassifyOptions, Strictness};
pub use reader::Reader;
pub use writer::Writer;

/// Derives [`Classify`] for structs and enums.
///
/// - Structs with named fields (and unit structs) become nested objects and
///   also implement [`ClassifyObject`]. They must implement `Default`.
/// - Enums whose variants are all units are stored as the variant name and
///   can be dictionary keys.
/// - Other enums are tagged with the variant name.
///
/// Field attributes: `#[classify(ignore)]`, `#[classify(parent)]`,
/// `#[classify(follow_id)]`, `#[classify(captures_id)]` and
/// `#[classify(rename = "...")]`. `rename` also applies to the type and to
/// variants.
pub use classify_derive::Classify;

pub use classify_format::{ClassifyFormat, Encoding, FormatError, SimpleValue};

#[cfg(feature = "json")]
pub use classify_format::JsonFormat;
#[cfg(feature = "xml")]
pub use classify_format::{XmlElement, XmlFormat};
