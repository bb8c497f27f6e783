#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate std;

pub use classify_engine as engine;
pub use classify_format as format;
pub use classify_utils as utils;

pub use classify_engine::{
    Classifier, Classify, ClassifyError, ClassifyObject, ClassifyOptions, Deferred, KeyValuePair, Strictness,
};

#[cfg(feature = "xml")]
pub mod xml;
