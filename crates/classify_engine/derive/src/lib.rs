//! `#[derive(Classify)]`, re-exported by `classify_engine`.
//!
//! See the `Classify` derive documentation there for the supported shapes
//! and attributes.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static CLASSIFY_ATTRIBUTE_NAME: &str = "classify";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// Implements `Classify` (and `ClassifyObject` or `DictionaryKey` where the
/// shape allows).
#[proc_macro_derive(Classify, attributes(classify))]
pub fn derive_classify(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::match_classify_impls(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
