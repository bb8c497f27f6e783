//! Paths into `classify_engine` used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Access path to the `classify_engine` crate.
///
/// `::classify_engine` for direct dependents, `::classify::engine` for
/// crates depending on the facade. Resolved once per derive invocation.
pub(crate) fn classify_engine() -> syn::Path {
    classify_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("classify_engine"))
}

#[inline(always)]
pub(crate) fn macro_exports_(classify_engine_path: &syn::Path) -> TokenStream {
    quote! {
        #classify_engine_path::__macro_exports
    }
}
