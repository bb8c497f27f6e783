//! Code generation, one module per supported shape.

// -----------------------------------------------------------------------------
// Modules

mod data_enum;
mod struct_kind;
mod unit_enum;

use proc_macro2::TokenStream;
use syn::{Data, DeriveInput};

use crate::derive_data::{ClassifyEnum, ClassifyStruct};

// -----------------------------------------------------------------------------
// Dispatch

pub(crate) fn match_classify_impls(ast: &DeriveInput) -> syn::Result<TokenStream> {
    match &ast.data {
        Data::Struct(data) => {
            let classify_struct = ClassifyStruct::new(ast, &data.fields)?;
            Ok(struct_kind::impl_struct(&classify_struct))
        }
        Data::Enum(data) => {
            let classify_enum = ClassifyEnum::new(ast, data)?;
            if classify_enum.is_unit_only() {
                Ok(unit_enum::impl_unit_enum(&classify_enum))
            } else {
                Ok(data_enum::impl_data_enum(&classify_enum))
            }
        }
        Data::Union(data) => Err(syn::Error::new_spanned(
            data.union_token,
            "unions cannot be classified",
        )),
    }
}
