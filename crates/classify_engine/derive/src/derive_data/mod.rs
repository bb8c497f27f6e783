//! Parsed form of the derive input.

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod enum_data;
mod struct_data;

// -----------------------------------------------------------------------------
// Internal API

pub(crate) use attributes::{FieldAttributes, TypeAttributes};
pub(crate) use enum_data::{ClassifyEnum, EnumVariant, VariantField, VariantFields};
pub(crate) use struct_data::{ClassifyStruct, StructField};

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt as _;
use syn::{DeriveInput, GenericParam, Generics, Ident, WhereClause};

use crate::path;

// -----------------------------------------------------------------------------
// TypeMeta

/// What every generated impl needs to know about the type.
pub(crate) struct TypeMeta<'a> {
    pub ident: &'a Ident,
    pub generics: &'a Generics,
    pub attrs: TypeAttributes,
    /// `path::to::classify_engine::__macro_exports`
    pub exports: TokenStream,
}

impl<'a> TypeMeta<'a> {
    pub fn new(ast: &'a DeriveInput) -> syn::Result<Self> {
        if let Some(lifetime) = ast.generics.lifetimes().next() {
            return Err(syn::Error::new_spanned(
                lifetime,
                "`Classify` types must be `'static`, lifetime parameters are not supported",
            ));
        }

        let engine = path::classify_engine();
        Ok(Self {
            ident: &ast.ident,
            generics: &ast.generics,
            attrs: TypeAttributes::parse_attrs(&ast.attrs)?,
            exports: path::macro_exports_(&engine),
        })
    }

    /// The stored type name, without generic arguments.
    pub fn base_name(&self) -> String {
        match &self.attrs.rename {
            Some(name) => name.value(),
            None => self.ident.unraw().to_string(),
        }
    }

    /// Body of `Classify::type_name`.
    pub fn type_name_expr(&self) -> TokenStream {
        let ce = &self.exports;
        let base = self.base_name();

        let arguments: Vec<_> = self
            .generics
            .type_params()
            .map(|param| {
                let ident = &param.ident;
                quote!(<#ident as #ce::Classify>::type_name())
            })
            .collect();

        if arguments.is_empty() {
            quote!(#ce::Cow::Borrowed(#base))
        } else {
            quote!(#ce::generic_type_name(#base, &[#(#arguments),*]))
        }
    }

    /// The type's where clause with `Classify` bounds on every type parameter
    /// and the `extra` predicates appended.
    pub fn where_clause(&self, extra: &[TokenStream]) -> WhereClause {
        let ce = &self.exports;
        let mut generics = self.generics.clone();
        let where_clause = generics.make_where_clause();

        for param in self.generics.params.iter() {
            if let GenericParam::Type(param) = param {
                let ident = &param.ident;
                where_clause
                    .predicates
                    .push(syn::parse_quote!(#ident: #ce::Classify));
            }
        }
        for predicate in extra {
            where_clause.predicates.push(syn::parse_quote!(#predicate));
        }
        where_clause.clone()
    }
}
