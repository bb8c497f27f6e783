use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::{ClassifyEnum, EnumVariant, VariantField, VariantFields};

/// `Classify` for an enum with data-carrying variants.
///
/// Each value is tagged with its variant and stored as an object: newtype
/// variants keep their payload in a `value` member, other variants store
/// their fields.
pub(crate) fn impl_data_enum(info: &ClassifyEnum) -> TokenStream {
    let meta = &info.meta;
    let ce = &meta.exports;
    let ident = meta.ident;
    let (impl_generics, ty_generics, _) = meta.generics.split_for_impl();
    let where_clause = meta.where_clause(&[]);
    let type_name = meta.type_name_expr();

    let write_arms = info.variants.iter().map(|variant| write_arm(variant, ce));
    let read_arms = info.variants.iter().map(|variant| read_arm(variant, ce));

    quote! {
        const _: () = {
            impl #impl_generics #ce::Classify for #ident #ty_generics #where_clause {
                const KIND: #ce::FieldKind = #ce::FieldKind::NestedObject;

                fn type_name() -> #ce::Cow<'static, str> {
                    #type_name
                }

                fn write<__F: #ce::ClassifyFormat>(
                    &self,
                    writer: &mut #ce::Writer<'_, __F>,
                ) -> #ce::Result<__F::Element, #ce::ClassifyError> {
                    let (element, tag) = match self {
                        #(#write_arms)*
                    };
                    #ce::Result::Ok(writer.tag(element, tag))
                }

                fn read<__F: #ce::ClassifyFormat>(
                    element: &__F::Element,
                    reader: &mut #ce::Reader<'_, __F>,
                ) -> #ce::Result<Self, #ce::ClassifyError> {
                    let tag = reader.variant_tag::<Self>(element)?;
                    match tag {
                        #(#read_arms)*
                        other => #ce::Result::Err(reader.unknown_variant::<Self>(other)),
                    }
                }
            }
        };
    }
}

fn write_arm(variant: &EnumVariant, ce: &TokenStream) -> TokenStream {
    let ident = variant.ident;
    let tag = &variant.tag;

    match &variant.fields {
        VariantFields::Unit => quote! {
            Self::#ident => (writer.format().make_object(#ce::Vec::new()), #tag),
        },
        VariantFields::Newtype => quote! {
            Self::#ident(inner) => (writer.write_variant_value(inner)?, #tag),
        },
        VariantFields::Named(fields) | VariantFields::Unnamed(fields) => {
            let pattern = fields.iter().map(|field| {
                let member = &field.member;
                let binding = &field.binding;
                if field.ignore {
                    quote!(#member: _)
                } else {
                    quote!(#member: #binding)
                }
            });
            let stored = fields.iter().filter(|field| !field.ignore);
            let writes = stored.map(|field| {
                let binding = &field.binding;
                let wire_name = &field.wire_name;
                quote!((#wire_name, writer.write_named(#wire_name, #binding)?))
            });
            quote! {
                Self::#ident { #(#pattern),* } => {
                    let fields = #ce::Vec::from([#(#writes),*]);
                    (writer.format().make_object(fields), #tag)
                }
            }
        }
    }
}

fn read_arm(variant: &EnumVariant, ce: &TokenStream) -> TokenStream {
    let ident = variant.ident;
    let tag = &variant.tag;

    match &variant.fields {
        VariantFields::Unit => quote! {
            #tag => #ce::Result::Ok(Self::#ident),
        },
        VariantFields::Newtype => quote! {
            #tag => #ce::Result::Ok(Self::#ident(reader.read_variant_value(element)?)),
        },
        VariantFields::Named(fields) | VariantFields::Unnamed(fields) => {
            let inits = fields.iter().map(|field| field_init(field, ce));
            quote! {
                #tag => #ce::Result::Ok(Self::#ident { #(#inits),* }),
            }
        }
    }
}

fn field_init(field: &VariantField, ce: &TokenStream) -> TokenStream {
    let member = &field.member;
    let wire_name = &field.wire_name;
    if field.ignore {
        quote!(#member: #ce::Default::default())
    } else {
        quote!(#member: reader.read_member(element, #wire_name)?.unwrap_or_default())
    }
}
