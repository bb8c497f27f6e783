use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::ClassifyEnum;

/// `Classify` and `DictionaryKey` for an enum whose variants are all units.
///
/// The value is stored as the variant tag.
pub(crate) fn impl_unit_enum(info: &ClassifyEnum) -> TokenStream {
    let meta = &info.meta;
    let ce = &meta.exports;
    let ident = meta.ident;
    let (impl_generics, ty_generics, _) = meta.generics.split_for_impl();
    let where_clause = meta.where_clause(&[]);
    let type_name = meta.type_name_expr();
    let target = meta.base_name();

    let variants: Vec<_> = info.variants.iter().map(|v| v.ident).collect();
    let tags: Vec<_> = info.variants.iter().map(|v| v.tag.as_str()).collect();

    quote! {
        const _: () = {
            impl #impl_generics #ce::DictionaryKey for #ident #ty_generics #where_clause {
                fn to_key(&self) -> #ce::String {
                    match self {
                        #(Self::#variants => #ce::String::from(#tags),)*
                    }
                }

                fn from_key(key: &str) -> #ce::Result<Self, #ce::ConvertError> {
                    match key {
                        #(#tags => #ce::Result::Ok(Self::#variants),)*
                        _ => #ce::Result::Err(#ce::ConvertError::Malformed {
                            text: #ce::String::from(key),
                            target: #target,
                        }),
                    }
                }
            }

            impl #impl_generics #ce::Classify for #ident #ty_generics #where_clause {
                const KIND: #ce::FieldKind = #ce::FieldKind::Enum;

                fn type_name() -> #ce::Cow<'static, str> {
                    #type_name
                }

                fn write<__F: #ce::ClassifyFormat>(
                    &self,
                    writer: &mut #ce::Writer<'_, __F>,
                ) -> #ce::Result<__F::Element, #ce::ClassifyError> {
                    #ce::Result::Ok(writer.write_text(#ce::DictionaryKey::to_key(self)))
                }

                fn read<__F: #ce::ClassifyFormat>(
                    element: &__F::Element,
                    reader: &mut #ce::Reader<'_, __F>,
                ) -> #ce::Result<Self, #ce::ClassifyError> {
                    let text = reader.read_text(element)?;
                    reader.read_key::<Self>(&text)
                }
            }
        };
    }
}
