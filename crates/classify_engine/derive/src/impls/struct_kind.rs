use proc_macro2::{Literal, TokenStream};
use quote::quote;

use crate::derive_data::{ClassifyStruct, StructField};

/// `Classify` and `ClassifyObject` for a struct with named fields.
pub(crate) fn impl_struct(info: &ClassifyStruct) -> TokenStream {
    let meta = &info.meta;
    let ce = &meta.exports;
    let ident = meta.ident;
    let (impl_generics, ty_generics, _) = meta.generics.split_for_impl();
    let where_clause = meta.where_clause(&[quote!(Self: #ce::Default)]);
    let type_name = meta.type_name_expr();

    let descriptors = info.fields.iter().map(|field| field_descriptor(field, ce));

    let indices: Vec<_> = info
        .serialized_fields()
        .map(|field| Literal::usize_unsuffixed(field.index))
        .collect();
    let members: Vec<_> = info.serialized_fields().map(|field| field.member).collect();

    let parents = info
        .fields
        .iter()
        .filter(|field| field.attrs.parent.is_some())
        .map(|field| field.member);

    let capture_id = info
        .fields
        .iter()
        .find(|field| field.attrs.captures_id.is_some())
        .map(|field| {
            let member = field.member;
            quote! {
                fn capture_id(&mut self, id: &str) {
                    #ce::store_captured_id(&mut self.#member, id);
                }
            }
        });

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
                    writer.write_object(self)
                }

                fn read<__F: #ce::ClassifyFormat>(
                    element: &__F::Element,
                    reader: &mut #ce::Reader<'_, __F>,
                ) -> #ce::Result<Self, #ce::ClassifyError> {
                    reader.read_object::<Self>(element)
                }

                #capture_id
            }

            impl #impl_generics #ce::ClassifyObject for #ident #ty_generics #where_clause {
                fn describe() -> #ce::Result<#ce::TypeDescriptor, #ce::ClassifyError> {
                    #ce::TypeDescriptor::new(
                        <Self as #ce::Classify>::type_name(),
                        #ce::Vec::from([#(#descriptors),*]),
                    )
                }

                #[allow(unused_variables)]
                fn write_field<__F: #ce::ClassifyFormat>(
                    &self,
                    field: &#ce::FieldDescriptor,
                    writer: &mut #ce::Writer<'_, __F>,
                ) -> #ce::Result<__F::Element, #ce::ClassifyError> {
                    match field.index() {
                        #(#indices => writer.write_field(field, &self.#members),)*
                        _ => #ce::Result::Err(#ce::unknown_field::<Self>(field)),
                    }
                }

                #[allow(unused_variables)]
                fn read_field<__F: #ce::ClassifyFormat>(
                    &mut self,
                    field: &#ce::FieldDescriptor,
                    element: &__F::Element,
                    reader: &mut #ce::Reader<'_, __F>,
                ) -> #ce::Result<(), #ce::ClassifyError> {
                    match field.index() {
                        #(#indices => {
                            self.#members = reader.read_field(field, element)?;
                            #ce::Result::Ok(())
                        })*
                        _ => #ce::Result::Err(#ce::unknown_field::<Self>(field)),
                    }
                }

                #[allow(unused_variables)]
                fn attach_parent(&mut self, parent: #ce::Option<&#ce::Rc<dyn #ce::Any>>) {
                    #(#ce::ParentSlot::attach(&mut self.#parents, parent);)*
                }
            }
        };
    }
}

fn field_descriptor(field: &StructField, ce: &TokenStream) -> TokenStream {
    let ty = field.ty;
    let name = &field.name;
    let attrs = &field.attrs;

    let (constructor, modifier) = if attrs.ignore.is_some() {
        (quote!(unclassified), Some(quote!(IGNORE)))
    } else if attrs.parent.is_some() {
        (quote!(unclassified), Some(quote!(PARENT)))
    } else if attrs.captures_id.is_some() {
        (quote!(unclassified), Some(quote!(CAPTURES_ID)))
    } else if attrs.follow_id.is_some() {
        (quote!(new), Some(quote!(FOLLOW_ID)))
    } else {
        (quote!(new), None)
    };

    let modifier = modifier.map(|modifier| quote!(.with_modifiers(#ce::FieldModifiers::#modifier)));
    let rename = attrs.rename.as_ref().map(|rename| quote!(.renamed(#rename)));

    quote! {
        #ce::FieldDescriptor::#constructor::<#ty>(#name) #modifier #rename
    }
}
