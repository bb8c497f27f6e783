use proc_macro2::Span;
use syn::ext::IdentExt as _;
use syn::{DataEnum, DeriveInput, Fields, Ident};

use super::{FieldAttributes, TypeAttributes, TypeMeta};

// -----------------------------------------------------------------------------
// ClassifyEnum

pub(crate) struct ClassifyEnum<'a> {
    pub meta: TypeMeta<'a>,
    pub variants: Vec<EnumVariant<'a>>,
}

pub(crate) struct EnumVariant<'a> {
    pub ident: &'a Ident,
    /// Variant tag on the wire.
    pub tag: String,
    pub fields: VariantFields,
}

pub(crate) enum VariantFields {
    Unit,
    /// A single unnamed field, stored in a `value` member.
    Newtype,
    /// Named fields, stored as an object.
    Named(Vec<VariantField>),
    /// Several unnamed fields, stored as an object with `item1..itemN`.
    Unnamed(Vec<VariantField>),
}

pub(crate) struct VariantField {
    /// Field name for named variants, position for unnamed ones.
    pub member: syn::Member,
    /// Local binding used in generated match arms.
    pub binding: Ident,
    pub wire_name: String,
    pub ignore: bool,
}

impl<'a> ClassifyEnum<'a> {
    pub fn new(ast: &'a DeriveInput, data: &'a DataEnum) -> syn::Result<Self> {
        let meta = TypeMeta::new(ast)?;

        if data.variants.is_empty() {
            return Err(syn::Error::new_spanned(
                &ast.ident,
                "enums without variants cannot be classified",
            ));
        }

        let variants = data
            .variants
            .iter()
            .map(|variant| {
                let attrs = TypeAttributes::parse_attrs(&variant.attrs)?;
                let tag = match attrs.rename {
                    Some(name) => name.value(),
                    None => variant.ident.unraw().to_string(),
                };

                let fields = match &variant.fields {
                    Fields::Unit => VariantFields::Unit,
                    Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                        let field = &unnamed.unnamed[0];
                        let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
                        if let Some(span) = attrs.first_modifier().or(attrs.rename.as_ref().map(|r| r.span())) {
                            return Err(syn::Error::new(
                                span,
                                "the field of a newtype variant takes no attributes",
                            ));
                        }
                        VariantFields::Newtype
                    }
                    Fields::Unnamed(unnamed) => VariantFields::Unnamed(
                        unnamed
                            .unnamed
                            .iter()
                            .enumerate()
                            .map(|(index, field)| {
                                let wire_name = format!("item{}", index + 1);
                                variant_field(
                                    syn::Member::Unnamed(index.into()),
                                    Ident::new(&format!("__field{index}"), Span::call_site()),
                                    field,
                                    wire_name,
                                )
                            })
                            .collect::<syn::Result<_>>()?,
                    ),
                    Fields::Named(named) => VariantFields::Named(
                        named
                            .named
                            .iter()
                            .map(|field| {
                                let ident = field
                                    .ident
                                    .as_ref()
                                    .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
                                let name = ident.unraw().to_string();
                                let wire_name = match name.strip_prefix('_') {
                                    Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
                                    _ => name,
                                };
                                variant_field(
                                    syn::Member::Named(ident.clone()),
                                    Ident::new(&format!("__field_{}", ident.unraw()), Span::call_site()),
                                    field,
                                    wire_name,
                                )
                            })
                            .collect::<syn::Result<_>>()?,
                    ),
                };

                Ok(EnumVariant {
                    ident: &variant.ident,
                    tag,
                    fields,
                })
            })
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self { meta, variants })
    }

    /// Returns `true` if no variant carries data.
    pub fn is_unit_only(&self) -> bool {
        self.variants
            .iter()
            .all(|v| matches!(v.fields, VariantFields::Unit))
    }
}

/// Variant fields support `ignore` and `rename`.
fn variant_field(
    member: syn::Member,
    binding: Ident,
    field: &syn::Field,
    wire_name: String,
) -> syn::Result<VariantField> {
    let attrs = FieldAttributes::parse_attrs(&field.attrs)?;
    if let Some(span) = attrs.parent.or(attrs.follow_id).or(attrs.captures_id) {
        return Err(syn::Error::new(
            span,
            "variant fields only support `ignore` and `rename`",
        ));
    }

    Ok(VariantField {
        member,
        binding,
        wire_name: attrs.rename.map_or(wire_name, |name| name.value()),
        ignore: attrs.ignore.is_some(),
    })
}
