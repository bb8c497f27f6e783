use syn::ext::IdentExt as _;
use syn::{DeriveInput, Fields, Ident, Type};

use super::{FieldAttributes, TypeMeta};

// -----------------------------------------------------------------------------
// ClassifyStruct

/// A struct with named fields, or a unit struct.
pub(crate) struct ClassifyStruct<'a> {
    pub meta: TypeMeta<'a>,
    pub fields: Vec<StructField<'a>>,
}

pub(crate) struct StructField<'a> {
    /// Declaration index, matched on by the generated accessors.
    pub index: usize,
    pub member: &'a Ident,
    pub ty: &'a Type,
    /// Rust field name without the raw prefix.
    pub name: String,
    pub attrs: FieldAttributes,
}

impl<'a> ClassifyStruct<'a> {
    pub fn new(ast: &'a DeriveInput, fields: &'a Fields) -> syn::Result<Self> {
        let meta = TypeMeta::new(ast)?;

        let fields = match fields {
            Fields::Named(named) => named
                .named
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    let member = field
                        .ident
                        .as_ref()
                        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
                    Ok(StructField {
                        index,
                        member,
                        ty: &field.ty,
                        name: member.unraw().to_string(),
                        attrs: FieldAttributes::parse_attrs(&field.attrs)?,
                    })
                })
                .collect::<syn::Result<Vec<_>>>()?,
            Fields::Unit => Vec::new(),
            Fields::Unnamed(unnamed) => {
                return Err(syn::Error::new_spanned(
                    unnamed,
                    "tuple structs cannot be classified, use named fields",
                ));
            }
        };

        Ok(Self { meta, fields })
    }

    /// Fields that are read and written.
    pub fn serialized_fields(&self) -> impl Iterator<Item = &StructField<'a>> {
        self.fields.iter().filter(|f| !f.attrs.is_skipped())
    }
}
