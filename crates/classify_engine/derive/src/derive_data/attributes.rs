//! Parsing of `#[classify(...)]` attributes.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr};

use crate::CLASSIFY_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// TypeAttributes

/// Attributes on the type itself or on an enum variant.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    /// `#[classify(rename = "...")]`
    pub rename: Option<LitStr>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let field_like = FieldAttributes::parse_attrs(attrs)?;
        if let Some(span) = field_like.first_modifier() {
            return Err(syn::Error::new(
                span,
                "only `rename` is supported on types and variants",
            ));
        }
        Ok(Self {
            rename: field_like.rename,
        })
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Attributes on a field. Each modifier records the span it was set at.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub ignore: Option<Span>,
    pub parent: Option<Span>,
    pub follow_id: Option<Span>,
    pub captures_id: Option<Span>,
    pub rename: Option<LitStr>,
}

fn set_flag(flag: &mut Option<Span>, span: Span) -> syn::Result<()> {
    if flag.replace(span).is_some() {
        return Err(syn::Error::new(span, "duplicate attribute"));
    }
    Ok(())
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut result = Self::default();

        for attr in attrs {
            if !attr.path().is_ident(CLASSIFY_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                let span = meta.path.span();
                if meta.path.is_ident("ignore") {
                    set_flag(&mut result.ignore, span)
                } else if meta.path.is_ident("parent") {
                    set_flag(&mut result.parent, span)
                } else if meta.path.is_ident("follow_id") {
                    set_flag(&mut result.follow_id, span)
                } else if meta.path.is_ident("captures_id") {
                    set_flag(&mut result.captures_id, span)
                } else if meta.path.is_ident("rename") {
                    let name: LitStr = meta.value()?.parse()?;
                    if name.value().is_empty() {
                        return Err(syn::Error::new(name.span(), "name cannot be empty"));
                    }
                    if result.rename.replace(name).is_some() {
                        return Err(syn::Error::new(span, "duplicate attribute"));
                    }
                    Ok(())
                } else {
                    Err(meta.error(
                        "unknown attribute, expected one of `ignore`, `parent`, `follow_id`, `captures_id`, `rename`",
                    ))
                }
            })?;
        }

        result.check_conflicts()?;
        Ok(result)
    }

    fn check_conflicts(&self) -> syn::Result<()> {
        let set: Vec<(&str, Span)> = [
            ("ignore", self.ignore),
            ("parent", self.parent),
            ("follow_id", self.follow_id),
            ("captures_id", self.captures_id),
        ]
        .into_iter()
        .filter_map(|(name, span)| span.map(|span| (name, span)))
        .collect();

        if let [(first, _), (second, span), ..] = set.as_slice() {
            return Err(syn::Error::new(
                *span,
                format!("`{first}` and `{second}` cannot be combined"),
            ));
        }
        if let (Some(span), Some(_)) = (self.ignore.or(self.parent).or(self.captures_id), &self.rename) {
            return Err(syn::Error::new(span, "fields that are not stored cannot be renamed"));
        }
        Ok(())
    }

    /// The first modifier set, if any.
    pub fn first_modifier(&self) -> Option<Span> {
        self.ignore
            .or(self.parent)
            .or(self.follow_id)
            .or(self.captures_id)
    }

    /// Returns `true` if the field is neither read nor written.
    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.ignore.is_some() || self.parent.is_some() || self.captures_id.is_some()
    }
}
