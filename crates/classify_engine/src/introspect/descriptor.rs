use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;

use super::{FieldDescriptor, FieldModifiers};
use crate::ClassifyError;
use classify_utils::hash::HashSet;

// -----------------------------------------------------------------------------
// TypeDescriptor

/// The ordered field table of a nested object type.
///
/// Construction validates the table; a descriptor that exists is known to be
/// well formed.
///
/// # Examples
///
/// ```
/// use classify_engine::{FieldDescriptor, FieldModifiers, TypeDescriptor};
///
/// let descriptor = TypeDescriptor::new("Point", vec![
///     FieldDescriptor::new::<f64>("_x"),
///     FieldDescriptor::new::<f64>("y"),
///     FieldDescriptor::new::<String>("cache").with_modifiers(FieldModifiers::IGNORE),
/// ])
/// .unwrap();
///
/// assert_eq!(descriptor.field("x").unwrap().index(), 0);
/// assert_eq!(descriptor.serialized_fields().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    type_name: Cow<'static, str>,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Builds and validates a descriptor.
    ///
    /// Fails with [`ClassifyError::Configuration`] when
    /// - a `follow_id` field is not a `Deferred`,
    /// - a `captures_id` field is not a `String`, or more than one exists,
    /// - a field is both `parent` and `follow_id`,
    /// - two serialized fields share a wire name.
    pub fn new(
        type_name: impl Into<Cow<'static, str>>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, ClassifyError> {
        let type_name = type_name.into();
        let fields: Vec<_> = fields
            .into_iter()
            .enumerate()
            .map(|(index, field)| field.with_index(index))
            .collect();

        let fail = |message: String| Err(ClassifyError::configuration(type_name.clone(), message));

        let mut wire_names = HashSet::<&str>::default();
        let mut captures = None::<&str>;

        for field in &fields {
            let modifiers = field.modifiers();

            if modifiers.contains(FieldModifiers::PARENT | FieldModifiers::FOLLOW_ID) {
                return fail(format!(
                    "field `{}` cannot be both a parent and a follow-id",
                    field.name()
                ));
            }

            if modifiers.contains(FieldModifiers::FOLLOW_ID) && !field.is_deferred() {
                return fail(format!(
                    "follow-id field `{}` must be a `Deferred<T>`, found `{}`",
                    field.name(),
                    field.type_name()
                ));
            }

            if modifiers.contains(FieldModifiers::CAPTURES_ID) {
                if field.type_id() != TypeId::of::<String>() {
                    return fail(format!(
                        "captures-id field `{}` must be a `String`, found `{}`",
                        field.name(),
                        field.type_name()
                    ));
                }
                if let Some(previous) = captures.replace(field.name()) {
                    return fail(format!(
                        "fields `{previous}` and `{}` both capture the id",
                        field.name()
                    ));
                }
            }

            if field.is_serialized() && !wire_names.insert(field.wire_name()) {
                return fail(format!(
                    "more than one field is stored as `{}`",
                    field.wire_name()
                ));
            }
        }

        Ok(Self { type_name, fields })
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// All fields in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Fields that are read and written, in declaration order.
    pub fn serialized_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_serialized())
    }

    /// Looks a field up by wire name.
    pub fn field(&self, wire_name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.wire_name() == wire_name)
    }

    /// The field receiving a deferred object's id, if any.
    pub fn captures_id_field(&self) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.modifiers().contains(FieldModifiers::CAPTURES_ID))
    }
}
