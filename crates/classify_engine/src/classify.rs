use alloc::borrow::Cow;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::any::Any;

use classify_format::ClassifyFormat;

use crate::{ClassifyError, ConvertError, FieldDescriptor, FieldKind, Reader, TypeDescriptor, Writer};

// -----------------------------------------------------------------------------
// Classify

/// A type that can be written to and read from any [`ClassifyFormat`].
///
/// Structs and enums get this from `#[derive(Classify)]`; the engine ships
/// implementations for primitives, strings, collections, smart pointers and
/// [`Deferred`](crate::Deferred).
///
/// `write` and `read` receive the whole [`Writer`] or [`Reader`] so that
/// nested values go back through the engine, which tracks depth, field
/// paths and shared instances.
pub trait Classify: Sized + 'static {
    /// The wire classification of this type.
    const KIND: FieldKind;

    /// `true` only for [`Deferred`](crate::Deferred) and wrappers around it.
    const IS_DEFERRED: bool = false;

    /// Name used for root tags, satellite directories and diagnostics.
    fn type_name() -> Cow<'static, str>;

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError>;

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError>;

    /// The value a null node stands for, or `None` if the type is not nullable.
    #[inline]
    fn null_value() -> Option<Self> {
        None
    }

    /// Writes only the external id of a follow-id field.
    fn write_follow_id<F: ClassifyFormat>(
        &self,
        _writer: &mut Writer<'_, F>,
    ) -> Result<F::Element, ClassifyError> {
        Err(not_deferred::<Self>())
    }

    /// Reads a follow-id node into a lazily loaded value.
    fn read_follow_id<F: ClassifyFormat>(
        _element: &F::Element,
        _reader: &mut Reader<'_, F>,
    ) -> Result<Self, ClassifyError> {
        Err(not_deferred::<Self>())
    }

    /// Reads a value that will be owned by an `Rc`, registering it under
    /// `referable` so later references resolve to the same allocation.
    fn read_rc<F: ClassifyFormat>(
        element: &F::Element,
        reader: &mut Reader<'_, F>,
        referable: Option<&str>,
    ) -> Result<Rc<Self>, ClassifyError> {
        let rc = Rc::new(Self::read(element, reader)?);
        if let Some(id) = referable {
            reader.register_referable(id, rc.clone());
        }
        Ok(rc)
    }

    /// Receives the id of the [`Deferred`](crate::Deferred) that produced this value.
    #[inline]
    fn capture_id(&mut self, _id: &str) {}
}

fn not_deferred<T: Classify>() -> ClassifyError {
    ClassifyError::configuration(
        T::type_name(),
        "only `Deferred<T>` fields can be stored by follow-id",
    )
}

// -----------------------------------------------------------------------------
// ClassifyObject

/// A nested object: a type written as named fields.
///
/// The derive macro produces the field table and index-based accessors;
/// [`Writer::write_object`] and [`Reader::read_object`] walk the table.
/// Reading starts from `Default::default()`, so fields absent from the
/// input keep their default value.
pub trait ClassifyObject: Classify + Default {
    /// Builds the field table. Called once per type, see
    /// [`descriptor_of`](crate::descriptor_of).
    fn describe() -> Result<TypeDescriptor, ClassifyError>;

    fn write_field<F: ClassifyFormat>(
        &self,
        field: &FieldDescriptor,
        writer: &mut Writer<'_, F>,
    ) -> Result<F::Element, ClassifyError>;

    fn read_field<F: ClassifyFormat>(
        &mut self,
        field: &FieldDescriptor,
        element: &F::Element,
        reader: &mut Reader<'_, F>,
    ) -> Result<(), ClassifyError>;

    /// Fills parent back-reference fields.
    #[inline]
    fn attach_parent(&mut self, _parent: Option<&Rc<dyn Any>>) {}
}

/// Error for a field index the derived accessors do not know.
pub fn unknown_field<T: Classify>(field: &FieldDescriptor) -> ClassifyError {
    ClassifyError::configuration(
        T::type_name(),
        format!("field `{}` has no accessor", field.name()),
    )
}

// -----------------------------------------------------------------------------
// DictionaryKey

/// A type usable as a dictionary key.
///
/// Keys are stored as text in an attribute. Strings, integers, `char` and
/// unit-only enums deriving `Classify` qualify.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a dictionary key",
    note = "dictionary keys must be strings, integers, `char` or unit-only enums deriving `Classify`"
)]
pub trait DictionaryKey: Sized {
    fn to_key(&self) -> String;

    fn from_key(key: &str) -> Result<Self, ConvertError>;
}

macro_rules! impl_dictionary_key {
    ($($ty:ident),* $(,)?) => {
        $(
            impl DictionaryKey for $ty {
                #[inline]
                fn to_key(&self) -> String {
                    crate::ExactConvert::to_invariant(self)
                }

                #[inline]
                fn from_key(key: &str) -> Result<Self, ConvertError> {
                    crate::ExactConvert::from_invariant(key)
                }
            }
        )*
    };
}

impl_dictionary_key!(String, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

// -----------------------------------------------------------------------------
// ParentSlot

/// A field receiving the enclosing shared object on read.
///
/// Implemented for `Weak<RefCell<P>>` and `Option<Weak<RefCell<P>>>`. The
/// slot stays empty when there is no enclosing `Rc<RefCell<_>>` or when it
/// holds a type other than `P`.
pub trait ParentSlot {
    fn attach(&mut self, parent: Option<&Rc<dyn Any>>);
}

mod parent {
    use alloc::rc::{Rc, Weak};
    use core::any::Any;
    use core::cell::RefCell;

    use super::ParentSlot;

    fn downgrade<P: 'static>(parent: Option<&Rc<dyn Any>>) -> Option<Weak<RefCell<P>>> {
        let parent = Rc::clone(parent?).downcast::<RefCell<P>>().ok()?;
        Some(Rc::downgrade(&parent))
    }

    impl<P: 'static> ParentSlot for Weak<RefCell<P>> {
        fn attach(&mut self, parent: Option<&Rc<dyn Any>>) {
            *self = downgrade(parent).unwrap_or_default();
        }
    }

    impl<P: 'static> ParentSlot for Option<Weak<RefCell<P>>> {
        fn attach(&mut self, parent: Option<&Rc<dyn Any>>) {
            *self = downgrade(parent);
        }
    }
}
