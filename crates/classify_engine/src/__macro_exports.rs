//! Items used by code generated from `#[derive(Classify)]`.
//!
//! Not public API, may change without notice.

#![doc(hidden)]

use alloc::format;

pub use alloc::borrow::Cow;
pub use alloc::rc::Rc;
pub use alloc::string::String;
pub use alloc::vec::Vec;
pub use core::any::Any;
pub use core::default::Default;
pub use core::option::Option;
pub use core::result::Result;

pub use classify_format::ClassifyFormat;

pub use crate::classify::unknown_field;
pub use crate::{
    Classify, ClassifyError, ClassifyObject, ConvertError, DictionaryKey, FieldDescriptor, FieldKind,
    FieldModifiers, ParentSlot, Reader, TypeDescriptor, Writer,
};

/// Stores a deferred object's id in its `#[classify(captures_id)]` field.
///
/// The field type is checked when the descriptor is built, a non-`String`
/// slot is left untouched here.
pub fn store_captured_id<T: 'static>(slot: &mut T, id: &str) {
    let slot: &mut dyn Any = slot;
    if let Some(slot) = slot.downcast_mut::<String>() {
        slot.clear();
        slot.push_str(id);
    }
}

/// `Base<A, B>`
pub fn generic_type_name(base: &str, arguments: &[Cow<'static, str>]) -> Cow<'static, str> {
    Cow::Owned(format!("{base}<{}>", arguments.join(", ")))
}
