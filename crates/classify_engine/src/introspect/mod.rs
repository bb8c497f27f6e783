//! Field tables of nested object types.
//!
//! Every derived struct describes itself once through
//! [`ClassifyObject::describe`]. The result is validated, leaked and cached
//! per type, so later lookups are a read lock and a hash probe.

// -----------------------------------------------------------------------------
// Modules

mod descriptor;
mod field;

// -----------------------------------------------------------------------------
// Exports

pub use descriptor::TypeDescriptor;
pub use field::{FieldDescriptor, FieldKind, FieldModifiers};

use alloc::boxed::Box;
use core::any::TypeId;
use std::sync::{PoisonError, RwLock};

use classify_utils::TypeIdMap;

use crate::{ClassifyError, ClassifyObject};

// -----------------------------------------------------------------------------
// Cache

static DESCRIPTORS: RwLock<TypeIdMap<&'static TypeDescriptor>> = RwLock::new(TypeIdMap::new());

/// Returns the cached descriptor of `T`, building it on first use.
///
/// A descriptor that fails validation is not cached; every call reports the
/// same configuration error.
pub fn descriptor_of<T: ClassifyObject>() -> Result<&'static TypeDescriptor, ClassifyError> {
    if let Some(descriptor) = DESCRIPTORS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get_type::<T>()
    {
        return Ok(*descriptor);
    }

    let descriptor = T::describe()?;

    let mut cache = DESCRIPTORS.write().unwrap_or_else(PoisonError::into_inner);
    Ok(*cache.get_or_insert(TypeId::of::<T>(), || Box::leak(Box::new(descriptor))))
}

// -----------------------------------------------------------------------------
// Tests
