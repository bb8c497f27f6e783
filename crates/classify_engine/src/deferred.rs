use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, OnceCell};
use core::fmt;
use std::path::{Path, PathBuf};

use classify_format::ClassifyFormat;

use crate::{Classify, ClassifyError, FieldKind, Reader, Writer};

// -----------------------------------------------------------------------------
// Deferred

type Generator<T> = Box<dyn FnOnce() -> Result<T, ClassifyError>>;

/// A lazily evaluated value bound to an external id.
///
/// Reading a `#[classify(follow_id)]` field produces a `Deferred` whose
/// generator loads `{base_dir}/{type name}/{id}.{ext}` on first access.
/// Application code creates evaluated handles with [`Deferred::new`].
///
/// The generator runs at most once. After a successful run the value is
/// cached and, if its type has a `#[classify(captures_id)]` field, that field
/// holds the id.
///
/// Not `Sync`: concurrent first access needs outside synchronization.
///
/// # Examples
///
/// ```
/// use classify_engine::Deferred;
///
/// let lazy = Deferred::from_fn("answer", || Ok(42_u32));
/// assert!(!lazy.is_evaluated());
/// assert_eq!(*lazy.value().unwrap(), 42);
/// assert!(lazy.is_evaluated());
/// ```
pub struct Deferred<T> {
    id: String,
    value: OnceCell<T>,
    generator: Cell<Option<Generator<T>>>,
}

impl<T> Deferred<T> {
    /// Creates a handle that runs `generator` on first access.
    pub fn from_fn(
        id: impl Into<String>,
        generator: impl FnOnce() -> Result<T, ClassifyError> + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            value: OnceCell::new(),
            generator: Cell::new(Some(Box::new(generator))),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` once the value is cached.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }

    /// Returns the cached value without evaluating.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }
}

impl<T: Classify> Deferred<T> {
    /// Creates an evaluated handle.
    pub fn new(id: impl Into<String>, mut value: T) -> Self {
        let id = id.into();
        value.capture_id(&id);
        Self {
            id,
            value: OnceCell::from(value),
            generator: Cell::new(None),
        }
    }

    /// Returns the value, running the generator on first access.
    ///
    /// A failing generator is consumed: the error is returned once and later
    /// calls report that the value is unavailable.
    pub fn value(&self) -> Result<&T, ClassifyError> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let generator = self.generator.take().ok_or_else(|| self.unavailable())?;
        let mut value = generator()?;
        value.capture_id(&self.id);
        Ok(self.value.get_or_init(|| value))
    }

    pub fn value_mut(&mut self) -> Result<&mut T, ClassifyError> {
        self.value()?;
        let unavailable = self.unavailable();
        self.value.get_mut().ok_or(unavailable)
    }

    pub fn into_value(self) -> Result<T, ClassifyError> {
        self.value()?;
        let unavailable = self.unavailable();
        self.value.into_inner().ok_or(unavailable)
    }

    fn unavailable(&self) -> ClassifyError {
        ClassifyError::configuration(
            format!("Deferred<{}>", T::type_name()),
            format!("the value of `{}` is unavailable, it has no generator or loading it failed", self.id),
        )
    }
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self {
            id: String::new(),
            value: OnceCell::new(),
            generator: Cell::new(None),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("id", &self.id)
            .field("value", &self.value.get())
            .finish_non_exhaustive()
    }
}

impl<T: PartialEq> PartialEq for Deferred<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.value.get() == other.value.get()
    }
}

// -----------------------------------------------------------------------------
// Classify

impl<T: Classify> Classify for Deferred<T> {
    const KIND: FieldKind = FieldKind::NestedObject;
    const IS_DEFERRED: bool = true;

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("Deferred<{}>", T::type_name()))
    }

    /// Without `follow_id` the handle is stored inline as its id and, when
    /// evaluated, its value.
    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        let mut fields = Vec::from([("id", writer.write_named("id", &self.id)?)]);
        if let Some(value) = self.get() {
            fields.push(("value", writer.write_named("value", value)?));
        }
        Ok(writer.format().make_object(fields))
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        let id: String = reader.read_member(element, "id")?.unwrap_or_default();
        match reader.read_member::<T>(element, "value")? {
            Some(value) => Ok(Self::new(id, value)),
            None if is_valid_id(&id) => Ok(reader.lazy_satellite(id)),
            None => Ok(Self::default()),
        }
    }

    fn write_follow_id<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        writer.write_deferred(self)
    }

    fn read_follow_id<F: ClassifyFormat>(
        element: &F::Element,
        reader: &mut Reader<'_, F>,
    ) -> Result<Self, ClassifyError> {
        reader.read_deferred(element)
    }
}

// -----------------------------------------------------------------------------
// Satellite files

/// Returns `true` if `id` names a single file inside its type directory.
pub(crate) fn is_valid_id(id: &str) -> bool {
    !id.is_empty() && id != "." && !id.contains(['/', '\\']) && !id.contains("..")
}

/// `{base_dir}/{type name}/{id}.{extension}`
pub(crate) fn satellite_path(base_dir: &Path, type_name: &str, id: &str, extension: &str) -> PathBuf {
    let directory: String = type_name
        .chars()
        .map(|c| match c {
            '<' | '>' | ',' | ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '|' | '(' | ')' | '[' | ']' | ';' => '_',
            c => c,
        })
        .collect();
    base_dir.join(directory).join(format!("{id}.{extension}"))
}

// -----------------------------------------------------------------------------
// Tests
