use alloc::borrow::{Cow, ToOwned};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use std::fs::{self, File};
use std::io::{BufWriter, Write as _};

use classify_format::{ClassifyFormat, MarkerRewrite, SimpleValue};
use classify_utils::hash::{HashMap, HashSet};

use crate::deferred::{is_valid_id, satellite_path};
use crate::ids::IdGenerator;
use crate::path::{FieldPath, PathSegment};
use crate::{Classify, ClassifyError, ClassifyObject, ClassifyOptions, Deferred, FieldDescriptor, descriptor_of};

// -----------------------------------------------------------------------------
// Writer

type Identity = (usize, TypeId);

/// Member holding the payload of a newtype enum variant.
pub(crate) const VARIANT_VALUE: &str = "value";

struct SharedEntry {
    provisional: String,
    real: Option<String>,
}

/// Builds an element tree from a value graph.
///
/// One writer serves one top-level call: it owns the table of shared
/// instances seen so far, so ids are unique within the produced document.
/// Nested values go through [`write`](Self::write) and friends, which keep
/// track of nesting depth and the current field path.
pub struct Writer<'a, F: ClassifyFormat> {
    format: &'a F,
    options: &'a ClassifyOptions,
    shared: HashMap<Identity, SharedEntry>,
    in_progress: HashSet<Identity>,
    ids: IdGenerator,
    path: FieldPath,
    depth: usize,
}

impl<'a, F: ClassifyFormat> Writer<'a, F> {
    pub fn new(format: &'a F, options: &'a ClassifyOptions) -> Self {
        Self {
            format,
            options,
            shared: HashMap::default(),
            in_progress: HashSet::default(),
            ids: IdGenerator::default(),
            path: FieldPath::default(),
            depth: 0,
        }
    }

    #[inline]
    pub fn format(&self) -> &'a F {
        self.format
    }

    #[inline]
    pub fn options(&self) -> &'a ClassifyOptions {
        self.options
    }

    /// Writes a whole document: the value, then the reference id fix-up,
    /// then the root name.
    pub fn write_root<T: Classify>(&mut self, value: &T, tag: &str) -> Result<F::Element, ClassifyError> {
        let element = self.write(value)?;
        let element = self.finish(element);
        Ok(self.format.make_root(tag, element))
    }

    /// Writes a nested value.
    pub fn write<T: Classify>(&mut self, value: &T) -> Result<F::Element, ClassifyError> {
        self.enter()?;
        let result = value.write(self);
        self.depth -= 1;
        result
    }

    /// Writes a field of a nested object, honoring its modifiers.
    pub fn write_field<T: Classify>(
        &mut self,
        field: &FieldDescriptor,
        value: &T,
    ) -> Result<F::Element, ClassifyError> {
        if field.is_follow_id() {
            self.enter()?;
            let result = value.write_follow_id(self);
            self.depth -= 1;
            result
        } else {
            self.write(value)
        }
    }

    /// Writes a named member that is not described by a field table, such
    /// as the fields of an enum variant.
    pub fn write_named<T: Classify>(&mut self, name: &'static str, value: &T) -> Result<F::Element, ClassifyError> {
        self.path.push(PathSegment::Field(Cow::Borrowed(name)));
        let result = self.write(value);
        self.path.pop();
        result
    }

    pub fn write_item<T: Classify>(&mut self, index: usize, value: &T) -> Result<F::Element, ClassifyError> {
        self.path.push(PathSegment::Index(index));
        let result = self.write(value);
        self.path.pop();
        result
    }

    pub fn write_entry<T: Classify>(&mut self, key: &str, value: &T) -> Result<F::Element, ClassifyError> {
        self.path.push(PathSegment::Key(key.to_owned()));
        let result = self.write(value);
        self.path.pop();
        result
    }

    #[inline]
    pub fn write_text(&self, text: impl Into<String>) -> F::Element {
        self.format.make_simple_value(SimpleValue::Text(text.into()))
    }

    #[inline]
    pub fn write_bytes(&self, bytes: &[u8]) -> F::Element {
        self.format.make_simple_value(SimpleValue::Bytes(bytes.to_vec()))
    }

    #[inline]
    pub fn write_null(&self) -> F::Element {
        self.format.make_null()
    }

    /// Writes the payload of a newtype enum variant into a `value` member,
    /// so the payload keeps its own tag and null marker.
    pub fn write_variant_value<T: Classify>(&mut self, value: &T) -> Result<F::Element, ClassifyError> {
        let element = self.write_named(VARIANT_VALUE, value)?;
        Ok(self.format.make_object(Vec::from([(VARIANT_VALUE, element)])))
    }

    /// Attaches a variant tag to an element.
    #[inline]
    pub fn tag(&self, element: F::Element, tag: &str) -> F::Element {
        self.format.with_type(element, tag)
    }

    // -------------------------------------------------------------------------
    // Containers

    pub fn write_list<'v, T: Classify>(
        &mut self,
        items: impl IntoIterator<Item = &'v T>,
    ) -> Result<F::Element, ClassifyError> {
        let mut elements = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            elements.push(self.write_item(index, item)?);
        }
        Ok(self.format.make_list(false, elements))
    }

    pub fn write_dictionary<'v, V: Classify>(
        &mut self,
        entries: impl IntoIterator<Item = (String, &'v V)>,
    ) -> Result<F::Element, ClassifyError> {
        let mut elements = Vec::new();
        for (key, value) in entries {
            let element = self.write_entry(&key, value)?;
            elements.push((key, element));
        }
        Ok(self.format.make_dictionary(elements))
    }

    /// Writes every serialized field of a nested object.
    pub fn write_object<T: ClassifyObject>(&mut self, value: &T) -> Result<F::Element, ClassifyError> {
        let descriptor = descriptor_of::<T>()?;

        let mut fields = Vec::new();
        for field in descriptor.serialized_fields() {
            self.path.push(PathSegment::Field(Cow::Borrowed(field.wire_name())));
            let element = value.write_field(field, self);
            self.path.pop();
            fields.push((field.wire_name(), element?));
        }
        Ok(self.format.make_object(fields))
    }

    /// Embeds a raw element of this writer's format.
    pub fn write_self_value<R: Any>(&self, value: &R) -> Result<F::Element, ClassifyError> {
        let any: &dyn Any = value;
        let inner = any.downcast_ref::<F::Element>().ok_or_else(|| {
            ClassifyError::configuration(
                core::any::type_name::<R>(),
                format!(
                    "raw values can only be embedded in their own format, not `{}`",
                    core::any::type_name::<F>()
                ),
            )
        })?;
        Ok(self.format.make_self_value(inner.clone()))
    }

    // -------------------------------------------------------------------------
    // Shared instances

    /// Writes the content of a shared allocation.
    ///
    /// `value` must point into the allocation (for `Rc<T>`, `&**rc`); its
    /// address is the instance identity. The first encounter writes the
    /// content, later ones write a reference marker.
    pub fn write_shared<T: Classify>(&mut self, value: &T) -> Result<F::Element, ClassifyError> {
        let identity: Identity = (core::ptr::from_ref(value).addr(), TypeId::of::<T>());

        if !self.references_enabled() {
            if !self.in_progress.insert(identity) {
                return Err(ClassifyError::UnsupportedCyclicReference {
                    type_name: T::type_name(),
                    path: self.path.render(),
                });
            }
            let result = value.write(self);
            self.in_progress.remove(&identity);
            return result;
        }

        if let Some(entry) = self.shared.get_mut(&identity) {
            let id = match &entry.real {
                Some(id) => id.clone(),
                None => {
                    let id = self.ids.next_id();
                    log::trace!("`{}` at `{}` is shared, assigned id `{id}`", T::type_name(), self.path);
                    entry.real = Some(id.clone());
                    id
                }
            };
            return Ok(self.format.make_reference(&id));
        }

        let provisional = format!("#{}", self.shared.len());
        self.shared.insert(
            identity,
            SharedEntry {
                provisional: provisional.clone(),
                real: None,
            },
        );

        let element = value.write(self)?;
        Ok(self.format.mark_referable(element, &provisional))
    }

    #[inline]
    fn references_enabled(&self) -> bool {
        self.options.references && self.format.supports_references()
    }

    /// Replaces provisional referable markers by real ids, dropping the
    /// markers of instances that were never referenced.
    fn finish(&self, element: F::Element) -> F::Element {
        if self.shared.is_empty() {
            return element;
        }

        let lookup: HashMap<&str, Option<&str>> = self
            .shared
            .values()
            .map(|entry| (entry.provisional.as_str(), entry.real.as_deref()))
            .collect();

        self.format
            .rewrite_referables(element, &mut |id| match lookup.get(id) {
                Some(Some(real)) => MarkerRewrite::Replace((*real).to_owned()),
                Some(None) => MarkerRewrite::Remove,
                None => MarkerRewrite::Keep,
            })
    }

    // -------------------------------------------------------------------------
    // Satellites

    /// Writes a follow-id marker and, if the value is loaded, its satellite
    /// file.
    pub fn write_deferred<T: Classify>(&mut self, deferred: &Deferred<T>) -> Result<F::Element, ClassifyError> {
        let id = deferred.id();
        if !is_valid_id(id) {
            return Err(ClassifyError::Data {
                path: self.path.render(),
                message: format!("`{id}` cannot be used as a satellite id"),
            });
        }

        if let Some(value) = deferred.get() {
            match &self.options.base_dir {
                Some(base_dir) => {
                    let path = satellite_path(base_dir, &T::type_name(), id, self.format.extension());
                    let element = Writer::new(self.format, self.options).write_root(value, &T::type_name())?;

                    log::debug!("writing satellite `{}`", path.display());
                    if let Some(dir) = path.parent() {
                        fs::create_dir_all(dir).map_err(|err| ClassifyError::io(dir, err))?;
                    }
                    let file = File::create(&path).map_err(|err| ClassifyError::io(&path, err))?;
                    let mut out = BufWriter::new(file);
                    self.format.write_root(&element, &mut out)?;
                    out.flush().map_err(|err| ClassifyError::io(&path, err))?;
                }
                None => log::warn!(
                    "no base directory set, satellite `{id}` of `{}` at `{}` is not written",
                    T::type_name(),
                    self.path
                ),
            }
        }

        Ok(self.format.make_follow_id(id))
    }

    // -------------------------------------------------------------------------

    fn enter(&mut self) -> Result<(), ClassifyError> {
        if let Some(limit) = self.options.max_depth
            && self.depth >= limit
        {
            return Err(ClassifyError::DepthExceeded {
                limit,
                path: self.path.render(),
            });
        }
        self.depth += 1;
        Ok(())
    }
}
