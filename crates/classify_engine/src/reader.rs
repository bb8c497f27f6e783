use alloc::borrow::{Cow, ToOwned};
use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use std::fs::File;
use std::io::BufReader;

use classify_format::{ClassifyFormat, SimpleValue};
use classify_utils::hash::{HashMap, HashSet};

use crate::deferred::{is_valid_id, satellite_path};
use crate::path::{FieldPath, PathSegment};
use crate::writer::VARIANT_VALUE;
use crate::{
    Classify, ClassifyError, ClassifyObject, ClassifyOptions, Deferred, DictionaryKey, ExactConvert,
    FieldDescriptor, descriptor_of,
};

// -----------------------------------------------------------------------------
// Reader

/// Reconstructs a value graph from an element tree.
///
/// Like [`Writer`](crate::Writer), one reader serves one top-level call. It
/// owns the table of referable instances, the stack of enclosing shared
/// objects used for parent back-references, and the current field path
/// reported in data errors.
///
/// In [lenient](crate::Strictness::Lenient) mode a data error inside one
/// field of a nested object is logged and the field keeps its default.
pub struct Reader<'a, F: ClassifyFormat> {
    format: &'a F,
    options: &'a ClassifyOptions,
    referables: HashMap<String, Box<dyn Any>>,
    // Referable ids whose content is being read.
    pending: HashSet<String>,
    // Document searched for referables that appear after their first reference.
    root: Option<&'a F::Element>,
    // Content depth of each enclosing shared object.
    parents: Vec<(usize, Rc<dyn Any>)>,
    path: FieldPath,
    depth: usize,
}

impl<'a, F: ClassifyFormat> Reader<'a, F> {
    pub fn new(format: &'a F, options: &'a ClassifyOptions) -> Self {
        Self {
            format,
            options,
            referables: HashMap::default(),
            pending: HashSet::default(),
            root: None,
            parents: Vec::new(),
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

    /// Reads a whole document.
    ///
    /// References may point at referables that come later in the document;
    /// those are read on demand.
    pub fn read_root<T: Classify>(&mut self, root: &'a F::Element) -> Result<T, ClassifyError> {
        self.root = Some(root);
        self.read(root)
    }

    /// Reads a nested value. A null element yields `T::null_value()`.
    pub fn read<T: Classify>(&mut self, element: &F::Element) -> Result<T, ClassifyError> {
        self.read_with(element, T::read)
    }

    /// Reads a field of a nested object, honoring its modifiers.
    pub fn read_field<T: Classify>(
        &mut self,
        field: &FieldDescriptor,
        element: &F::Element,
    ) -> Result<T, ClassifyError> {
        if field.is_follow_id() {
            self.read_with(element, T::read_follow_id)
        } else {
            self.read(element)
        }
    }

    fn read_with<T: Classify>(
        &mut self,
        element: &F::Element,
        read: impl FnOnce(&F::Element, &mut Self) -> Result<T, ClassifyError>,
    ) -> Result<T, ClassifyError> {
        if self.format.is_null(element) {
            return T::null_value()
                .ok_or_else(|| self.data_error(format!("`{}` cannot be null", T::type_name())));
        }

        if let Some(limit) = self.options.max_depth
            && self.depth >= limit
        {
            return Err(ClassifyError::DepthExceeded {
                limit,
                path: self.path.render(),
            });
        }

        self.depth += 1;
        let result = read(element, self);
        self.depth -= 1;
        result
    }

    // -------------------------------------------------------------------------
    // Leaf values

    pub fn read_text(&self, element: &F::Element) -> Result<String, ClassifyError> {
        match self.format.get_simple_value(element)? {
            SimpleValue::Text(text) => Ok(text),
            SimpleValue::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|_| self.data_error("expected text, found binary data"))
            }
        }
    }

    pub fn read_bytes(&self, element: &F::Element) -> Result<Vec<u8>, ClassifyError> {
        match self.format.get_simple_value(element)? {
            SimpleValue::Text(text) => Ok(text.into_bytes()),
            SimpleValue::Bytes(bytes) => Ok(bytes),
        }
    }

    /// Reads a leaf value through its exact text conversion.
    pub fn read_converted<T: ExactConvert>(&self, element: &F::Element) -> Result<T, ClassifyError> {
        let text = self.read_text(element)?;
        T::from_invariant(&text).map_err(|err| self.data_error(err.to_string()))
    }

    pub fn read_key<K: DictionaryKey>(&self, key: &str) -> Result<K, ClassifyError> {
        K::from_key(key).map_err(|err| self.data_error(err.to_string()))
    }

    /// Returns the raw sub-tree of a self-value element.
    pub fn read_self_value<R: Any + Clone>(&self, element: &F::Element) -> Result<R, ClassifyError> {
        if TypeId::of::<R>() != TypeId::of::<F::Element>() {
            return Err(ClassifyError::configuration(
                core::any::type_name::<R>(),
                format!(
                    "raw values can only be read from their own format, not `{}`",
                    core::any::type_name::<F>()
                ),
            ));
        }

        let inner = self
            .format
            .get_self_value(element)
            .ok_or_else(|| self.data_error("expected an embedded raw value"))?;
        let any: &dyn Any = inner;
        any.downcast_ref::<R>()
            .cloned()
            .ok_or_else(|| self.data_error("embedded raw value has an unexpected type"))
    }

    // -------------------------------------------------------------------------
    // Containers

    pub fn read_item<T: Classify>(&mut self, index: usize, element: &F::Element) -> Result<T, ClassifyError> {
        self.path.push(PathSegment::Index(index));
        let result = self.read(element);
        self.path.pop();
        result
    }

    /// Reads every `item` of a list in document order.
    pub fn read_list<T: Classify>(&mut self, element: &F::Element) -> Result<Vec<T>, ClassifyError> {
        let format = self.format;
        let items = format.get_list(element, None);
        let mut values = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            if let Some(item) = item {
                values.push(self.read_item(index, item)?);
            }
        }
        Ok(values)
    }

    /// Returns the `item1..itemN` slots of a tuple.
    #[inline]
    pub fn tuple_slots<'e>(&self, element: &'e F::Element, size: usize) -> Vec<Option<&'e F::Element>> {
        self.format.get_list(element, Some(size))
    }

    /// Reads one tuple slot, a missing slot is a data error.
    pub fn read_slot<T: Classify>(
        &mut self,
        slots: &[Option<&F::Element>],
        index: usize,
    ) -> Result<T, ClassifyError> {
        match slots.get(index).copied().flatten() {
            Some(item) => self.read_item(index, item),
            None => Err(self.data_error(format!("missing tuple item{}", index + 1))),
        }
    }

    /// Reads the entries of a dictionary in document order.
    ///
    /// A null value is kept only if `V` is nullable.
    pub fn read_entries<K: DictionaryKey, V: Classify>(
        &mut self,
        element: &F::Element,
    ) -> Result<Vec<(K, V)>, ClassifyError> {
        let format = self.format;
        let mut entries = Vec::new();
        for (key, value) in format.get_dictionary(element) {
            self.path.push(PathSegment::Key(key.clone().into_owned()));
            let entry = self.read_entry::<K, V>(&key, value);
            self.path.pop();
            if let Some(entry) = entry? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn read_entry<K: DictionaryKey, V: Classify>(
        &mut self,
        key: &str,
        value: &F::Element,
    ) -> Result<Option<(K, V)>, ClassifyError> {
        let key = self.read_key::<K>(key)?;
        if self.format.is_null(value) && V::null_value().is_none() {
            return Ok(None);
        }
        Ok(Some((key, self.read(value)?)))
    }

    /// Reads both sides of a key-value pair.
    pub fn read_pair<K: Classify, V: Classify>(&mut self, element: &F::Element) -> Result<(K, V), ClassifyError> {
        let (key, value) = self.format.get_key_value_pair(element);
        let key = key.ok_or_else(|| self.data_error("key-value pair has no key"))?;
        let value = value.ok_or_else(|| self.data_error("key-value pair has no value"))?;
        Ok((self.read_named("key", key)?, self.read_named("value", value)?))
    }

    fn read_named<T: Classify>(&mut self, name: &'static str, element: &F::Element) -> Result<T, ClassifyError> {
        self.path.push(PathSegment::Field(Cow::Borrowed(name)));
        let result = self.read(element);
        self.path.pop();
        result
    }

    /// Reads the payload of a newtype enum variant.
    ///
    /// Unlike [`read_member`](Self::read_member) the payload is required and
    /// errors are not recovered here.
    pub fn read_variant_value<T: Classify>(&mut self, element: &F::Element) -> Result<T, ClassifyError> {
        let format = self.format;
        let child = format
            .get_field(element, VARIANT_VALUE)
            .ok_or_else(|| self.data_error(format!("variant has no `{VARIANT_VALUE}` member")))?;
        self.read_named(VARIANT_VALUE, child)
    }

    // -------------------------------------------------------------------------
    // Objects

    /// Reads a nested object field by field.
    ///
    /// The object starts as `T::default()`; fields missing from the element
    /// keep their default, elements without a matching field are ignored.
    pub fn read_object<T: ClassifyObject>(&mut self, element: &F::Element) -> Result<T, ClassifyError> {
        let descriptor = descriptor_of::<T>()?;

        let mut value = T::default();
        value.attach_parent(self.enclosing_parent());

        let format = self.format;
        if format.is_empty(element) {
            return Ok(value);
        }

        for field in descriptor.serialized_fields() {
            let Some(child) = format.get_field(element, field.wire_name()) else {
                continue;
            };
            self.path.push(PathSegment::Field(Cow::Borrowed(field.wire_name())));
            let result = value.read_field(field, child, self);
            let result = self.recover(result);
            self.path.pop();
            result?;
        }
        Ok(value)
    }

    /// Reads a named member that is not described by a field table, such as
    /// the fields of an enum variant. Follows the same recovery policy as
    /// object fields: under the lenient policy bad data yields `None`.
    pub fn read_member<T: Classify>(
        &mut self,
        element: &F::Element,
        name: &'static str,
    ) -> Result<Option<T>, ClassifyError> {
        let format = self.format;
        let Some(child) = format.get_field(element, name) else {
            return Ok(None);
        };
        self.path.push(PathSegment::Field(Cow::Borrowed(name)));
        let result = self.read(child).map(Some);
        let result = self.recover(result).map(Option::flatten);
        self.path.pop();
        result
    }

    fn recover<T>(&self, result: Result<T, ClassifyError>) -> Result<Option<T>, ClassifyError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_data() && !self.options.is_strict() => {
                log::warn!("{err}, keeping the default value");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Returns the variant tag of a polymorphic value.
    pub fn variant_tag<'e, T: Classify>(&self, element: &'e F::Element) -> Result<&'e str, ClassifyError> {
        self.format
            .get_type(element)
            .ok_or_else(|| self.data_error(format!("`{}` value has no variant tag", T::type_name())))
    }

    pub fn unknown_variant<T: Classify>(&self, tag: &str) -> ClassifyError {
        self.data_error(format!("`{tag}` is not a variant of `{}`", T::type_name()))
    }

    /// Builds a data error located at the current path.
    pub fn data_error(&self, message: impl Into<String>) -> ClassifyError {
        ClassifyError::Data {
            path: self.path.render(),
            message: message.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Shared instances

    /// Reads an `Rc<T>`, resolving reference markers.
    pub fn read_shared<T: Classify>(&mut self, element: &F::Element) -> Result<Rc<T>, ClassifyError> {
        self.read_shared_with(element, |element, reader, id| T::read_rc(element, reader, id))
    }

    /// Reads an `Arc<T>`, resolving reference markers.
    pub fn read_arc<T: Classify + Send + Sync>(&mut self, element: &F::Element) -> Result<Arc<T>, ClassifyError> {
        self.read_shared_with(element, |element, reader, id| {
            let arc = Arc::new(T::read(element, reader)?);
            if let Some(id) = id {
                reader.register_referable(id, arc.clone());
            }
            Ok(arc)
        })
    }

    /// `read` builds the handle from content and registers it under the
    /// given id, if any.
    fn read_shared_with<S: Clone + 'static>(
        &mut self,
        element: &F::Element,
        read: impl Fn(&F::Element, &mut Self, Option<&str>) -> Result<S, ClassifyError>,
    ) -> Result<S, ClassifyError> {
        let format = self.format;
        if format.is_reference(element) {
            let id = format.get_reference_id(element).unwrap_or_default();
            if !self.referables.contains_key(id) {
                return self.read_forward(id, read);
            }
            return self.resolve_reference(id);
        }

        match format.is_referable(element).then(|| format.get_reference_id(element)).flatten() {
            Some(id) => self.read_referable(element, id, read),
            None => read(element, self, None),
        }
    }

    fn read_referable<S: Clone + 'static>(
        &mut self,
        element: &F::Element,
        id: &str,
        read: impl Fn(&F::Element, &mut Self, Option<&str>) -> Result<S, ClassifyError>,
    ) -> Result<S, ClassifyError> {
        // Already read through an earlier forward reference.
        if self.referables.contains_key(id) {
            return self.resolve_reference(id);
        }

        self.pending.insert(id.to_owned());
        let result = read(element, self, Some(id));
        self.pending.remove(id);
        result
    }

    /// Resolves a reference whose referable has not been read yet by reading
    /// it where it stands in the document.
    fn read_forward<S: Clone + 'static>(
        &mut self,
        id: &str,
        read: impl Fn(&F::Element, &mut Self, Option<&str>) -> Result<S, ClassifyError>,
    ) -> Result<S, ClassifyError> {
        if self.pending.contains(id) {
            return Err(self.data_error(format!(
                "id `{id}` is referenced from inside its own content, which needs a `RefCell`"
            )));
        }

        let format = self.format;
        let target = self
            .root
            .and_then(|root| format.find_referable(root, id))
            .ok_or_else(|| self.data_error(format!("reference to unknown id `{id}`")))?;
        log::trace!("reading `{id}` ahead of its position for `{}`", self.path);
        self.read_referable(target, id, read)
    }

    /// Makes `handle` the target of later `ref` markers with this id.
    pub fn register_referable<S: Clone + 'static>(&mut self, id: &str, handle: S) {
        self.referables.insert(id.to_owned(), Box::new(handle));
    }

    fn resolve_reference<S: Clone + 'static>(&self, id: &str) -> Result<S, ClassifyError> {
        let handle = self
            .referables
            .get(id)
            .ok_or_else(|| self.data_error(format!("reference to unknown id `{id}`")))?;
        (**handle).downcast_ref::<S>().cloned().ok_or_else(|| {
            self.data_error(format!(
                "id `{id}` refers to a value of another type than `{}`",
                core::any::type_name::<S>()
            ))
        })
    }

    // -------------------------------------------------------------------------
    // Parents

    /// Makes `parent` the enclosing object of everything read until the
    /// matching [`pop_parent`](Self::pop_parent).
    pub fn push_parent(&mut self, parent: Rc<dyn Any>) {
        self.parents.push((self.depth, parent));
    }

    pub fn pop_parent(&mut self) {
        self.parents.pop();
    }

    /// The nearest shared object enclosing the value being read.
    ///
    /// An entry pushed at the current depth is the value itself, not its
    /// parent.
    fn enclosing_parent(&self) -> Option<&Rc<dyn Any>> {
        let mut parents = self.parents.iter().rev();
        match parents.next() {
            Some((depth, _)) if *depth == self.depth => parents.next().map(|(_, parent)| parent),
            top => top.map(|(_, parent)| parent),
        }
    }

    // -------------------------------------------------------------------------
    // Satellites

    /// Reads a follow-id marker into a handle that loads the satellite file
    /// on first access.
    pub fn read_deferred<T: Classify>(&mut self, element: &F::Element) -> Result<Deferred<T>, ClassifyError> {
        let id = self
            .format
            .is_follow_id(element)
            .then(|| self.format.get_reference_id(element))
            .flatten()
            .ok_or_else(|| self.data_error("expected a follow-id marker"))?;
        if !is_valid_id(id) {
            return Err(self.data_error(format!("`{id}` cannot be used as a satellite id")));
        }
        Ok(self.lazy_satellite(id.to_owned()))
    }

    pub(crate) fn lazy_satellite<T: Classify>(&self, id: String) -> Deferred<T> {
        let format = self.format.clone();
        let options = self.options.clone();
        let parent = self.enclosing_parent().map(Rc::downgrade);
        let loader_id = id.clone();

        Deferred::from_fn(id, move || {
            load_satellite(&format, &options, &loader_id, parent.as_ref().and_then(Weak::upgrade))
        })
    }
}

fn load_satellite<F: ClassifyFormat, T: Classify>(
    format: &F,
    options: &ClassifyOptions,
    id: &str,
    parent: Option<Rc<dyn Any>>,
) -> Result<T, ClassifyError> {
    let base_dir = options.base_dir.as_deref().ok_or_else(|| {
        ClassifyError::configuration(
            T::type_name(),
            format!("satellite `{id}` cannot be loaded without a base directory"),
        )
    })?;
    let path = satellite_path(base_dir, &T::type_name(), id, format.extension());

    log::debug!("loading satellite `{}`", path.display());
    let file = File::open(&path).map_err(|err| ClassifyError::io(&path, err))?;
    let element = format.read_root(&mut BufReader::new(file))?;

    let mut reader = Reader::new(format, options);
    if let Some(parent) = parent {
        // Never mistaken for the satellite's own root.
        reader.parents.push((usize::MAX, parent));
    }
    reader.read_root(&element)
}
