use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use classify_format::ClassifyFormat;

use crate::{Classify, ClassifyError, DictionaryKey, FieldKind, Reader, Writer};

// -----------------------------------------------------------------------------
// Dictionaries

// Keys are strings, integers or unit enums, none of them generic.
fn key_name<K>() -> &'static str {
    let full = core::any::type_name::<K>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Entries are written sorted by key text so output is reproducible.
impl<K, V, S> Classify for HashMap<K, V, S>
where
    K: DictionaryKey + Eq + Hash + 'static,
    V: Classify,
    S: BuildHasher + Default + 'static,
{
    const KIND: FieldKind = FieldKind::Dictionary;

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("HashMap<{}, {}>", key_name::<K>(), V::type_name()))
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        let mut entries: Vec<_> = self.iter().map(|(key, value)| (key.to_key(), value)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        writer.write_dictionary(entries)
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        Ok(reader.read_entries::<K, V>(element)?.into_iter().collect())
    }
}

impl<K, V> Classify for BTreeMap<K, V>
where
    K: DictionaryKey + Ord + 'static,
    V: Classify,
{
    const KIND: FieldKind = FieldKind::Dictionary;

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("BTreeMap<{}, {}>", key_name::<K>(), V::type_name()))
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        writer.write_dictionary(self.iter().map(|(key, value)| (key.to_key(), value)))
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        Ok(reader.read_entries::<K, V>(element)?.into_iter().collect())
    }
}

// -----------------------------------------------------------------------------
// KeyValuePair

/// A single key and value, stored as the fixed `key` and `value` children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyValuePair<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> KeyValuePair<K, V> {
    #[inline]
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V> From<(K, V)> for KeyValuePair<K, V> {
    #[inline]
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

impl<K: Classify, V: Classify> Classify for KeyValuePair<K, V> {
    const KIND: FieldKind = FieldKind::KeyValuePair;

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("KeyValuePair<{}, {}>", K::type_name(), V::type_name()))
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        let key = writer.write_named("key", &self.key)?;
        let value = writer.write_named("value", &self.value)?;
        Ok(writer.format().make_key_value_pair(key, value))
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        reader.read_pair(element).map(Self::from)
    }
}
