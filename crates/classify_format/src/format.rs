use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Debug;
use std::io::{Read, Write};

use crate::{FormatError, SimpleValue};

// -----------------------------------------------------------------------------
// MarkerRewrite

/// Decision returned to [`ClassifyFormat::rewrite_referables`] for each
/// referable marker found in a finished tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerRewrite {
    /// Leave the marker untouched.
    Keep,
    /// Replace the marker's id.
    Replace(String),
    /// Drop the marker, the node is no longer referable.
    Remove,
}

// -----------------------------------------------------------------------------
// ClassifyFormat

/// A pluggable wire format.
///
/// The engine never touches a concrete element type directly. It asks the
/// format to recognize and build nodes of a handful of shapes:
///
/// - null markers and leaf (simple) values,
/// - raw embedded sub-trees ("self values"),
/// - lists, tuples, dictionaries and key-value pairs,
/// - objects with named fields,
/// - reference markers (`ref`), referable markers (`refid`) and follow-id
///   markers (`id`),
/// - a type tag for polymorphic values.
///
/// Nodes are built bottom-up as owned values. A child never knows its own
/// name; the name is assigned by the container that receives it
/// ([`make_object`], [`make_list`], [`make_dictionary`] ...), or by
/// [`make_root`] for the document root.
///
/// Readers borrow from the element tree, so every accessor returns
/// references tied to the element's lifetime.
///
/// [`make_object`]: ClassifyFormat::make_object
/// [`make_list`]: ClassifyFormat::make_list
/// [`make_dictionary`]: ClassifyFormat::make_dictionary
/// [`make_root`]: ClassifyFormat::make_root
pub trait ClassifyFormat: Clone + 'static {
    /// The concrete node type.
    type Element: Clone + Debug + 'static;

    /// File extension (without the dot) used for root and satellite files.
    fn extension(&self) -> &'static str;

    /// Whether the format can express `ref`/`refid` markers.
    ///
    /// When `false`, shared instances are written in full at every
    /// occurrence and cycles are rejected.
    fn supports_references(&self) -> bool {
        true
    }

    // ----------------------------------------------------------------
    // Streams

    /// Parses a whole document.
    fn read_root(&self, reader: &mut dyn Read) -> Result<Self::Element, FormatError>;

    /// Serializes a whole document.
    fn write_root(&self, element: &Self::Element, writer: &mut dyn Write) -> Result<(), FormatError>;

    /// Names the root node.
    fn make_root(&self, name: &str, element: Self::Element) -> Self::Element;

    // ----------------------------------------------------------------
    // Null and leaf values

    fn is_null(&self, element: &Self::Element) -> bool;

    fn make_null(&self) -> Self::Element;

    /// Returns `true` if the node carries no markers, no children and no text.
    fn is_empty(&self, element: &Self::Element) -> bool;

    /// Decodes a leaf value, honoring its encoding marker.
    fn get_simple_value(&self, element: &Self::Element) -> Result<SimpleValue, FormatError>;

    /// Builds a leaf value, auto-selecting the encoding.
    fn make_simple_value(&self, value: SimpleValue) -> Self::Element;

    // ----------------------------------------------------------------
    // Raw sub-trees

    fn get_self_value<'e>(&self, element: &'e Self::Element) -> Option<&'e Self::Element>;

    fn make_self_value(&self, inner: Self::Element) -> Self::Element;

    // ----------------------------------------------------------------
    // Containers

    /// Returns the items of a list.
    ///
    /// With `tuple_size = Some(n)` the result always has `n` slots and a
    /// slot is `None` when the matching `itemK` child is missing.
    fn get_list<'e>(
        &self,
        element: &'e Self::Element,
        tuple_size: Option<usize>,
    ) -> Vec<Option<&'e Self::Element>>;

    fn make_list(&self, is_tuple: bool, items: Vec<Self::Element>) -> Self::Element;

    /// Returns the `(key, value)` items of a dictionary in document order.
    ///
    /// Items without a key are skipped.
    fn get_dictionary<'e>(&self, element: &'e Self::Element) -> Vec<(Cow<'e, str>, &'e Self::Element)>;

    fn make_dictionary(&self, entries: Vec<(String, Self::Element)>) -> Self::Element;

    fn get_key_value_pair<'e>(
        &self,
        element: &'e Self::Element,
    ) -> (Option<&'e Self::Element>, Option<&'e Self::Element>);

    fn make_key_value_pair(&self, key: Self::Element, value: Self::Element) -> Self::Element;

    // ----------------------------------------------------------------
    // Objects

    #[inline]
    fn has_field(&self, element: &Self::Element, name: &str) -> bool {
        self.get_field(element, name).is_some()
    }

    fn get_field<'e>(&self, element: &'e Self::Element, name: &str) -> Option<&'e Self::Element>;

    fn make_object(&self, fields: Vec<(&str, Self::Element)>) -> Self::Element;

    // ----------------------------------------------------------------
    // References

    fn is_reference(&self, element: &Self::Element) -> bool;

    fn is_referable(&self, element: &Self::Element) -> bool;

    fn is_follow_id(&self, element: &Self::Element) -> bool;

    /// Reads whichever of the reference, referable or follow-id markers
    /// is present.
    fn get_reference_id<'e>(&self, element: &'e Self::Element) -> Option<&'e str>;

    fn make_reference(&self, id: &str) -> Self::Element;

    fn mark_referable(&self, element: Self::Element, id: &str) -> Self::Element;

    fn make_follow_id(&self, id: &str) -> Self::Element;

    /// Visits every referable marker in the tree, outside raw self values,
    /// and applies `rewrite`.
    fn rewrite_referables(
        &self,
        element: Self::Element,
        rewrite: &mut dyn FnMut(&str) -> MarkerRewrite,
    ) -> Self::Element;

    /// Returns the first node in document order carrying the referable
    /// marker `id`.
    ///
    /// Like [`rewrite_referables`](Self::rewrite_referables) this does not
    /// look inside raw self values.
    fn find_referable<'e>(&self, root: &'e Self::Element, id: &str) -> Option<&'e Self::Element>;

    // ----------------------------------------------------------------
    // Type tags

    fn get_type<'e>(&self, element: &'e Self::Element) -> Option<&'e str>;

    fn with_type(&self, element: Self::Element, type_name: &str) -> Self::Element;
}
