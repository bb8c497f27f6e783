use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use std::io::{Read, Write};

use super::XmlElement;
use crate::{ClassifyFormat, Encoding, FormatError, MarkerRewrite, SimpleValue};

const NULL: &str = "null";
const ENCODING: &str = "encoding";
const TYPE: &str = "type";
const REF: &str = "ref";
const REFID: &str = "refid";
const ID: &str = "id";
const KEY: &str = "key";
const RAW: &str = "raw";

const ITEM: &str = "item";
const PAIR_KEY: &str = "key";
const PAIR_VALUE: &str = "value";

// -----------------------------------------------------------------------------
// XmlFormat

/// The XML wire format. Node type is [`XmlElement`].
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormat;

impl XmlFormat {
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

/// Replaces characters that cannot appear in an XML name.
fn sanitize_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    match out.chars().next() {
        None => out.push_str("root"),
        Some(first) if !(first.is_alphabetic() || first == '_') => out.insert(0, '_'),
        Some(_) => {}
    }
    out
}

impl ClassifyFormat for XmlFormat {
    type Element = XmlElement;

    #[inline]
    fn extension(&self) -> &'static str {
        "xml"
    }

    fn read_root(&self, reader: &mut dyn Read) -> Result<XmlElement, FormatError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        XmlElement::parse(&text)
    }

    fn write_root(&self, element: &XmlElement, writer: &mut dyn Write) -> Result<(), FormatError> {
        element.write_to(&mut *writer)?;
        writer.write_all(b"\n")?;
        Ok(())
    }

    fn make_root(&self, name: &str, element: XmlElement) -> XmlElement {
        element.named(sanitize_name(name))
    }

    // ------------------------------------------------------------------

    fn is_null(&self, element: &XmlElement) -> bool {
        element.attribute(NULL) == Some("1")
    }

    fn make_null(&self) -> XmlElement {
        XmlElement::default().with_attribute(NULL, "1")
    }

    #[inline]
    fn is_empty(&self, element: &XmlElement) -> bool {
        element.is_empty()
    }

    fn get_simple_value(&self, element: &XmlElement) -> Result<SimpleValue, FormatError> {
        let encoding = match element.attribute(ENCODING) {
            Some(name) => Encoding::parse(name)?,
            None => Encoding::Plain,
        };
        encoding.decode(element.text())
    }

    fn make_simple_value(&self, value: SimpleValue) -> XmlElement {
        let (encoding, text) = Encoding::encode(value);
        let element = XmlElement::default().with_text(text);
        match encoding {
            Encoding::Plain => element,
            other => element.with_attribute(ENCODING, other.as_str()),
        }
    }

    // ------------------------------------------------------------------

    fn get_self_value<'e>(&self, element: &'e XmlElement) -> Option<&'e XmlElement> {
        element.children.first()
    }

    fn make_self_value(&self, inner: XmlElement) -> XmlElement {
        XmlElement::default().with_attribute(RAW, "1").with_child(inner)
    }

    // ------------------------------------------------------------------

    fn get_list<'e>(
        &self,
        element: &'e XmlElement,
        tuple_size: Option<usize>,
    ) -> Vec<Option<&'e XmlElement>> {
        match tuple_size {
            Some(size) => (1..=size)
                .map(|i| element.child(&format!("{ITEM}{i}")))
                .collect(),
            None => element
                .children
                .iter()
                .filter(|c| c.name == ITEM)
                .map(Some)
                .collect(),
        }
    }

    fn make_list(&self, is_tuple: bool, items: Vec<XmlElement>) -> XmlElement {
        let children = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match is_tuple {
                true => item.named(format!("{ITEM}{}", i + 1)),
                false => item.named(ITEM),
            })
            .collect();
        XmlElement {
            children,
            ..XmlElement::default()
        }
    }

    fn get_dictionary<'e>(&self, element: &'e XmlElement) -> Vec<(Cow<'e, str>, &'e XmlElement)> {
        element
            .children
            .iter()
            .filter(|c| c.name == ITEM)
            .filter_map(|c| c.attribute(KEY).map(|key| (Cow::Borrowed(key), c)))
            .collect()
    }

    fn make_dictionary(&self, entries: Vec<(String, XmlElement)>) -> XmlElement {
        let children = entries
            .into_iter()
            .map(|(key, value)| value.named(ITEM).with_attribute(KEY, key))
            .collect();
        XmlElement {
            children,
            ..XmlElement::default()
        }
    }

    fn get_key_value_pair<'e>(
        &self,
        element: &'e XmlElement,
    ) -> (Option<&'e XmlElement>, Option<&'e XmlElement>) {
        (element.child(PAIR_KEY), element.child(PAIR_VALUE))
    }

    fn make_key_value_pair(&self, key: XmlElement, value: XmlElement) -> XmlElement {
        XmlElement::default()
            .with_child(key.named(PAIR_KEY))
            .with_child(value.named(PAIR_VALUE))
    }

    // ------------------------------------------------------------------

    fn get_field<'e>(&self, element: &'e XmlElement, name: &str) -> Option<&'e XmlElement> {
        element.child(name)
    }

    fn make_object(&self, fields: Vec<(&str, XmlElement)>) -> XmlElement {
        let children = fields
            .into_iter()
            .map(|(name, value)| value.named(name))
            .collect();
        XmlElement {
            children,
            ..XmlElement::default()
        }
    }

    // ------------------------------------------------------------------

    fn is_reference(&self, element: &XmlElement) -> bool {
        element.attribute(REF).is_some()
    }

    fn is_referable(&self, element: &XmlElement) -> bool {
        element.attribute(REFID).is_some()
    }

    fn is_follow_id(&self, element: &XmlElement) -> bool {
        element.attribute(ID).is_some()
    }

    fn get_reference_id<'e>(&self, element: &'e XmlElement) -> Option<&'e str> {
        element
            .attribute(REF)
            .or_else(|| element.attribute(REFID))
            .or_else(|| element.attribute(ID))
    }

    fn make_reference(&self, id: &str) -> XmlElement {
        XmlElement::default().with_attribute(REF, id)
    }

    fn mark_referable(&self, element: XmlElement, id: &str) -> XmlElement {
        element.with_attribute(REFID, id)
    }

    fn make_follow_id(&self, id: &str) -> XmlElement {
        XmlElement::default().with_attribute(ID, id)
    }

    fn rewrite_referables(
        &self,
        element: XmlElement,
        rewrite: &mut dyn FnMut(&str) -> MarkerRewrite,
    ) -> XmlElement {
        element.rewrite_attribute(REFID, RAW, rewrite)
    }

    fn find_referable<'e>(&self, root: &'e XmlElement, id: &str) -> Option<&'e XmlElement> {
        root.find_attribute(REFID, id, RAW)
    }

    // ------------------------------------------------------------------

    fn get_type<'e>(&self, element: &'e XmlElement) -> Option<&'e str> {
        element.attribute(TYPE)
    }

    fn with_type(&self, element: XmlElement, type_name: &str) -> XmlElement {
        element.with_attribute(TYPE, type_name)
    }
}

// -----------------------------------------------------------------------------
// Tests
