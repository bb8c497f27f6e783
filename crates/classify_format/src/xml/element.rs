use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str;
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::xml_error;
use crate::{FormatError, MarkerRewrite};

// -----------------------------------------------------------------------------
// XmlElement

/// An owned XML element tree.
///
/// This is the [`XmlFormat`](super::XmlFormat) node type. It only models
/// what the engine needs: a name, attributes in insertion order, child
/// elements and text. Comments and processing instructions are dropped on
/// parse. Mixed content is flattened, all text of an element is joined.
///
/// # Examples
///
/// ```
/// use classify_format::XmlElement;
///
/// let element = XmlElement::new("point")
///     .with_attribute("unit", "mm")
///     .with_child(XmlElement::new("x").with_text("3"))
///     .with_child(XmlElement::new("y").with_text("4"));
///
/// let text = element.to_xml_string().unwrap();
/// assert_eq!(XmlElement::parse(&text).unwrap(), element);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: Option<String>,
}

impl XmlElement {
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the element renamed to `name`.
    #[inline]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns the element with attribute `key` set, replacing any previous value.
    pub fn with_attribute(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    #[inline]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    #[inline]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(k, _)| k == key)?;
        Some(self.attributes.remove(index).1)
    }

    /// Returns the first child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns the element's text, or `""` when it has none.
    #[inline]
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    /// Returns `true` if the element has no attributes, no children and no text.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text().is_empty()
    }

    /// Applies `rewrite` to every `key` attribute in the tree, depth first.
    ///
    /// The children of elements carrying an `opaque` attribute are left
    /// untouched.
    pub(crate) fn rewrite_attribute(
        mut self,
        key: &str,
        opaque: &str,
        rewrite: &mut dyn FnMut(&str) -> MarkerRewrite,
    ) -> Self {
        if let Some(index) = self.attributes.iter().position(|(k, _)| k == key) {
            match rewrite(&self.attributes[index].1) {
                MarkerRewrite::Keep => {}
                MarkerRewrite::Replace(id) => self.attributes[index].1 = id,
                MarkerRewrite::Remove => {
                    self.attributes.remove(index);
                }
            }
        }
        if self.attribute(opaque).is_some() {
            return self;
        }
        self.children = self
            .children
            .into_iter()
            .map(|child| child.rewrite_attribute(key, opaque, rewrite))
            .collect();
        self
    }

    /// Returns the first element in document order whose `key` attribute
    /// equals `value`, skipping the children of `opaque` elements.
    pub(crate) fn find_attribute(&self, key: &str, value: &str, opaque: &str) -> Option<&XmlElement> {
        if self.attribute(key) == Some(value) {
            return Some(self);
        }
        if self.attribute(opaque).is_some() {
            return None;
        }
        self.children
            .iter()
            .find_map(|child| child.find_attribute(key, value, opaque))
    }

    // -------------------------------------------------------------------------
    // Parsing

    /// Parses a document and returns its root element.
    pub fn parse(text: &str) -> Result<XmlElement, FormatError> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(start) => stack.push(open(&start)?),
                Event::Empty(start) => {
                    let element = open(&start)?;
                    attach(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    let mut element = stack
                        .pop()
                        .ok_or_else(|| FormatError::Xml("unexpected closing tag".into()))?;
                    // Indentation between child elements is not content.
                    if !element.children.is_empty() && element.text().trim().is_empty() {
                        element.text = None;
                    }
                    attach(element, &mut stack, &mut root)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        push_text(top, &text.unescape().map_err(xml_error)?);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let data = data.into_inner();
                        push_text(top, str::from_utf8(&data).map_err(xml_error)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FormatError::Xml(alloc::format!(
                "element `{}` is never closed",
                open.name
            )));
        }
        root.ok_or_else(|| FormatError::Xml("document has no root element".into()))
    }

    // -------------------------------------------------------------------------
    // Writing

    /// Writes the element as an indented document with an XML declaration.
    pub fn write_to<W: Write>(&self, out: W) -> Result<(), FormatError> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        self.write_events(&mut writer)
    }

    /// Renders the element as an indented document.
    pub fn to_xml_string(&self) -> Result<String, FormatError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(xml_error)
    }

    fn write_events<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), FormatError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        let text = self.text.as_deref().filter(|t| !t.is_empty());
        if self.children.is_empty() && text.is_none() {
            return writer.write_event(Event::Empty(start)).map_err(xml_error);
        }

        writer.write_event(Event::Start(start)).map_err(xml_error)?;
        if let Some(text) = text {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_error)?;
        }
        for child in &self.children {
            child.write_events(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(xml_error)
    }
}

fn open(start: &BytesStart<'_>) -> Result<XmlElement, FormatError> {
    let name = str::from_utf8(start.name().as_ref())
        .map_err(xml_error)?
        .to_string();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        let key = str::from_utf8(attribute.key.as_ref()).map_err(xml_error)?;
        let value = attribute.unescape_value().map_err(xml_error)?;
        element.set_attribute(key, value.into_owned());
    }
    Ok(element)
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> Result<(), FormatError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(FormatError::Xml("document has more than one root element".into()));
        }
        None => *root = Some(element),
    }
    Ok(())
}

fn push_text(element: &mut XmlElement, text: &str) {
    element.text.get_or_insert_with(String::new).push_str(text);
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::XmlElement;
    use crate::MarkerRewrite;

    #[test]
    fn parse_drops_indentation() {
        let text = "<?xml version=\"1.0\"?>\n<a x=\"1 &amp; 2\">\n  <b>  padded  </b>\n  <c/>\n</a>\n";
        let root = XmlElement::parse(text).unwrap();
        assert_eq!(root.name, "a");
        assert_eq!(root.attribute("x"), Some("1 & 2"));
        assert_eq!(root.text, None);
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.child("b").unwrap().text(), "  padded  ");
        assert!(root.child("c").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_broken_documents() {
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a/><b/>").is_err());
    }

    #[test]
    fn write_escapes_markup() {
        let element = XmlElement::new("v")
            .with_attribute("k", "<\"q\">")
            .with_text("a < b && c");
        let text = element.to_xml_string().unwrap();
        assert!(text.starts_with("<?xml"));
        assert_eq!(XmlElement::parse(&text).unwrap(), element);
    }

    #[test]
    fn rewrite_nested_markers() {
        let tree = XmlElement::new("root")
            .with_attribute("refid", "#0")
            .with_child(XmlElement::new("x").with_attribute("refid", "#1"));
        let tree = tree.rewrite_attribute("refid", "raw", &mut |id| match id {
            "#0" => MarkerRewrite::Replace("a".into()),
            _ => MarkerRewrite::Remove,
        });
        assert_eq!(tree.attribute("refid"), Some("a"));
        assert!(tree.children[0].attributes.is_empty());
    }

    #[test]
    fn opaque_subtrees_are_skipped() {
        let fragment = XmlElement::new("quote").with_attribute("refid", "#0");
        let tree = XmlElement::new("root")
            .with_child(XmlElement::new("x").with_attribute("refid", "#0"))
            .with_child(XmlElement::new("raw").with_attribute("raw", "1").with_child(fragment.clone()));

        assert_eq!(tree.find_attribute("refid", "#0", "raw").unwrap().name, "x");
        assert!(tree.children[1].find_attribute("refid", "#0", "raw").is_none());

        let tree = tree.rewrite_attribute("refid", "raw", &mut |_| MarkerRewrite::Remove);
        assert!(tree.children[0].attributes.is_empty());
        assert_eq!(tree.children[1].children[0], fragment);
    }
}
