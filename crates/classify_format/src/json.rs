//! JSON adapter.
//!
//! Node type is [`serde_json::Value`]. Markers live in object keys that
//! start with `:`, which cannot collide with field names:
//!
//! ```json
//! {
//!   ":type": "Circle",
//!   ":refid": "a",
//!   "radius": "2.5",
//!   "payload": { ":base64": "AAEC" },
//!   "tags": ["x", "y"],
//!   "next": { ":ref": "a" }
//! }
//! ```
//!
//! Dictionary keys that start with `:` are escaped by doubling the colon.
//! A marker attached to a non-object value wraps it as `{":value": ...}`.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::{ClassifyFormat, FormatError, MarkerRewrite, SimpleValue};

const TYPE: &str = ":type";
const REF: &str = ":ref";
const REFID: &str = ":refid";
const ID: &str = ":id";
const RAW: &str = ":raw";
const VALUE: &str = ":value";
const BASE64: &str = ":base64";

const PAIR_KEY: &str = "key";
const PAIR_VALUE: &str = "value";

// -----------------------------------------------------------------------------
// JsonFormat

/// The JSON wire format.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormat {
    pretty: bool,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormat {
    /// A format writing indented documents.
    #[inline]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    /// A format writing single-line documents.
    #[inline]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }
}

#[inline]
fn is_marker(key: &str) -> bool {
    key.starts_with(':') && !key.starts_with("::")
}

fn escape_key(key: String) -> String {
    if key.starts_with(':') {
        let mut escaped = String::with_capacity(key.len() + 1);
        escaped.push(':');
        escaped.push_str(&key);
        escaped
    } else {
        key
    }
}

/// Unwraps a `{":value": ...}` wrapper.
fn payload(element: &Value) -> &Value {
    match element {
        Value::Object(map) => map.get(VALUE).unwrap_or(element),
        _ => element,
    }
}

/// Adds a marker, wrapping non-object values first.
fn with_marker(element: Value, key: &str, marker: &str) -> Value {
    let mut map = match element {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert(VALUE.to_string(), other);
            map
        }
    };
    map.insert(key.to_string(), Value::String(marker.to_string()));
    Value::Object(map)
}

fn marker<'e>(element: &'e Value, key: &str) -> Option<&'e str> {
    element.as_object()?.get(key)?.as_str()
}

fn rewrite(element: Value, rewrite_id: &mut dyn FnMut(&str) -> MarkerRewrite) -> Value {
    match element {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| rewrite(v, rewrite_id)).collect())
        }
        Value::Object(map) => {
            let decision = map.get(REFID).and_then(Value::as_str).map(|id| rewrite_id(id));
            let mut map: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| match k.as_str() {
                    RAW => (k, v),
                    _ => (k, rewrite(v, rewrite_id)),
                })
                .collect();
            match decision {
                Some(MarkerRewrite::Replace(id)) => {
                    map.insert(REFID.to_string(), Value::String(id));
                }
                Some(MarkerRewrite::Remove) => {
                    map.remove(REFID);
                }
                Some(MarkerRewrite::Keep) | None => {}
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn find<'e>(element: &'e Value, id: &str) -> Option<&'e Value> {
    match element {
        Value::Array(items) => items.iter().find_map(|v| find(v, id)),
        Value::Object(map) => {
            if map.get(REFID).and_then(Value::as_str) == Some(id) {
                return Some(element);
            }
            map.iter()
                .filter(|(k, _)| k.as_str() != RAW)
                .find_map(|(_, v)| find(v, id))
        }
        _ => None,
    }
}

impl ClassifyFormat for JsonFormat {
    type Element = Value;

    #[inline]
    fn extension(&self) -> &'static str {
        "json"
    }

    fn read_root(&self, reader: &mut dyn Read) -> Result<Value, FormatError> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_root(&self, element: &Value, writer: &mut dyn Write) -> Result<(), FormatError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, element)?;
        } else {
            serde_json::to_writer(&mut *writer, element)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn make_root(&self, _name: &str, element: Value) -> Value {
        element
    }

    // ------------------------------------------------------------------

    #[inline]
    fn is_null(&self, element: &Value) -> bool {
        element.is_null()
    }

    #[inline]
    fn make_null(&self) -> Value {
        Value::Null
    }

    fn is_empty(&self, element: &Value) -> bool {
        match element {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::String(text) => text.is_empty(),
            _ => false,
        }
    }

    fn get_simple_value(&self, element: &Value) -> Result<SimpleValue, FormatError> {
        match payload(element) {
            Value::String(text) => Ok(SimpleValue::Text(text.clone())),
            Value::Number(number) => Ok(SimpleValue::Text(number.to_string())),
            Value::Bool(flag) => Ok(SimpleValue::Text(flag.to_string())),
            Value::Object(map) if map.contains_key(BASE64) => {
                let text = map.get(BASE64).and_then(Value::as_str).unwrap_or_default();
                let compact: String = text.split_ascii_whitespace().collect();
                Ok(SimpleValue::Bytes(STANDARD.decode(compact)?))
            }
            other => Err(FormatError::UnexpectedShape {
                expected: "a simple value",
                found: other.to_string(),
            }),
        }
    }

    fn make_simple_value(&self, value: SimpleValue) -> Value {
        match value {
            SimpleValue::Text(text) => Value::String(text),
            SimpleValue::Bytes(bytes) => {
                let mut map = Map::new();
                map.insert(BASE64.to_string(), Value::String(STANDARD.encode(bytes)));
                Value::Object(map)
            }
        }
    }

    // ------------------------------------------------------------------

    fn get_self_value<'e>(&self, element: &'e Value) -> Option<&'e Value> {
        element.as_object()?.get(RAW)
    }

    fn make_self_value(&self, inner: Value) -> Value {
        let mut map = Map::new();
        map.insert(RAW.to_string(), inner);
        Value::Object(map)
    }

    // ------------------------------------------------------------------

    fn get_list<'e>(&self, element: &'e Value, tuple_size: Option<usize>) -> Vec<Option<&'e Value>> {
        let items: &[Value] = match payload(element) {
            Value::Array(items) => items.as_slice(),
            _ => &[],
        };
        match tuple_size {
            Some(size) => (0..size).map(|i| items.get(i)).collect(),
            None => items.iter().map(Some).collect(),
        }
    }

    #[inline]
    fn make_list(&self, _is_tuple: bool, items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn get_dictionary<'e>(&self, element: &'e Value) -> Vec<(Cow<'e, str>, &'e Value)> {
        let Value::Object(map) = payload(element) else {
            return Vec::new();
        };
        map.iter()
            .filter(|(key, _)| !is_marker(key))
            .map(|(key, value)| match key.strip_prefix(':') {
                Some(unescaped) => (Cow::Borrowed(unescaped), value),
                None => (Cow::Borrowed(key.as_str()), value),
            })
            .collect()
    }

    fn make_dictionary(&self, entries: Vec<(String, Value)>) -> Value {
        let map = entries
            .into_iter()
            .map(|(key, value)| (escape_key(key), value))
            .collect();
        Value::Object(map)
    }

    fn get_key_value_pair<'e>(&self, element: &'e Value) -> (Option<&'e Value>, Option<&'e Value>) {
        match payload(element) {
            Value::Object(map) => (map.get(PAIR_KEY), map.get(PAIR_VALUE)),
            _ => (None, None),
        }
    }

    fn make_key_value_pair(&self, key: Value, value: Value) -> Value {
        let mut map = Map::new();
        map.insert(PAIR_KEY.to_string(), key);
        map.insert(PAIR_VALUE.to_string(), value);
        Value::Object(map)
    }

    // ------------------------------------------------------------------

    fn get_field<'e>(&self, element: &'e Value, name: &str) -> Option<&'e Value> {
        payload(element).as_object()?.get(name)
    }

    fn make_object(&self, fields: Vec<(&str, Value)>) -> Value {
        let map = fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        Value::Object(map)
    }

    // ------------------------------------------------------------------

    fn is_reference(&self, element: &Value) -> bool {
        marker(element, REF).is_some()
    }

    fn is_referable(&self, element: &Value) -> bool {
        marker(element, REFID).is_some()
    }

    fn is_follow_id(&self, element: &Value) -> bool {
        marker(element, ID).is_some()
    }

    fn get_reference_id<'e>(&self, element: &'e Value) -> Option<&'e str> {
        marker(element, REF)
            .or_else(|| marker(element, REFID))
            .or_else(|| marker(element, ID))
    }

    fn make_reference(&self, id: &str) -> Value {
        with_marker(Value::Object(Map::new()), REF, id)
    }

    fn mark_referable(&self, element: Value, id: &str) -> Value {
        with_marker(element, REFID, id)
    }

    fn make_follow_id(&self, id: &str) -> Value {
        with_marker(Value::Object(Map::new()), ID, id)
    }

    fn rewrite_referables(
        &self,
        element: Value,
        rewrite_id: &mut dyn FnMut(&str) -> MarkerRewrite,
    ) -> Value {
        rewrite(element, rewrite_id)
    }

    fn find_referable<'e>(&self, root: &'e Value, id: &str) -> Option<&'e Value> {
        find(root, id)
    }

    // ------------------------------------------------------------------

    fn get_type<'e>(&self, element: &'e Value) -> Option<&'e str> {
        marker(element, TYPE)
    }

    fn with_type(&self, element: Value, type_name: &str) -> Value {
        with_marker(element, TYPE, type_name)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::JsonFormat;
    use crate::{ClassifyFormat, MarkerRewrite, SimpleValue};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use serde_json::json;

    #[test]
    fn numbers_and_bools_read_as_text() {
        let fmt = JsonFormat::new();
        assert_eq!(
            fmt.get_simple_value(&json!(42)).unwrap(),
            SimpleValue::Text(String::from("42"))
        );
        assert_eq!(
            fmt.get_simple_value(&json!(true)).unwrap(),
            SimpleValue::Text(String::from("true"))
        );
        assert!(fmt.get_simple_value(&json!([1])).is_err());
    }

    #[test]
    fn bytes_use_base64_marker() {
        let fmt = JsonFormat::new();
        let element = fmt.make_simple_value(SimpleValue::Bytes(vec![1, 2, 3]));
        assert_eq!(element, json!({ ":base64": "AQID" }));
        assert_eq!(
            fmt.get_simple_value(&element).unwrap(),
            SimpleValue::Bytes(vec![1, 2, 3])
        );
    }

    #[test]
    fn markers_wrap_scalars() {
        let fmt = JsonFormat::new();
        let tagged = fmt.with_type(json!("hello"), "Greeting");
        assert_eq!(tagged, json!({ ":value": "hello", ":type": "Greeting" }));
        assert_eq!(fmt.get_type(&tagged), Some("Greeting"));
        assert_eq!(
            fmt.get_simple_value(&tagged).unwrap(),
            SimpleValue::Text(String::from("hello"))
        );
    }

    #[test]
    fn dictionary_keys_are_escaped() {
        let fmt = JsonFormat::new();
        let dict = fmt.make_dictionary(vec![
            (String::from(":odd"), json!("1")),
            (String::from("plain"), json!("2")),
        ]);
        let dict = fmt.mark_referable(dict, "a");
        let mut keys: Vec<String> = fmt
            .get_dictionary(&dict)
            .into_iter()
            .map(|(k, _)| k.into_owned())
            .collect();
        keys.sort();
        assert_eq!(keys, vec![String::from(":odd"), String::from("plain")]);
    }

    #[test]
    fn rewrite_markers() {
        let fmt = JsonFormat::new();
        let tree = json!({ ":refid": "#0", "child": [{ ":refid": "#1" }] });
        let tree = fmt.rewrite_referables(tree, &mut |id| match id {
            "#0" => MarkerRewrite::Replace(String::from("a")),
            _ => MarkerRewrite::Remove,
        });
        assert_eq!(tree, json!({ ":refid": "a", "child": [{}] }));
    }

    #[test]
    fn raw_values_keep_their_markers() {
        let fmt = JsonFormat::new();
        let raw = fmt.make_self_value(json!({ ":refid": "#0", "text": "kept" }));
        let tree = json!({ "body": raw, "items": [{ ":refid": "#0" }] });

        let found = fmt.find_referable(&tree, "#0").unwrap();
        assert_eq!(found, &json!({ ":refid": "#0" }));

        let tree = fmt.rewrite_referables(tree, &mut |_| MarkerRewrite::Remove);
        assert_eq!(
            tree,
            json!({ "body": { ":raw": { ":refid": "#0", "text": "kept" } }, "items": [{}] })
        );
        assert!(fmt.find_referable(&tree, "#0").is_none());
    }
}
