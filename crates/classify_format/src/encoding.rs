//! Leaf value encodings shared by the adapters.
//!
//! A simple value is stored as text. Most text is stored as-is, but
//! control characters (below U+0020) do not survive every wire format,
//! so the text is tagged with an [`Encoding`] instead:
//!
//! | encoding    | used for                              | stored text          |
//! |-------------|---------------------------------------|----------------------|
//! | `plain`     | everything else                       | the text itself      |
//! | `c-literal` | text containing control characters    | backslash escapes    |
//! | `codepoint` | a lone control character              | decimal code point   |
//! | `base64`    | raw bytes                             | standard base64      |

use alloc::borrow::ToOwned;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::FormatError;

// -----------------------------------------------------------------------------
// SimpleValue

/// The decoded content of a leaf element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleValue {
    /// Text in invariant form (numbers, booleans, strings, ...).
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
}

impl SimpleValue {
    /// Returns a short description of the value's shape, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            SimpleValue::Text(_) => "text",
            SimpleValue::Bytes(_) => "bytes",
        }
    }
}

// -----------------------------------------------------------------------------
// Encoding

/// How the text of a leaf element is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Plain,
    CLiteral,
    Base64,
    Codepoint,
}

impl Encoding {
    /// The name written to the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Encoding::Plain => "plain",
            Encoding::CLiteral => "c-literal",
            Encoding::Base64 => "base64",
            Encoding::Codepoint => "codepoint",
        }
    }

    /// Parses a wire name back into an [`Encoding`].
    ///
    /// # Examples
    ///
    /// ```
    /// use classify_format::Encoding;
    ///
    /// assert_eq!(Encoding::parse("c-literal").unwrap(), Encoding::CLiteral);
    /// assert!(Encoding::parse("rot13").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self, FormatError> {
        match name {
            "plain" => Ok(Encoding::Plain),
            "c-literal" => Ok(Encoding::CLiteral),
            "base64" => Ok(Encoding::Base64),
            "codepoint" => Ok(Encoding::Codepoint),
            other => Err(FormatError::UnknownEncoding(other.to_owned())),
        }
    }

    /// Picks the encoding for a piece of text.
    ///
    /// - A lone control character uses [`Encoding::Codepoint`].
    /// - Text containing a control character uses [`Encoding::CLiteral`].
    /// - Everything else is [`Encoding::Plain`].
    pub fn select(text: &str) -> Self {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(only), None) if is_control(only) => Encoding::Codepoint,
            _ if text.chars().any(is_control) => Encoding::CLiteral,
            _ => Encoding::Plain,
        }
    }

    /// Encodes a value, auto-selecting the encoding.
    pub fn encode(value: SimpleValue) -> (Self, String) {
        match value {
            SimpleValue::Bytes(bytes) => (Encoding::Base64, STANDARD.encode(bytes)),
            SimpleValue::Text(text) => match Encoding::select(&text) {
                Encoding::Codepoint => {
                    let code = text.chars().next().map(u32::from).unwrap_or_default();
                    (Encoding::Codepoint, code.to_string())
                }
                Encoding::CLiteral => (Encoding::CLiteral, escape_c_literal(&text)),
                _ => (Encoding::Plain, text),
            },
        }
    }

    /// Decodes wire text stored with this encoding.
    pub fn decode(self, text: &str) -> Result<SimpleValue, FormatError> {
        match self {
            Encoding::Plain => Ok(SimpleValue::Text(text.to_owned())),
            Encoding::CLiteral => unescape_c_literal(text).map(SimpleValue::Text),
            Encoding::Codepoint => {
                let code = text
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| FormatError::InvalidCodepoint(text.to_owned()))?;
                Ok(SimpleValue::Text(String::from(code)))
            }
            Encoding::Base64 => {
                // Hand-edited documents may wrap long payloads.
                let compact: String = text.split_ascii_whitespace().collect();
                Ok(SimpleValue::Bytes(STANDARD.decode(compact)?))
            }
        }
    }
}

#[inline]
fn is_control(c: char) -> bool {
    (c as u32) < 0x20
}

// -----------------------------------------------------------------------------
// C-style literal escaping

/// Escapes backslashes and control characters using C-style sequences.
///
/// # Examples
///
/// ```
/// use classify_format::escape_c_literal;
///
/// assert_eq!(escape_c_literal("Bob\nSmith"), r"Bob\nSmith");
/// assert_eq!(escape_c_literal("a\\b\u{1}"), r"a\\b\x01");
/// ```
pub fn escape_c_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if is_control(c) => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Reverses [`escape_c_literal`].
pub fn unescape_c_literal(text: &str) -> Result<String, FormatError> {
    let invalid = |reason| FormatError::InvalidEscape {
        text: text.to_owned(),
        reason,
    };

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let unescaped = match chars.next() {
            Some('\\') => '\\',
            Some('0') => '\0',
            Some('a') => '\u{7}',
            Some('b') => '\u{8}',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('v') => '\u{b}',
            Some('f') => '\u{c}',
            Some('r') => '\r',
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return Err(invalid("truncated `\\x` sequence"));
                }
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| invalid("bad hex digits"))?
            }
            Some(_) => return Err(invalid("unknown escape")),
            None => return Err(invalid("trailing backslash")),
        };
        out.push(unescaped);
    }
    Ok(out)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Encoding, SimpleValue, escape_c_literal, unescape_c_literal};
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn selection() {
        assert_eq!(Encoding::select("hello world"), Encoding::Plain);
        assert_eq!(Encoding::select(""), Encoding::Plain);
        assert_eq!(Encoding::select("two\nlines"), Encoding::CLiteral);
        assert_eq!(Encoding::select("\u{7}"), Encoding::Codepoint);
        assert_eq!(Encoding::select("\u{7}\u{7}"), Encoding::CLiteral);
    }

    #[test]
    fn codepoint_text() {
        let (encoding, text) = Encoding::encode(SimpleValue::Text(String::from("\u{7}")));
        assert_eq!(encoding, Encoding::Codepoint);
        assert_eq!(text, "7");
        assert_eq!(
            encoding.decode(&text).unwrap(),
            SimpleValue::Text(String::from("\u{7}"))
        );
    }

    #[test]
    fn c_literal_escapes() {
        let original = "tab\there\r\n\\end\u{1f}";
        let escaped = escape_c_literal(original);
        assert!(!escaped.chars().any(|c| (c as u32) < 0x20));
        assert_eq!(unescape_c_literal(&escaped).unwrap(), original);
    }

    #[test]
    fn c_literal_rejects_garbage() {
        assert!(unescape_c_literal("dangling\\").is_err());
        assert!(unescape_c_literal("\\q").is_err());
        assert!(unescape_c_literal("\\x4").is_err());
    }

    #[test]
    fn base64_bytes() {
        let (encoding, text) = Encoding::encode(SimpleValue::Bytes(vec![0, 159, 146, 150]));
        assert_eq!(encoding, Encoding::Base64);
        assert_eq!(text, "AJ+Slg==");
        assert_eq!(
            Encoding::Base64.decode("AJ+S\n  lg==").unwrap(),
            SimpleValue::Bytes(vec![0, 159, 146, 150])
        );
    }
}
