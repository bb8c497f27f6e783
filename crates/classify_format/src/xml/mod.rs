//! XML adapter.
//!
//! The on-wire shape:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <Person>
//!   <Name encoding="c-literal">Bob\nSmith</Name>
//!   <Tags>
//!     <item>a</item>
//!     <item>b</item>
//!   </Tags>
//!   <Self null="1"/>
//! </Person>
//! ```
//!
//! | attribute  | meaning                                  |
//! |------------|------------------------------------------|
//! | `null`     | the value is null                        |
//! | `encoding` | non-plain leaf text                      |
//! | `type`     | polymorphic type tag                     |
//! | `ref`      | reference to a referable node            |
//! | `refid`    | this node may be referenced              |
//! | `id`       | follow-id, the value lives in a satellite |
//! | `key`      | dictionary item key                      |
//! | `raw`      | embedded raw sub-tree, left as is        |

mod element;
mod format;

pub use element::XmlElement;
pub use format::XmlFormat;

fn xml_error<E: core::fmt::Display>(err: E) -> crate::FormatError {
    use alloc::string::ToString;
    crate::FormatError::Xml(err.to_string())
}
