use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use classify_format::ClassifyFormat;

use crate::{Classify, ClassifyError, ExactConvert, FieldKind, Reader, Writer};

// -----------------------------------------------------------------------------
// Text-converted leaf values

macro_rules! impl_leaf {
    ($kind:ident: $($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Classify for $ty {
                const KIND: FieldKind = FieldKind::$kind;

                #[inline]
                fn type_name() -> Cow<'static, str> {
                    Cow::Borrowed($name)
                }

                #[inline]
                fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
                    Ok(writer.write_text(self.to_invariant()))
                }

                #[inline]
                fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
                    reader.read_converted(element)
                }
            }
        )*
    };
}

impl_leaf!(Primitive:
    bool => "bool",
    char => "char",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    f32 => "f32",
    f64 => "f64",
);

impl_leaf!(String: String => "String");

#[cfg(feature = "chrono")]
impl_leaf!(Primitive:
    chrono::DateTime<chrono::Utc> => "DateTime",
    chrono::NaiveDateTime => "NaiveDateTime",
    chrono::NaiveDate => "NaiveDate",
);

// -----------------------------------------------------------------------------
// Bytes

/// Raw binary data, stored base64-encoded.
///
/// `Vec<u8>` is a list of numbers; wrap it in `Bytes` to store a blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    #[inline]
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<Bytes> for Vec<u8> {
    #[inline]
    fn from(bytes: Bytes) -> Self {
        bytes.0
    }
}

impl AsRef<[u8]> for Bytes {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Classify for Bytes {
    const KIND: FieldKind = FieldKind::Primitive;

    #[inline]
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("Bytes")
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        Ok(writer.write_bytes(&self.0))
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        reader.read_bytes(element).map(Self)
    }
}
