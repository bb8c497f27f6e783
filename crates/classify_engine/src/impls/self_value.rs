//! Raw sub-trees of a wire format, embedded untouched.
//!
//! A raw value can only be written to and read from its own format; using
//! it with another format is a configuration error.

#[cfg(any(feature = "xml", feature = "json"))]
macro_rules! impl_self_value {
    ($ty:ty => $name:literal) => {
        impl $crate::Classify for $ty {
            const KIND: $crate::FieldKind = $crate::FieldKind::SelfValue;

            #[inline]
            fn type_name() -> ::alloc::borrow::Cow<'static, str> {
                ::alloc::borrow::Cow::Borrowed($name)
            }

            fn write<F: ::classify_format::ClassifyFormat>(
                &self,
                writer: &mut $crate::Writer<'_, F>,
            ) -> Result<F::Element, $crate::ClassifyError> {
                writer.write_self_value(self)
            }

            fn read<F: ::classify_format::ClassifyFormat>(
                element: &F::Element,
                reader: &mut $crate::Reader<'_, F>,
            ) -> Result<Self, $crate::ClassifyError> {
                reader.read_self_value::<Self>(element)
            }
        }
    };
}

#[cfg(feature = "xml")]
impl_self_value!(classify_format::XmlElement => "XmlElement");

#[cfg(feature = "json")]
impl_self_value!(serde_json::Value => "JsonValue");
