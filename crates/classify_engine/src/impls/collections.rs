use alloc::borrow::Cow;
use alloc::collections::{BTreeSet, VecDeque};
use alloc::format;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashSet;

use classify_format::ClassifyFormat;

use crate::{Classify, ClassifyError, FieldKind, Reader, Writer};

// -----------------------------------------------------------------------------
// Option

/// `None` is written as a null marker.
impl<T: Classify> Classify for Option<T> {
    const KIND: FieldKind = T::KIND;
    const IS_DEFERRED: bool = T::IS_DEFERRED;

    #[inline]
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        match self {
            Some(value) => value.write(writer),
            None => Ok(writer.write_null()),
        }
    }

    #[inline]
    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        T::read(element, reader).map(Some)
    }

    #[inline]
    fn null_value() -> Option<Self> {
        Some(None)
    }

    fn write_follow_id<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        match self {
            Some(value) => value.write_follow_id(writer),
            None => Ok(writer.write_null()),
        }
    }

    fn read_follow_id<F: ClassifyFormat>(
        element: &F::Element,
        reader: &mut Reader<'_, F>,
    ) -> Result<Self, ClassifyError> {
        T::read_follow_id(element, reader).map(Some)
    }

    fn capture_id(&mut self, id: &str) {
        if let Some(value) = self {
            value.capture_id(id);
        }
    }
}

// -----------------------------------------------------------------------------
// Lists

macro_rules! impl_list {
    ($name:literal, $ty:ident<T $(: $bound:path)?>) => {
        impl<T: Classify $(+ $bound)?> Classify for $ty<T> {
            const KIND: FieldKind = FieldKind::List;

            fn type_name() -> Cow<'static, str> {
                Cow::Owned(format!(concat!($name, "<{}>"), T::type_name()))
            }

            fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
                writer.write_list(self)
            }

            fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
                Ok(reader.read_list::<T>(element)?.into_iter().collect())
            }
        }
    };
}

impl_list!("Vec", Vec<T>);
impl_list!("VecDeque", VecDeque<T>);
impl_list!("BTreeSet", BTreeSet<T: Ord>);

/// Items are written in iteration order.
impl<T, S> Classify for HashSet<T, S>
where
    T: Classify + Eq + Hash,
    S: BuildHasher + Default + 'static,
{
    const KIND: FieldKind = FieldKind::List;

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("HashSet<{}>", T::type_name()))
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        writer.write_list(self)
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        Ok(reader.read_list::<T>(element)?.into_iter().collect())
    }
}

impl<T: Classify, const N: usize> Classify for [T; N] {
    const KIND: FieldKind = FieldKind::List;

    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("[{}; {N}]", T::type_name()))
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        writer.write_list(self)
    }

    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        let items = reader.read_list::<T>(element)?;
        let found = items.len();
        items
            .try_into()
            .map_err(|_| reader.data_error(format!("expected {N} items, found {found}")))
    }
}

// -----------------------------------------------------------------------------
// Tuples

macro_rules! impl_tuple {
    ($len:literal: $($name:ident $index:tt),+) => {
        impl<$($name: Classify),+> Classify for ($($name,)+) {
            const KIND: FieldKind = FieldKind::List;

            fn type_name() -> Cow<'static, str> {
                let names = [$($name::type_name()),+];
                Cow::Owned(format!("({})", names.join(", ")))
            }

            fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
                let items = Vec::from([$(writer.write_item($index, &self.$index)?),+]);
                Ok(writer.format().make_list(true, items))
            }

            fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
                let slots = reader.tuple_slots(element, $len);
                Ok(($(reader.read_slot::<$name>(&slots, $index)?,)+))
            }
        }
    };
}

impl_tuple!(1: A 0);
impl_tuple!(2: A 0, B 1);
impl_tuple!(3: A 0, B 1, C 2);
impl_tuple!(4: A 0, B 1, C 2, D 3);
impl_tuple!(5: A 0, B 1, C 2, D 3, E 4);
impl_tuple!(6: A 0, B 1, C 2, D 3, E 4, G 5);
