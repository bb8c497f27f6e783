use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use core::cell::RefCell;

use classify_format::ClassifyFormat;

use crate::{Classify, ClassifyError, FieldKind, Reader, Writer};

// -----------------------------------------------------------------------------
// Box

impl<T: Classify> Classify for Box<T> {
    const KIND: FieldKind = T::KIND;
    const IS_DEFERRED: bool = T::IS_DEFERRED;

    #[inline]
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    #[inline]
    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        (**self).write(writer)
    }

    #[inline]
    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        T::read(element, reader).map(Box::new)
    }

    #[inline]
    fn null_value() -> Option<Self> {
        T::null_value().map(Box::new)
    }

    fn write_follow_id<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        (**self).write_follow_id(writer)
    }

    fn read_follow_id<F: ClassifyFormat>(
        element: &F::Element,
        reader: &mut Reader<'_, F>,
    ) -> Result<Self, ClassifyError> {
        T::read_follow_id(element, reader).map(Box::new)
    }

    #[inline]
    fn capture_id(&mut self, id: &str) {
        (**self).capture_id(id);
    }
}

// -----------------------------------------------------------------------------
// Shared pointers

/// Identity is the allocation: two `Rc`s to the same value are written once
/// and read back as one allocation.
impl<T: Classify> Classify for Rc<T> {
    const KIND: FieldKind = FieldKind::Shared;

    #[inline]
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    #[inline]
    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        writer.write_shared::<T>(self)
    }

    #[inline]
    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        reader.read_shared::<T>(element)
    }
}

impl<T: Classify + Send + Sync> Classify for Arc<T> {
    const KIND: FieldKind = FieldKind::Shared;

    #[inline]
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    #[inline]
    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        writer.write_shared::<T>(self)
    }

    #[inline]
    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        reader.read_arc::<T>(element)
    }
}

// -----------------------------------------------------------------------------
// RefCell

/// Inside an `Rc`, the cell is registered and becomes the parent of its
/// content before the content is read, so cycles back to it resolve.
impl<T: Classify + Default> Classify for RefCell<T> {
    const KIND: FieldKind = T::KIND;

    #[inline]
    fn type_name() -> Cow<'static, str> {
        T::type_name()
    }

    fn write<F: ClassifyFormat>(&self, writer: &mut Writer<'_, F>) -> Result<F::Element, ClassifyError> {
        let value = self.try_borrow().map_err(|_| {
            ClassifyError::configuration(T::type_name(), "value is mutably borrowed while being written")
        })?;
        value.write(writer)
    }

    #[inline]
    fn read<F: ClassifyFormat>(element: &F::Element, reader: &mut Reader<'_, F>) -> Result<Self, ClassifyError> {
        T::read(element, reader).map(RefCell::new)
    }

    #[inline]
    fn null_value() -> Option<Self> {
        T::null_value().map(RefCell::new)
    }

    fn read_rc<F: ClassifyFormat>(
        element: &F::Element,
        reader: &mut Reader<'_, F>,
        referable: Option<&str>,
    ) -> Result<Rc<Self>, ClassifyError> {
        let cell = Rc::new(RefCell::new(T::default()));
        if let Some(id) = referable {
            reader.register_referable(id, cell.clone());
        }

        reader.push_parent(cell.clone());
        let value = T::read(element, reader);
        reader.pop_parent();

        *cell.borrow_mut() = value?;
        Ok(cell)
    }

    #[inline]
    fn capture_id(&mut self, id: &str) {
        self.get_mut().capture_id(id);
    }
}
