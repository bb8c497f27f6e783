use alloc::borrow::Cow;
use core::any::TypeId;
use core::fmt;

use bitflags::bitflags;

use crate::Classify;

// -----------------------------------------------------------------------------
// FieldKind

/// How a value is shaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Numbers, booleans, characters, dates and raw bytes.
    Primitive,
    /// Unit-only enums, stored as the variant name.
    Enum,
    String,
    /// A raw sub-tree of the wire format, passed through untouched.
    SelfValue,
    List,
    Dictionary,
    KeyValuePair,
    NestedObject,
    /// A reference-tracked allocation (`Rc`, `Arc`).
    Shared,
    /// A [`Deferred`](crate::Deferred) stored in a satellite file.
    FollowId,
    /// Not serialized: ignored, parent and captured-id fields.
    Skipped,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primitive => "primitive",
            Self::Enum => "enum",
            Self::String => "string",
            Self::SelfValue => "self value",
            Self::List => "list",
            Self::Dictionary => "dictionary",
            Self::KeyValuePair => "key-value pair",
            Self::NestedObject => "nested object",
            Self::Shared => "shared object",
            Self::FollowId => "follow-id",
            Self::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

// -----------------------------------------------------------------------------
// FieldModifiers

bitflags! {
    /// Field annotations, set with `#[classify(...)]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldModifiers: u8 {
        /// Neither read nor written.
        const IGNORE = 1 << 0;
        /// Receives the enclosing shared object on read, never written.
        const PARENT = 1 << 1;
        /// A `Deferred<T>` whose value lives in a satellite file.
        const FOLLOW_ID = 1 << 2;
        /// A `String` receiving the id of the `Deferred` that produced the object.
        const CAPTURES_ID = 1 << 3;
    }
}

impl FieldModifiers {
    /// Modifiers that keep a field out of the serialized form.
    pub const NOT_SERIALIZED: Self = Self::IGNORE
        .union(Self::PARENT)
        .union(Self::CAPTURES_ID);
}

// -----------------------------------------------------------------------------
// FieldDescriptor

/// One field of a [`TypeDescriptor`](crate::TypeDescriptor).
///
/// Built by the derive macro. The index is assigned when the descriptor is
/// added to its type and is what the generated accessors match on.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    index: usize,
    name: &'static str,
    wire_name: &'static str,
    type_name: Cow<'static, str>,
    type_id: TypeId,
    kind: FieldKind,
    deferred: bool,
    modifiers: FieldModifiers,
}

impl FieldDescriptor {
    /// Describes a serialized field of type `T`.
    pub fn new<T: Classify>(name: &'static str) -> Self {
        Self {
            index: 0,
            name,
            wire_name: strip_underscore(name),
            type_name: T::type_name(),
            type_id: TypeId::of::<T>(),
            kind: T::KIND,
            deferred: T::IS_DEFERRED,
            modifiers: FieldModifiers::empty(),
        }
    }

    /// Describes a field whose type does not implement [`Classify`].
    ///
    /// Only valid together with a modifier that keeps the field out of the
    /// serialized form.
    pub fn unclassified<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            index: 0,
            name,
            wire_name: strip_underscore(name),
            type_name: Cow::Borrowed(core::any::type_name::<T>()),
            type_id: TypeId::of::<T>(),
            kind: FieldKind::Skipped,
            deferred: false,
            modifiers: FieldModifiers::empty(),
        }
    }

    #[inline]
    pub fn with_modifiers(mut self, modifiers: FieldModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// Overrides the wire name.
    #[inline]
    pub fn renamed(mut self, wire_name: &'static str) -> Self {
        self.wire_name = wire_name;
        self
    }

    #[inline]
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Position of the field in declaration order.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The Rust field name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The name used on the wire.
    #[inline]
    pub fn wire_name(&self) -> &'static str {
        self.wire_name
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The wire classification, accounting for modifiers.
    pub fn kind(&self) -> FieldKind {
        if self.modifiers.intersects(FieldModifiers::NOT_SERIALIZED) {
            FieldKind::Skipped
        } else if self.modifiers.contains(FieldModifiers::FOLLOW_ID) && self.deferred {
            FieldKind::FollowId
        } else {
            self.kind
        }
    }

    #[inline]
    pub fn modifiers(&self) -> FieldModifiers {
        self.modifiers
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.deferred
    }

    #[inline]
    pub fn is_follow_id(&self) -> bool {
        self.modifiers.contains(FieldModifiers::FOLLOW_ID)
    }

    /// Returns `true` if the field is read and written.
    #[inline]
    pub fn is_serialized(&self) -> bool {
        !self.modifiers.intersects(FieldModifiers::NOT_SERIALIZED)
    }
}

#[inline]
fn strip_underscore(name: &'static str) -> &'static str {
    match name.strip_prefix('_') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => name,
    }
}
