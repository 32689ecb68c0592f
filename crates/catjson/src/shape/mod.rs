//! Type shapes: the runtime description of how a Rust type maps to JSON.
//!
//! Every decodable type implements [`JsonShape`], which returns a [`Shape`].
//! A shape carries the type's identity, a constructor for its default value
//! and a [`ShapeKind`] with type-erased hooks for building and inspecting
//! values. Nested shapes are referenced through [`ShapeFn`] so recursive
//! types resolve lazily.

mod impls;
mod record;

use std::any::{type_name, Any, TypeId};
use std::fmt;

pub use impls::MapKey;
pub use record::{
    JsonEnum, Member, MemberAccess, MemberKind, Record, RecordBuilder, RecordDescriptor,
};

use crate::error::JsonError;

/// A type-erased decoded value.
pub type Boxed = Box<dyn Any>;

/// Deferred shape lookup for element, value and member types.
pub type ShapeFn = fn() -> Shape;

/// A type with a JSON shape.
pub trait JsonShape: Default + 'static {
    fn shape() -> Shape;
}

/// Numeric kinds a JSON number can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Decimal,
}

impl NumKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64 | Self::Decimal)
    }
}

/// Key kinds a map may use. Object keys are converted to these on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    String,
    Integer(NumKind),
}

impl KeyKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer(kind) => kind.name(),
        }
    }
}

#[derive(Clone, Copy)]
pub struct Shape {
    pub id: TypeId,
    pub name: &'static str,
    pub kind: ShapeKind,
    pub default: fn() -> Boxed,
}

#[derive(Clone, Copy)]
pub enum ShapeKind {
    Bool,
    Number(NumKind),
    String,
    /// A string of exactly one character.
    Char,
    /// Integer ordinal mapped onto named variants.
    Enum(EnumShape),
    Nullable(NullableShape),
    Sequence(SequenceShape),
    Map(MapShape),
    Record(RecordShape),
    /// The untyped [`JsonValue`](crate::JsonValue) tree.
    Any,
}

#[derive(Clone, Copy)]
pub struct EnumShape {
    pub from_ordinal: fn(i64) -> Option<Boxed>,
    pub to_ordinal: fn(&dyn Any) -> Option<i64>,
}

#[derive(Clone, Copy)]
pub struct NullableShape {
    pub inner: ShapeFn,
    /// Build the nullable value from an absent or present inner value.
    pub wrap: fn(Option<Boxed>) -> Result<Boxed, JsonError>,
    /// Outer `None` means `value` is not of this shape.
    pub get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceLayout {
    /// Grows as elements are decoded.
    Growable,
    /// Built once the element count is known; `Some(n)` when the type
    /// fixes the length.
    Fixed(Option<usize>),
}

#[derive(Clone, Copy)]
pub struct SequenceShape {
    pub element: ShapeFn,
    pub layout: SequenceLayout,
    pub build: fn(Vec<Boxed>) -> Result<Boxed, JsonError>,
    pub items: fn(&dyn Any) -> Option<Vec<&dyn Any>>,
}

#[derive(Clone, Copy)]
pub struct MapShape {
    pub key: KeyKind,
    pub value: ShapeFn,
    pub insert: fn(&mut dyn Any, &str, Boxed) -> Result<(), JsonError>,
    pub entries: fn(&dyn Any) -> Option<Vec<(String, &dyn Any)>>,
}

#[derive(Clone, Copy)]
pub struct RecordShape {
    pub describe: fn() -> RecordDescriptor,
    /// Runs the record's decode-finished hook.
    pub finish: fn(&mut dyn Any),
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Number(kind) => kind.name(),
            Self::String => "string",
            Self::Char => "char",
            Self::Enum(_) => "enum",
            Self::Nullable(_) => "nullable",
            Self::Sequence(_) => "sequence",
            Self::Map(_) => "map",
            Self::Record(_) => "record",
            Self::Any => "any",
        }
    }
}

impl Shape {
    pub fn of<T: JsonShape>() -> Shape {
        T::shape()
    }

    /// Shape of `T` with the given kind. Building block for
    /// [`JsonShape`] impls.
    pub fn new<T: JsonShape>(kind: ShapeKind) -> Shape {
        Shape {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
            default: boxed_default::<T>,
        }
    }

    pub fn record<T: Record + JsonShape>() -> Shape {
        Shape::new::<T>(ShapeKind::Record(RecordShape {
            describe: record::describe::<T>,
            finish: record::finish::<T>,
        }))
    }

    pub fn enumeration<T: JsonEnum + JsonShape>() -> Shape {
        Shape::new::<T>(ShapeKind::Enum(EnumShape {
            from_ordinal: record::enum_from_ordinal::<T>,
            to_ordinal: record::enum_to_ordinal::<T>,
        }))
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.kind, ShapeKind::Nullable(_) | ShapeKind::Any)
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("name", &self.name)
            .field("kind", &self.kind.label())
            .finish()
    }
}

fn boxed_default<T: Default + 'static>() -> Boxed {
    Box::new(T::default())
}

/// Recover a concrete value from a [`Boxed`].
pub fn unbox<T: 'static>(value: Boxed) -> Result<T, JsonError> {
    value
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| JsonError::ShapeMismatch {
            shape: type_name::<T>(),
        })
}
