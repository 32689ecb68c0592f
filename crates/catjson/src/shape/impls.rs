use std::any::{type_name, Any};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

use indexmap::IndexMap;
use rust_decimal::Decimal;

use super::{
    unbox, Boxed, JsonShape, KeyKind, MapShape, NullableShape, NumKind, SequenceLayout,
    SequenceShape, Shape, ShapeKind,
};
use crate::error::JsonError;
use crate::value::JsonValue;

macro_rules! number_shape {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl JsonShape for $ty {
            fn shape() -> Shape {
                Shape::new::<Self>(ShapeKind::Number(NumKind::$kind))
            }
        })*
    };
}

number_shape! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
}

impl JsonShape for bool {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Bool)
    }
}

impl JsonShape for String {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::String)
    }
}

impl JsonShape for char {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Char)
    }
}

impl JsonShape for JsonValue {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Any)
    }
}

impl<T: JsonShape> JsonShape for Option<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Nullable(NullableShape {
            inner: T::shape,
            wrap: wrap_option::<T>,
            get: get_option::<T>,
        }))
    }
}

fn wrap_option<T: 'static>(value: Option<Boxed>) -> Result<Boxed, JsonError> {
    let value: Option<T> = value.map(unbox::<T>).transpose()?;
    Ok(Box::new(value))
}

fn get_option<T: 'static>(value: &dyn Any) -> Option<Option<&dyn Any>> {
    value
        .downcast_ref::<Option<T>>()
        .map(|o| o.as_ref().map(|v| v as &dyn Any))
}

// Sequences

impl<T: JsonShape> JsonShape for Vec<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence(SequenceShape {
            element: T::shape,
            layout: SequenceLayout::Growable,
            build: build_vec::<T>,
            items: slice_items::<Self, T>,
        }))
    }
}

impl<T: JsonShape> JsonShape for VecDeque<T> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence(SequenceShape {
            element: T::shape,
            layout: SequenceLayout::Growable,
            build: build_deque::<T>,
            items: deque_items::<T>,
        }))
    }
}

impl<T: JsonShape> JsonShape for Box<[T]> {
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence(SequenceShape {
            element: T::shape,
            layout: SequenceLayout::Fixed(None),
            build: build_boxed_slice::<T>,
            items: slice_items::<Self, T>,
        }))
    }
}

impl<T: JsonShape, const N: usize> JsonShape for [T; N]
where
    [T; N]: Default,
{
    fn shape() -> Shape {
        Shape::new::<Self>(ShapeKind::Sequence(SequenceShape {
            element: T::shape,
            layout: SequenceLayout::Fixed(Some(N)),
            build: build_array::<T, N>,
            items: slice_items::<Self, T>,
        }))
    }
}

fn collect<T: 'static>(items: Vec<Boxed>) -> Result<Vec<T>, JsonError> {
    items.into_iter().map(unbox::<T>).collect()
}

fn build_vec<T: 'static>(items: Vec<Boxed>) -> Result<Boxed, JsonError> {
    Ok(Box::new(collect::<T>(items)?))
}

fn build_deque<T: 'static>(items: Vec<Boxed>) -> Result<Boxed, JsonError> {
    Ok(Box::new(VecDeque::from(collect::<T>(items)?)))
}

fn build_boxed_slice<T: 'static>(items: Vec<Boxed>) -> Result<Boxed, JsonError> {
    Ok(Box::new(collect::<T>(items)?.into_boxed_slice()))
}

fn build_array<T: 'static, const N: usize>(items: Vec<Boxed>) -> Result<Boxed, JsonError> {
    let items = collect::<T>(items)?;
    let found = items.len();
    match <[T; N]>::try_from(items) {
        Ok(array) => Ok(Box::new(array)),
        Err(_) => Err(JsonError::LengthMismatch {
            offset: None,
            expected: N,
            found,
            shape: type_name::<[T; N]>(),
        }),
    }
}

fn slice_items<C: AsRef<[T]> + 'static, T: 'static>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    value
        .downcast_ref::<C>()
        .map(|c| c.as_ref().iter().map(|x| x as &dyn Any).collect())
}

fn deque_items<T: 'static>(value: &dyn Any) -> Option<Vec<&dyn Any>> {
    value
        .downcast_ref::<VecDeque<T>>()
        .map(|d| d.iter().map(|x| x as &dyn Any).collect())
}

// Maps

/// Types usable as map keys. JSON object keys are strings; other key kinds
/// are parsed from and printed to the key text.
pub trait MapKey: Sized + 'static {
    const KIND: KeyKind;

    fn from_key(key: &str) -> Option<Self>;

    fn to_key(&self) -> String;
}

impl MapKey for String {
    const KIND: KeyKind = KeyKind::String;

    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }

    fn to_key(&self) -> String {
        self.clone()
    }
}

macro_rules! integer_key {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(impl MapKey for $ty {
            const KIND: KeyKind = KeyKind::Integer(NumKind::$kind);

            fn from_key(key: &str) -> Option<Self> {
                key.parse().ok()
            }

            fn to_key(&self) -> String {
                self.to_string()
            }
        })*
    };
}

integer_key! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

trait MapLike<K, V>: 'static {
    fn put(&mut self, key: K, value: V);

    fn pairs(&self) -> Vec<(&K, &V)>;
}

impl<K: Eq + Hash + 'static, V: 'static> MapLike<K, V> for HashMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn pairs(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

impl<K: Ord + 'static, V: 'static> MapLike<K, V> for BTreeMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn pairs(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

impl<K: Eq + Hash + 'static, V: 'static> MapLike<K, V> for IndexMap<K, V> {
    fn put(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn pairs(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
}

fn map_shape<M, K, V>() -> Shape
where
    M: MapLike<K, V> + JsonShape,
    K: MapKey,
    V: JsonShape,
{
    Shape::new::<M>(ShapeKind::Map(MapShape {
        key: K::KIND,
        value: V::shape,
        insert: map_insert::<M, K, V>,
        entries: map_entries::<M, K, V>,
    }))
}

fn map_insert<M: MapLike<K, V>, K: MapKey, V: 'static>(
    map: &mut dyn Any,
    key: &str,
    value: Boxed,
) -> Result<(), JsonError> {
    let shape = type_name::<M>();
    let map = map
        .downcast_mut::<M>()
        .ok_or(JsonError::ShapeMismatch { shape })?;
    let key = K::from_key(key).ok_or_else(|| JsonError::MapKey {
        offset: None,
        key: key.to_string(),
        key_kind: K::KIND.name(),
        shape,
    })?;
    map.put(key, unbox::<V>(value)?);
    Ok(())
}

fn map_entries<M: MapLike<K, V>, K: MapKey, V: 'static>(
    map: &dyn Any,
) -> Option<Vec<(String, &dyn Any)>> {
    map.downcast_ref::<M>().map(|m| {
        m.pairs()
            .into_iter()
            .map(|(k, v)| (k.to_key(), v as &dyn Any))
            .collect()
    })
}

impl<K: MapKey + Eq + Hash, V: JsonShape> JsonShape for HashMap<K, V> {
    fn shape() -> Shape {
        map_shape::<Self, K, V>()
    }
}

impl<K: MapKey + Ord, V: JsonShape> JsonShape for BTreeMap<K, V> {
    fn shape() -> Shape {
        map_shape::<Self, K, V>()
    }
}

impl<K: MapKey + Eq + Hash, V: JsonShape> JsonShape for IndexMap<K, V> {
    fn shape() -> Shape {
        map_shape::<Self, K, V>()
    }
}
